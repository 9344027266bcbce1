//! Launching a remote scan against a reconciled group.

use tgsync_common::config::ScanSettings;
use tgsync_common::inventory::NamedGroup;
use tgsync_common::scan::{ScanId, ScanSpec};
use tgsync_common::{Error, Result};
use tracing::info;

use crate::store::ScanLauncher;

pub struct ScanTrigger<'a> {
    launcher: &'a dyn ScanLauncher,
    settings: &'a ScanSettings,
}

impl<'a> ScanTrigger<'a> {
    pub fn new(launcher: &'a dyn ScanLauncher, settings: &'a ScanSettings) -> Self {
        Self { launcher, settings }
    }

    /// Resolves scanner, folder and template by exact name, then creates
    /// and launches a scan targeting `group`.
    pub async fn launch(&self, group: &NamedGroup, scan_name: &str) -> Result<ScanId> {
        let scanner = self
            .launcher
            .list_scanners()
            .await
            .map_err(|e| Error::external("listing scanners", e))?
            .into_iter()
            .find(|scanner| scanner.name == self.settings.scanner_name)
            .ok_or_else(|| Error::NotFound {
                kind: "scanner",
                name: self.settings.scanner_name.clone(),
            })?;

        let folder = self
            .launcher
            .list_folders()
            .await
            .map_err(|e| Error::external("listing folders", e))?
            .into_iter()
            .find(|folder| folder.name == self.settings.folder_name)
            .ok_or_else(|| Error::NotFound {
                kind: "folder",
                name: self.settings.folder_name.clone(),
            })?;

        let template = self
            .launcher
            .list_templates()
            .await
            .map_err(|e| Error::external("listing scan templates", e))?
            .into_iter()
            .find(|template| template.name == self.settings.template_name)
            .ok_or_else(|| Error::NotFound {
                kind: "scan template",
                name: self.settings.template_name.clone(),
            })?;

        let spec = ScanSpec {
            name: scan_name.to_string(),
            template_uuid: template.uuid,
            scanner_uuid: scanner.uuid,
            folder_id: folder.id,
            target_group: group.id.clone(),
        };

        let id = self
            .launcher
            .create_scan(&spec)
            .await
            .map_err(|e| Error::external(format!("creating scan '{scan_name}'"), e))?;
        info!("Launched scan '{scan_name}' ({}) on {}", id.0, scanner.name);
        Ok(id)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use tgsync_common::inventory::{GroupId, MemberList};
    use tgsync_common::scan::{Folder, ScanTemplate, ScannerRef};

    fn group() -> NamedGroup {
        NamedGroup {
            id: GroupId::new("tg-9"),
            name: "Scanned Only by Agents (as of latest)".into(),
            members: MemberList::parse("10.0.0.1"),
        }
    }

    fn settings() -> ScanSettings {
        ScanSettings {
            scanner_name: "Internal Scanner".into(),
            ..ScanSettings::default()
        }
    }

    fn launcher() -> MemoryStore {
        MemoryStore::new()
            .with_scanner(ScannerRef {
                id: "4".into(),
                uuid: "scanner-uuid".into(),
                name: "Internal Scanner".into(),
            })
            .with_folder(Folder {
                id: "12".into(),
                name: "My Scans".into(),
            })
            .with_template(ScanTemplate {
                uuid: "template-uuid".into(),
                name: "basic".into(),
            })
    }

    #[tokio::test]
    async fn test_launch_targets_the_group() {
        let store = launcher();
        let settings = settings();

        let id = ScanTrigger::new(&store, &settings)
            .launch(&group(), "Agent Only Assets Remote Scan - latest")
            .await
            .unwrap();

        assert_eq!(id, ScanId("scan-1".into()));
        let scans = store.scans();
        assert_eq!(scans[0].target_group, GroupId::new("tg-9"));
        assert_eq!(scans[0].scanner_uuid, "scanner-uuid");
        assert_eq!(scans[0].folder_id, "12");
    }

    #[tokio::test]
    async fn test_missing_template_is_not_found() {
        let store = launcher();
        let settings = ScanSettings {
            template_name: "advanced".into(),
            ..settings()
        };

        let err = ScanTrigger::new(&store, &settings)
            .launch(&group(), "scan")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { kind: "scan template", .. }));
        assert!(store.scans().is_empty());
    }

    #[tokio::test]
    async fn test_scanner_name_must_match_exactly() {
        let store = launcher();
        let settings = ScanSettings {
            scanner_name: "internal scanner".into(),
            ..ScanSettings::default()
        };

        let err = ScanTrigger::new(&store, &settings)
            .launch(&group(), "scan")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { kind: "scanner", .. }));
    }
}

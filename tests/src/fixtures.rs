#![cfg(test)]
use std::sync::{Arc, Mutex};

use tgsync_common::config::PipelineConfig;
use tgsync_common::inventory::{AgentRecord, AssetTag, InventoryItem};
use tgsync_common::network::Address;
use tgsync_core::Pipeline;
use tgsync_core::memory::MemoryStore;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn asset(id: &str, addrs: &[&str]) -> InventoryItem {
    addrs
        .iter()
        .fold(InventoryItem::new(id), |item, a| item.with_ipv4(addr(a)))
}

pub fn agent(id: &str, ip: &str, name: &str) -> AgentRecord {
    AgentRecord {
        id: id.into(),
        ip: addr(ip),
        name: Some(name.into()),
    }
}

pub fn tag(category: &str, value: &str) -> AssetTag {
    AssetTag {
        category: category.into(),
        value: value.into(),
        kind: "static".into(),
    }
}

pub fn pipeline(store: &Arc<MemoryStore>) -> Pipeline {
    pipeline_with(store, PipelineConfig::default())
}

pub fn pipeline_with(store: &Arc<MemoryStore>, cfg: PipelineConfig) -> Pipeline {
    Pipeline::new(store.clone(), cfg)
}

pub fn dry_run() -> PipelineConfig {
    PipelineConfig {
        dry_run: true,
        ..PipelineConfig::default()
    }
}

/// Records the level of every event emitted on this thread.
struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

impl<S: Subscriber> Layer<S> for LevelRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.0.lock().unwrap().push(*event.metadata().level());
    }
}

/// Installs a thread-local subscriber; events are captured until the guard drops.
pub fn capture_levels() -> (DefaultGuard, Arc<Mutex<Vec<Level>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(LevelRecorder(Arc::clone(&seen)));
    (tracing::subscriber::set_default(subscriber), seen)
}

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// The bar currently drawn, if any. Log lines are printed above it.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

pub fn start(len: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.blue} {msg} [{bar:32.green/bright_black}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_strings(TICK_STRINGS)
    .progress_chars("█▓░");

    let bar = ProgressBar::new(len);
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));

    *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Some(bar.clone());
    bar
}

pub fn finish(bar: &ProgressBar) {
    bar.finish_and_clear();
    *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Writes to stdout, or above the active progress bar when one is drawn.
pub struct TerminalWriter;

impl Write for TerminalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match active {
            Some(bar) => {
                let msg = String::from_utf8_lossy(buf);
                bar.println(msg.trim_end());
                Ok(buf.len())
            }
            None => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

use tracing::debug;

use crate::app::ports::{ProgressReporter, Stage};
use crate::common::error::BrandingError;

/// Prints pipeline progress for a person watching the terminal.
/// Events go to the log at debug level only; the console already shows them.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

fn stage_line(stage: Stage) -> &'static str {
    match stage {
        Stage::Fetch => "📡 Fetching branding...",
        Stage::Download => "📥 Downloading images...",
        Stage::Resize => "📐 Resizing logos...",
        Stage::Pack => "📦 Writing archive...",
        Stage::Unpack => "📂 Reading archive...",
        Stage::Upload => "📤 Uploading images...",
        Stage::Publish => "🎨 Updating branding...",
        Stage::Cleanup => "🧹 Removing temporary files...",
    }
}

impl ProgressReporter for ConsoleReporter {
    fn stage_started(&self, stage: Stage) {
        debug!(stage = stage.as_str(), "stage started");
        println!("{}", stage_line(stage));
    }

    fn item_progress(&self, stage: Stage, done: usize, total: usize, item: &str) {
        debug!(stage = stage.as_str(), done, total, item, "progress");
        println!("   {}/{} {}", done, total, item);
    }

    fn stage_error(&self, stage: Stage, err: &BrandingError) {
        debug!(stage = stage.as_str(), "{}", err);
        eprintln!("❌ {} failed", stage.as_str());
    }

    fn finished(&self, summary: &str) {
        debug!("{}", summary);
        println!("✅ {}", summary);
    }
}

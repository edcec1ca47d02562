//! Batch runner: one extraction per item, strictly in discovery order

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::extract::Extractor;
use crate::types::{DiscoveredItem, ItemStatus, MetadataTable};

fn progress_bar(len: u64, label: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{msg} ({pos}/{len})\n[{bar:40.cyan/blue}] {percent}% • {elapsed_precise} (ETA: {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    ProgressBar::new(len)
        .with_message(label.to_string())
        .with_style(style)
}

/// Run every item through `extractor` and collect one record per item.
///
/// Extractors fold their own errors into records, so the loop never stops
/// early and the table always has exactly `items.len()` rows.
pub fn run(items: &[DiscoveredItem], extractor: &dyn Extractor, label: &str) -> MetadataTable {
    let bar = progress_bar(items.len() as u64, label);
    let mut table = MetadataTable::new();

    for item in items {
        table.push(extractor.extract(item));
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        label,
        items = table.len(),
        success = table.count_status(ItemStatus::Success),
        skipped = table.count_status(ItemStatus::Skipped),
        failed = table.count_status(ItemStatus::Failed),
        "Batch finished"
    );
    table
}

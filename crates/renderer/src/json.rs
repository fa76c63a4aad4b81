use crate::ComparedImage;
use analysis::ImageStats;
use dockerfile::{DocItem, Documentation};
use serde::Serialize;

#[derive(Serialize)]
struct ImageReport<'a> {
    items: &'a [DocItem],
    stats: Option<&'a ImageStats>,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    images: &'a [ComparedImage],
}

pub fn render_image(
    doc: &Documentation,
    stats: Option<&ImageStats>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ImageReport {
        items: &doc.items,
        stats,
    })
}

pub fn render_comparison(images: &[ComparedImage]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ComparisonReport { images })
}

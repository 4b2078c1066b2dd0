use std::fmt::Write;

use common::intake::Rejection;
use common::render::ItemView;
use common::{ResultCategory, UploadItem};
use console::style;

pub fn rejection(rejection: &Rejection) {
    eprintln!(
        "{} {}: {}",
        style("✗").red().bold(),
        rejection.name,
        rejection.error
    );
}

/// Card for one item. Completed cards end with the disclaimer.
fn card(item: &UploadItem) -> String {
    let view = ItemView::from_item(item);
    let marker = match &view {
        ItemView::Complete(summary) => match summary.category {
            ResultCategory::Malignant => style("●").red(),
            ResultCategory::Benign => style("●").green(),
            ResultCategory::Other => style("●").yellow(),
        },
        ItemView::Failed { .. } => style("✗").red(),
        ItemView::Idle | ItemView::Analyzing => style("…").dim(),
    };

    let mut out = format!("{marker} {}\n", style(item.name()).bold());
    for line in view.to_string().lines() {
        let _ = writeln!(out, "    {line}");
    }
    out
}

pub fn item(item: &UploadItem) {
    print!("{}", card(item));
}

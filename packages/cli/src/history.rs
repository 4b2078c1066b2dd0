use anyhow::Context;
use common::ResultCategory;
use common::analysis::RemoteAnalysisClient;
use common::dashboard::{self, DashboardQuery, DashboardView};
use common::record::StoredAnalysisRecord;
use common::render::ConfidenceBand;
use console::style;

use crate::HistoryArgs;

const NO_ENTRIES: &str = "No analyses yet. Analyze an image to see it here.";

fn no_matches(total: usize) -> String {
    format!("No analyses match the current filter ({total} stored).")
}

fn print_record(record: &StoredAnalysisRecord) {
    let padded = format!("{:<10}", record.result);
    let label = match record.category() {
        ResultCategory::Malignant => style(padded).red(),
        ResultCategory::Benign => style(padded).green(),
        ResultCategory::Other => style(padded).yellow(),
    };
    let percent = (record.confidence * 100.0).round();
    println!(
        "{}  {}  {label} {percent:>3}% ({})",
        style(record.id).dim(),
        record.created_at.format("%Y-%m-%d %H:%M"),
        ConfidenceBand::from_confidence(record.confidence).as_str(),
    );
}

pub async fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let client = RemoteAnalysisClient::new(args.server.clone());
    let records = client
        .list_records()
        .await
        .with_context(|| format!("Failed to fetch analyses from {}", args.server))?;

    let query = DashboardQuery::new(args.filter, args.search);
    let view = dashboard::filter(&records, &query);

    if args.json {
        let matched: Vec<&StoredAnalysisRecord> = view.entries().to_vec();
        println!("{}", serde_json::to_string_pretty(&matched)?);
        return Ok(());
    }

    match view {
        DashboardView::NoEntries => println!("{NO_ENTRIES}"),
        DashboardView::NoMatches { total } => println!("{}", no_matches(total)),
        DashboardView::Matches(entries) => {
            for record in &entries {
                print_record(record);
            }
            println!("\n{} of {} analyses", entries.len(), records.len());
        }
    }
    Ok(())
}

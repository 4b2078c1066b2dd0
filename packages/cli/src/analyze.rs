use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::analysis::{MockClassifier, RemoteAnalysisClient};
use common::config::SessionConfig;
use common::intake::CandidateFile;
use common::{AnalysisClient, ItemStatus, Session, UploadPolicy};
use tracing::debug;

use crate::AnalyzeArgs;
use crate::output;

fn build_client(args: &AnalyzeArgs) -> Arc<dyn AnalysisClient> {
    if let Some(url) = &args.remote {
        debug!(%url, "Using remote analysis service");
        return Arc::new(RemoteAnalysisClient::new(url.clone()));
    }

    let mock = match args.seed {
        Some(seed) => MockClassifier::seeded(seed),
        None => MockClassifier::new(),
    };
    if args.no_delay {
        Arc::new(mock.with_delay(Duration::ZERO..Duration::ZERO))
    } else {
        Arc::new(mock)
    }
}

fn upload_policy(args: &AnalyzeArgs) -> UploadPolicy {
    let policy = UploadPolicy::default().with_max_bytes(args.max_bytes);
    if args.webp { policy.with_webp() } else { policy }
}

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = CandidateFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let config = SessionConfig {
        upload: upload_policy(&args),
        ..SessionConfig::default()
    };
    let mut session = Session::new(build_client(&args), config);

    let report = session.submit(files);
    for rejection in &report.rejected {
        output::rejection(rejection);
    }
    if session.store().is_empty() {
        anyhow::bail!("No files were accepted");
    }

    let started = session.analyze_all_idle();
    println!("Analyzing {started} image(s)...\n");

    while let Some(settled) = session.next_settlement().await {
        if let Some(item) = session.store().get(&settled.id()) {
            output::item(item);
        }
    }

    let store = session.store();
    let complete = store.count_with_status(ItemStatus::Complete);
    let failed = store.count_with_status(ItemStatus::Error);
    println!(
        "\n{complete} complete, {failed} failed, {} rejected",
        report.rejected.len()
    );
    Ok(())
}

//! End-to-end run: fetch, extract, resolve, report.

use crate::config::BestiaryConfig;
use crate::coordinator::{BatchCoordinator, BatchSummary};
use crate::network::{HttpClient, WebClient};
use crate::record::Record;
use crate::report::render_report;
use crate::resolver::ImageResolver;
use crate::source::{extract_records, SourceFetcher};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub batch: BatchSummary,
    pub report_path: PathBuf,
}

/// A configured run sharing one web client between all stages.
pub struct Pipeline {
    config: BestiaryConfig,
    client: Arc<dyn WebClient>,
    refresh_source: bool,
}

impl Pipeline {
    /// Validate the config and build the HTTP client.
    pub fn new(config: BestiaryConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::from_config(&config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: BestiaryConfig, client: Arc<dyn WebClient>) -> Self {
        Self {
            config,
            client,
            refresh_source: false,
        }
    }

    /// Download the source page even when a cached copy exists.
    pub fn refresh_source(mut self, refresh: bool) -> Self {
        self.refresh_source = refresh;
        self
    }

    pub fn config(&self) -> &BestiaryConfig {
        &self.config
    }

    /// Run every stage and return the annotated records with the summary.
    ///
    /// Image resolution never fails the run; source retrieval and report
    /// writing do. A source without records still yields an (empty) report.
    pub async fn run_with_records(&self) -> Result<(Vec<Record>, RunSummary)> {
        let html = SourceFetcher::from_config(&self.config, Arc::clone(&self.client))
            .with_refresh(self.refresh_source)
            .fetch()
            .await?;

        let mut records = extract_records(&html);
        if records.is_empty() {
            warn!("No records found in {}; writing an empty report", self.config.source_url);
        }

        let resolver = ImageResolver::with_client(&self.config, Arc::clone(&self.client));
        let coordinator = BatchCoordinator::new(Arc::new(resolver), self.config.concurrency_width);
        let batch = coordinator.resolve_records(&mut records).await;
        if batch.task_failures > 0 {
            warn!("{} resolution tasks failed", batch.task_failures);
        }

        let report_path = render_report(&records, &self.config.report_path())?;
        info!("Run complete: {} records, report at {}", records.len(), report_path.display());

        let summary = RunSummary {
            records: records.len(),
            batch,
            report_path,
        };
        Ok((records, summary))
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_records().await.map(|(_, summary)| summary)
    }
}

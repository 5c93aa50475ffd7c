//! Concurrent batch resolution of record images.

use crate::record::Record;
use crate::resolver::ImageResolver;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Anything that can turn a name into a local image path.
#[async_trait]
pub trait ResolveImage: Send + Sync {
    /// Resolve `name`; must not fail.
    async fn resolve(&self, name: &str) -> PathBuf;

    /// Where the fallback image lives. Must not touch the network.
    fn fallback_location(&self) -> PathBuf;

    /// Make sure the fallback image exists and return its path.
    async fn ensure_fallback(&self) -> PathBuf;
}

#[async_trait]
impl ResolveImage for ImageResolver {
    async fn resolve(&self, name: &str) -> PathBuf {
        ImageResolver::resolve(self, name).await
    }

    fn fallback_location(&self) -> PathBuf {
        ImageResolver::fallback_location(self).to_path_buf()
    }

    async fn ensure_fallback(&self) -> PathBuf {
        self.fallback_path().await
    }
}

/// Outcome counts of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub unique_names: usize,
    /// Names that ended up with their own image.
    pub resolved: usize,
    /// Names that ended up with the fallback, including failed tasks.
    pub fallbacks: usize,
    /// Tasks that panicked.
    pub task_failures: usize,
}

/// Fans resolution out over a bounded number of tokio tasks.
///
/// Every unique name gets exactly one task; its result is written back to every
/// record carrying that name. A panicking task only costs its own records, which
/// receive the fallback image.
pub struct BatchCoordinator {
    resolver: Arc<dyn ResolveImage>,
    width: usize,
}

impl BatchCoordinator {
    pub fn new(resolver: Arc<dyn ResolveImage>, width: usize) -> Self {
        Self {
            resolver,
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Resolve an image for every record, returning once all tasks finished.
    pub async fn resolve_records(&self, records: &mut [Record]) -> BatchSummary {
        let mut owners: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, record) in records.iter().enumerate() {
            owners.entry(record.name.clone()).or_default().push(index);
        }

        let mut summary = BatchSummary {
            unique_names: owners.len(),
            ..Default::default()
        };
        info!(
            "Resolving images for {} records ({} unique names, width {})",
            records.len(),
            summary.unique_names,
            self.width
        );

        let fallback = self.resolver.fallback_location();
        let names: Vec<String> = owners.keys().cloned().collect();

        let mut outcomes = stream::iter(names)
            .map(|name| {
                let resolver = Arc::clone(&self.resolver);
                async move {
                    let task_name = name.clone();
                    let handle = tokio::spawn(async move { resolver.resolve(&task_name).await });
                    (name, handle.await)
                }
            })
            .buffer_unordered(self.width);

        while let Some((name, outcome)) = outcomes.next().await {
            let path = match outcome {
                Ok(path) => path,
                Err(e) => {
                    error!("Resolution task for {} failed: {}", name, e);
                    summary.task_failures += 1;
                    self.resolver.ensure_fallback().await
                }
            };

            if path == fallback {
                summary.fallbacks += 1;
            } else {
                summary.resolved += 1;
            }
            debug!("{} -> {}", name, path.display());

            if let Some(indices) = owners.get(&name) {
                for &index in indices {
                    records[index].assign_image(path.clone());
                }
            }
        }

        info!(
            "Batch complete: {} resolved, {} fallbacks, {} failed tasks",
            summary.resolved, summary.fallbacks, summary.task_failures
        );
        summary
    }
}

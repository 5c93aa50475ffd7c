//! Bestiary Core - Headless library that builds an illustrated index of animal names.
//!
//! The library scrapes the tables of a Wikipedia list page into [`Record`]s,
//! resolves one local image per record through a chain of lookup strategies, and
//! renders an HTML report grouping the records by collateral adjective. It has no
//! CLI of its own; see the `bestiary-cli` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use bestiary_core::{BestiaryConfig, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> bestiary_core::Result<()> {
//!     let config = BestiaryConfig::default().with_concurrency_width(8);
//!     let summary = Pipeline::new(config)?.run().await?;
//!     println!("{} records, report at {}", summary.records, summary.report_path.display());
//!     Ok(())
//! }
//! ```
//!
//! Resolving a single name:
//!
//! ```rust,ignore
//! let resolver = bestiary_core::ImageResolver::new(&config)?;
//! let path = resolver.resolve("Red Fox").await; // never fails; may be fallback.jpg
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod network;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod resolver;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use config::{BestiaryConfig, PathsConfig, WikiConfig};
pub use coordinator::{BatchCoordinator, BatchSummary, ResolveImage};
pub use error::{BestiaryError, Result};
pub use network::{HttpClient, Payload, WebClient};
pub use pipeline::{Pipeline, RunSummary};
pub use record::Record;
pub use report::{group_by_tag, render_report};
pub use resolver::{ImageResolver, Resolution, ResolutionSource, Strategy};
pub use source::{extract_records, SourceFetcher};

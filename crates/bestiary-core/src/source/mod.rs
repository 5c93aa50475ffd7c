//! Source page retrieval and record extraction.

mod extractor;
mod fetcher;

pub use extractor::{clean_name, extract_records, split_tags, title_case};
pub use fetcher::SourceFetcher;

pub mod error;
pub mod extract;
pub mod filename;
pub mod page;
pub mod pagination;
pub mod retriever;
pub mod rules;

mod rate_limit;

pub use error::ScraperError;
pub use extract::{is_valid_media, ContentExtractor};
pub use filename::{resolve_filename, resolve_unique_path};
pub use page::{FetchedPage, PageClient};
pub use pagination::extract_pagination_links;
pub use retriever::{AssetRetriever, RetrievalStats, RetrieverConfig};
pub use rules::{match_all, ColorMatch};

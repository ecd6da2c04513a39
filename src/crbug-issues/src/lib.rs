#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod browser;
pub mod config;
pub mod cross_refs;
pub mod decode;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod runner;
pub mod search;
pub mod strategies;
pub mod summary;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{AutomationSession, BrowserAutomation, BrowserError, SessionGuard};
pub use config::{BrowserSettings, ConfigError, TrackerConfig, TrackerSettings};
pub use cross_refs::{extract_change_ids, ChangeIdSet};
pub use decode::{decode_metadata, decode_search_results, parse_comments_batch, parse_events};
pub use merge::{merge, ResultMerger};
pub use model::{
    Comment, Issue, IssueType, PartialRecord, Priority, Provenance, SchemaDrift, Severity, Status,
};
pub use pipeline::{AcquisitionFailure, AcquisitionPipeline};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use search::{search_issues, SearchError, SearchResults};
pub use strategies::{AcquisitionStrategy, StrategyError};
pub use summary::{FetchResult, RunSummary};
pub use transport::{Endpoints, HttpUpstream, TransportError, Upstream};

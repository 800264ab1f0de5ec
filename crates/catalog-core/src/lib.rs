//! catalog-core: ingestion and normalization for a JSON comic catalog
//!
//! The catalog is a directory of plain JSON arrays: per-period issues,
//! events and French editions, plus shared writer and penciller
//! registries. Every mutation is staged as a [`ChangeSet`] and a store is
//! rewritten only when its content changes, so any operation can be
//! re-run safely.

pub mod changeset;
pub mod config;
pub mod creators;
pub mod editions;
pub mod error;
pub mod extract;
pub mod id;
pub mod ingest;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod order;
pub mod store;
pub mod title;
pub mod validate;

pub use changeset::{Change, ChangeSet};
pub use config::Config;
pub use creators::Registry;
pub use error::Error;
pub use extract::{Draft, Extractor, JsonDraftExtractor};
pub use ingest::{IngestOptions, IngestPlan, IngestReport, ingest, plan_ingest};
pub use labels::{IssueIndex, infer_labels};
pub use model::{Category, Creator, Edition, Event, Issue, Record};
pub use normalize::{FileOutcome, FileStatus, NormalizeOptions, NormalizeReport, normalize};
pub use store::Catalog;
pub use title::{CasingTable, TitleFormatter, format_title};
pub use validate::{DanglingReference, ReferenceScope, UnresolvedEditionIssue};

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

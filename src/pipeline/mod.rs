//! Scan and analysis workflows

pub mod orchestrator;
pub mod store;

pub use orchestrator::{
    analyze_library, scan_library, AnalysisOutcome, CancelToken, ProgressEvent, ScanOutcome,
};
pub use store::{JobKind, JobSummary, LibraryEvent, LibraryStore};

//! Application services built on the ports.

mod analyzer;

pub use analyzer::{
    AnalysisRequest, AnalyzerOptions, DEFAULT_REVISION, RepoAnalyzer, validate_repo_id,
};

#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod analysis;
pub mod command;
pub mod domain;
pub mod error;
pub mod ports;
pub mod projection;
pub mod recommend;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::{
    AudioInfo, DatasetInfo, DatasetSplit, DiffusersComponent, DiffusersInfo, GgufInfo,
    GgufQuantization, LoraInfo, MultimodalInfo, OnnxInfo, OnnxModel, QuantizedInfo,
    TransformersInfo, VisionInfo, classify, refine,
};
pub use command::{generate_cli_command, recommended_command};
pub use domain::{
    FileEntry, ItemCategory, MetadataMap, QuantLevel, RefKind, RelatedDownload, RelatedKind,
    RepoDetails, RepoRef, RepoSnapshot, RepoType, SelectableItem, WeightFormat,
};
pub use error::{AnalysisError, AnalysisResult};
pub use ports::{
    LfsPointer, NodeKind, RepoLocator, RepoSourcePort, SourcePortError, SourcePortResult,
    TreeNode,
};
pub use projection::{files_for_selection, selected_size, to_selectable_items};
pub use recommend::{estimate_ram, estimate_vram, recommend_gguf};
pub use services::{AnalysisRequest, AnalyzerOptions, RepoAnalyzer};

// Re-exported so callers can cancel without depending on tokio-util directly
pub use tokio_util::sync::CancellationToken;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

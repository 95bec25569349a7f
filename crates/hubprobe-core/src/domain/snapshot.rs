//! The analysis result for one repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{RelatedDownload, SelectableItem};
use super::repo::{FileEntry, RepoRef, RepoType};
use crate::analysis::{
    AudioInfo, DatasetInfo, DiffusersInfo, GgufInfo, LoraInfo, MultimodalInfo, OnnxInfo,
    QuantizedInfo, TransformersInfo, VisionInfo,
};
use crate::utils::format::human_size;
use crate::{command, projection};

/// Parsed configuration documents keyed by repository path.
///
/// Only documents that were fetched and parsed are present.
pub type MetadataMap = BTreeMap<String, Value>;

/// Type-specific analysis record.
///
/// The variant is the repository's type, so a snapshot can never carry a
/// type tag without its matching record, or two records at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "info", rename_all = "lowercase")]
pub enum RepoDetails {
    Gguf(GgufInfo),
    Transformers(TransformersInfo),
    Diffusers(DiffusersInfo),
    Lora(LoraInfo),
    Gptq(QuantizedInfo),
    Awq(QuantizedInfo),
    Onnx(OnnxInfo),
    Dataset(DatasetInfo),
    Audio(AudioInfo),
    Vision(VisionInfo),
    Multimodal(MultimodalInfo),
    Generic,
}

impl RepoDetails {
    pub const fn repo_type(&self) -> RepoType {
        match self {
            Self::Gguf(_) => RepoType::Gguf,
            Self::Transformers(_) => RepoType::Transformers,
            Self::Diffusers(_) => RepoType::Diffusers,
            Self::Lora(_) => RepoType::Lora,
            Self::Gptq(_) => RepoType::Gptq,
            Self::Awq(_) => RepoType::Awq,
            Self::Onnx(_) => RepoType::Onnx,
            Self::Dataset(_) => RepoType::Dataset,
            Self::Audio(_) => RepoType::Audio,
            Self::Vision(_) => RepoType::Vision,
            Self::Multimodal(_) => RepoType::Multimodal,
            Self::Generic => RepoType::Generic,
        }
    }

    pub const fn quantized(&self) -> Option<&QuantizedInfo> {
        match self {
            Self::Gptq(info) | Self::Awq(info) => Some(info),
            _ => None,
        }
    }
}

/// Everything known about a repository after one analysis.
///
/// Built once and read-only afterwards. The file list and total size are
/// private so the total always equals the sum of the file sizes; a
/// deserialized snapshot recomputes the total from its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotRecord")]
pub struct RepoSnapshot {
    /// `owner/name`
    pub repo: String,
    pub is_dataset: bool,
    /// Branch, tag or commit that was analyzed
    pub revision: String,
    /// Commit the revision pointed at, when the refs listing reported it
    pub commit: Option<String>,
    /// Branches and tags, when listed
    #[serde(default)]
    pub refs: Vec<RepoRef>,
    pub analyzed_at: DateTime<Utc>,
    pub metadata: MetadataMap,
    pub details: RepoDetails,
    files: Vec<FileEntry>,
    total_size: u64,
}

/// Serialized form of a snapshot; any stored `total_size` is ignored.
#[derive(Deserialize)]
struct SnapshotRecord {
    repo: String,
    is_dataset: bool,
    revision: String,
    commit: Option<String>,
    #[serde(default)]
    refs: Vec<RepoRef>,
    analyzed_at: DateTime<Utc>,
    metadata: MetadataMap,
    details: RepoDetails,
    files: Vec<FileEntry>,
}

impl From<SnapshotRecord> for RepoSnapshot {
    fn from(record: SnapshotRecord) -> Self {
        let mut snapshot = Self::new(
            record.repo,
            record.is_dataset,
            record.revision,
            record.files,
            record.metadata,
            record.details,
        );
        snapshot.commit = record.commit;
        snapshot.refs = record.refs;
        snapshot.analyzed_at = record.analyzed_at;
        snapshot
    }
}

impl RepoSnapshot {
    pub fn new(
        repo: impl Into<String>,
        is_dataset: bool,
        revision: impl Into<String>,
        files: Vec<FileEntry>,
        metadata: MetadataMap,
        details: RepoDetails,
    ) -> Self {
        let total_size = files.iter().map(|f| f.size).fold(0, u64::saturating_add);
        Self {
            repo: repo.into(),
            is_dataset,
            revision: revision.into(),
            commit: None,
            refs: Vec::new(),
            analyzed_at: Utc::now(),
            metadata,
            details,
            files,
            total_size,
        }
    }

    /// Attach the branch/tag listing and resolve the analyzed revision's commit.
    #[must_use]
    pub fn with_refs(mut self, refs: Vec<RepoRef>) -> Self {
        self.commit = refs
            .iter()
            .find(|r| r.name == self.revision)
            .and_then(|r| r.commit.clone());
        self.refs = refs;
        self
    }

    pub const fn repo_type(&self) -> RepoType {
        self.details.repo_type()
    }

    pub const fn type_description(&self) -> &'static str {
        self.repo_type().description()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn total_size_human(&self) -> String {
        human_size(self.total_size)
    }

    /// Repositories this one needs alongside it (a LoRA's base model).
    pub fn related_downloads(&self) -> Vec<RelatedDownload> {
        match &self.details {
            RepoDetails::Lora(info) => info.related_downloads(),
            _ => Vec::new(),
        }
    }

    /// Download options for this repository.
    pub fn selectable_items(&self) -> Vec<SelectableItem> {
        projection::to_selectable_items(self)
    }

    /// CLI invocation for this repository and revision with the given filters.
    pub fn cli_command<S: AsRef<str>>(&self, filters: &[S]) -> String {
        command::generate_cli_command(&self.repo, self.is_dataset, &self.revision, filters)
    }
}

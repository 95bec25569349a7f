//! Repository-level domain types: the type tag, file entries and git refs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::format::human_size;

// ============================================================================
// Repository Type
// ============================================================================

/// The kind of artifact a repository represents.
///
/// Exactly one tag is assigned per analysis. See [`crate::analysis::classify`]
/// for the priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Gguf,
    Transformers,
    Diffusers,
    Lora,
    Gptq,
    Awq,
    Onnx,
    Dataset,
    Audio,
    Vision,
    Multimodal,
    Generic,
}

impl RepoType {
    /// Every repository type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Gguf,
        Self::Transformers,
        Self::Diffusers,
        Self::Lora,
        Self::Gptq,
        Self::Awq,
        Self::Onnx,
        Self::Dataset,
        Self::Audio,
        Self::Vision,
        Self::Multimodal,
        Self::Generic,
    ];

    /// Get the canonical lowercase tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gguf => "gguf",
            Self::Transformers => "transformers",
            Self::Diffusers => "diffusers",
            Self::Lora => "lora",
            Self::Gptq => "gptq",
            Self::Awq => "awq",
            Self::Onnx => "onnx",
            Self::Dataset => "dataset",
            Self::Audio => "audio",
            Self::Vision => "vision",
            Self::Multimodal => "multimodal",
            Self::Generic => "generic",
        }
    }

    /// Human-readable description of the repository type.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Gguf => "GGUF quantized model (llama.cpp, Ollama)",
            Self::Transformers => "Transformers model (safetensors)",
            Self::Diffusers => "Diffusers pipeline (Stable Diffusion, SDXL, Flux)",
            Self::Lora => "LoRA/PEFT adapter",
            Self::Gptq => "GPTQ quantized model",
            Self::Awq => "AWQ quantized model",
            Self::Onnx => "ONNX model",
            Self::Dataset => "HuggingFace dataset",
            Self::Audio => "Audio model (ASR, TTS)",
            Self::Vision => "Vision model",
            Self::Multimodal => "Multimodal model (VLM)",
            Self::Generic => "Generic repository",
        }
    }

    /// Whether the specialized-type refinement pass may reclassify this type.
    #[must_use]
    pub const fn is_refinable(&self) -> bool {
        matches!(self, Self::Transformers | Self::Generic)
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RepoType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|t| t.as_str() == lower)
            .copied()
            .ok_or(())
    }
}

// ============================================================================
// File Entry
// ============================================================================

/// A single file in the repository tree.
///
/// Produced by the tree walk and never mutated afterwards. For LFS files the
/// size and hash are the pointer's true values, not the pointer file's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Base name (last path segment)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Whether the file is stored in Git LFS
    pub is_lfs: bool,
    /// Content hash, only known for LFS files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Parent directory, empty for files at the root
    pub directory: String,
}

impl FileEntry {
    /// Create a plain (non-LFS) entry, deriving name and directory from the path.
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let (directory, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (dir.to_string(), name.to_string()),
            None => (String::new(), path.clone()),
        };
        Self {
            path,
            name,
            size,
            is_lfs: false,
            sha256: None,
            directory,
        }
    }

    /// Create an LFS-backed entry.
    pub fn lfs(path: impl Into<String>, size: u64, sha256: Option<String>) -> Self {
        Self {
            is_lfs: true,
            sha256,
            ..Self::new(path, size)
        }
    }

    /// Lowercased extension without the dot, or an empty string.
    ///
    /// `.tar.gz` is reported as the compound `tar.gz`.
    #[must_use]
    pub fn extension(&self) -> String {
        let lower = self.name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") {
            return "tar.gz".to_string();
        }
        lower
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default()
    }

    /// Case-insensitive check of the final extension (without dot).
    #[must_use]
    pub fn has_extension(&self, ext: &str) -> bool {
        std::path::Path::new(&self.name)
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Name without its final extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }

    /// Size formatted with binary units.
    #[must_use]
    pub fn size_human(&self) -> String {
        human_size(self.size)
    }
}

// ============================================================================
// Git References
// ============================================================================

/// Whether a ref is a branch or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

/// A branch or tag of a repository, as offered to a branch picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Branch or tag name (e.g. `main`, `v1.0`)
    pub name: String,
    /// Branch or tag
    pub kind: RefKind,
    /// Target commit SHA, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

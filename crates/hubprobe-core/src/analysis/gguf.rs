//! GGUF quantization analysis.
//!
//! Files are grouped by the quantization code found in their name, so the
//! shards of one quantization form a single entry. Files without a
//! recognizable code are grouped by their shard-stripped stem.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_QUALITY, FileEntry, QuantLevel};
use crate::recommend::estimate_ram;
use crate::utils::shard_filename::base_shard_stem;

/// Name reported for files with no recognizable quantization code.
pub const UNKNOWN_QUANT: &str = "Unknown";

static QUANT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(IQ[234]_(?:XXS|XS|S|M|NL)|Q[2-8]_[01KL](?:_[SML])?|Q[2-8]_K(?:_[SML])?|BF16|F(?:16|32))",
    )
    .expect("quantization pattern is valid")
});

static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)[Bb]").expect("parameter pattern is valid")
});

static MODEL_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)[-._](?:IQ|Q|F|BF)\d").expect("model name pattern is valid")
});

// ============================================================================
// Types
// ============================================================================

/// Analysis result for a GGUF repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GgufInfo {
    /// Model name taken from the first GGUF filename (e.g. `llama 2 7b`)
    pub model_name: Option<String>,
    /// Parameter count taken from the first GGUF filename (e.g. `7B`)
    pub parameter_count: Option<String>,
    /// Quantizations, best quality first, smaller first among equals
    pub quantizations: Vec<GgufQuantization>,
}

/// One quantization level available in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GgufQuantization {
    /// Lowercase token identifying this entry (`q4_k_m`, or a file stem)
    pub id: String,
    /// Uppercase code (`Q4_K_M`) or `Unknown`
    pub name: String,
    /// Rated level, when the code is in the quality table
    pub level: Option<QuantLevel>,
    pub quality: u8,
    pub description: String,
    /// Files of this quantization, in path order
    pub files: Vec<FileEntry>,
    /// Sum of file sizes
    pub size: u64,
    /// Estimated RAM to load the model
    pub estimated_ram: u64,
}

impl GgufQuantization {
    fn new(id: String, name: String, mut files: Vec<FileEntry>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let size = files.iter().map(|f| f.size).fold(0, u64::saturating_add);
        let level = name.parse::<QuantLevel>().ok();

        let (quality, description) = match level {
            Some(level) => (level.quality(), level.description().to_string()),
            None if name == UNKNOWN_QUANT => {
                (DEFAULT_QUALITY, "Unknown quantization format".to_string())
            }
            None => (DEFAULT_QUALITY, "Quantized model".to_string()),
        };

        Self {
            id,
            name,
            level,
            quality,
            description,
            files,
            size,
            estimated_ram: estimate_ram(size),
        }
    }

    /// Whether this quantization spans multiple files.
    pub fn is_sharded(&self) -> bool {
        self.files.len() > 1
    }

    /// Repository paths of every file in this quantization.
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Extract the quantization code from a filename, uppercased.
pub fn quant_code(filename: &str) -> Option<String> {
    let upper = filename.to_ascii_uppercase();
    QUANT_PATTERN
        .captures(&upper)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parameter count such as `7B` or `1.5B` from a filename.
pub fn parameter_count(filename: &str) -> Option<String> {
    PARAM_PATTERN
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("{}B", m.as_str()))
}

/// Model name preceding the quantization code, with separators as spaces.
pub fn model_name(filename: &str) -> Option<String> {
    MODEL_NAME_PATTERN
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(['-', '_'], " "))
}

/// Analyze the GGUF files of a repository.
///
/// Returns `None` when the file list contains no `.gguf` file.
pub fn analyze_gguf(files: &[FileEntry]) -> Option<GgufInfo> {
    let gguf_files: Vec<&FileEntry> = files.iter().filter(|f| f.has_extension("gguf")).collect();
    let first = gguf_files.first()?;

    let mut groups: BTreeMap<String, (String, Vec<FileEntry>)> = BTreeMap::new();
    for file in &gguf_files {
        let (id, name) = quant_code(&file.name).map_or_else(
            || {
                (
                    base_shard_stem(file.stem()).to_ascii_lowercase(),
                    UNKNOWN_QUANT.to_string(),
                )
            },
            |code| (code.to_ascii_lowercase(), code),
        );
        groups
            .entry(id)
            .or_insert_with(|| (name, Vec::new()))
            .1
            .push((*file).clone());
    }

    let mut quantizations: Vec<GgufQuantization> = groups
        .into_iter()
        .map(|(id, (name, files))| GgufQuantization::new(id, name, files))
        .collect();
    sort_by_quality(&mut quantizations);

    Some(GgufInfo {
        model_name: model_name(&first.name),
        parameter_count: parameter_count(&first.name),
        quantizations,
    })
}

/// Sort best quality first, then smaller size first.
pub(crate) fn sort_by_quality(quantizations: &mut [GgufQuantization]) {
    quantizations.sort_by(|a, b| b.quality.cmp(&a.quality).then(a.size.cmp(&b.size)));
}

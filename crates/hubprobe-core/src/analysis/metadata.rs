//! Which configuration documents to fetch, and guarded field access on them.
//!
//! Every accessor yields `None` when a key is missing or has the wrong JSON
//! type. Analyzers never index into documents directly.

use serde_json::{Map, Value};

use crate::domain::{FileEntry, MetadataMap, RepoType};

/// Upper bound for a single configuration document.
pub const MAX_METADATA_BYTES: u64 = 10 * 1024 * 1024;

pub const CONFIG_JSON: &str = "config.json";
pub const MODEL_INDEX_JSON: &str = "model_index.json";
pub const ADAPTER_CONFIG_JSON: &str = "adapter_config.json";
pub const QUANTIZE_CONFIG_JSON: &str = "quantize_config.json";
pub const TOKENIZER_CONFIG_JSON: &str = "tokenizer_config.json";
pub const GENERATION_CONFIG_JSON: &str = "generation_config.json";
pub const PREPROCESSOR_CONFIG_JSON: &str = "preprocessor_config.json";
pub const PROCESSOR_CONFIG_JSON: &str = "processor_config.json";

// ============================================================================
// Fetch Whitelist
// ============================================================================

/// Configuration documents relevant to a repository type.
#[must_use]
pub const fn metadata_paths(repo_type: RepoType) -> &'static [&'static str] {
    match repo_type {
        RepoType::Gguf | RepoType::Onnx => &[CONFIG_JSON],
        RepoType::Diffusers => &[MODEL_INDEX_JSON],
        RepoType::Lora => &[ADAPTER_CONFIG_JSON],
        RepoType::Gptq | RepoType::Awq => &[QUANTIZE_CONFIG_JSON, CONFIG_JSON],
        RepoType::Dataset => &[],
        RepoType::Transformers
        | RepoType::Audio
        | RepoType::Vision
        | RepoType::Multimodal => &[
            CONFIG_JSON,
            TOKENIZER_CONFIG_JSON,
            GENERATION_CONFIG_JSON,
            PREPROCESSOR_CONFIG_JSON,
            PROCESSOR_CONFIG_JSON,
        ],
        RepoType::Generic => &[
            CONFIG_JSON,
            PREPROCESSOR_CONFIG_JSON,
            PROCESSOR_CONFIG_JSON,
        ],
    }
}

/// The whitelisted paths that actually exist in the file list, in whitelist order.
pub fn paths_to_fetch(repo_type: RepoType, files: &[FileEntry]) -> Vec<&'static str> {
    metadata_paths(repo_type)
        .iter()
        .copied()
        .filter(|path| files.iter().any(|f| f.path == *path))
        .collect()
}

// ============================================================================
// Guarded Access
// ============================================================================

/// Look up a document that parsed as a JSON object.
pub fn document<'a>(metadata: &'a MetadataMap, path: &str) -> Option<&'a Map<String, Value>> {
    metadata.get(path).and_then(Value::as_object)
}

pub fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Owned, non-empty string field.
pub fn get_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    get_str(obj, key)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub fn get_bool(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

pub fn get_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// Non-negative integer field; integral floats such as `4096.0` are accepted.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn get_u64(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = obj.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Signed integer field; integral floats such as `128.0` are accepted.
pub fn get_i64(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub fn get_u32(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    get_u64(obj, key).and_then(|v| u32::try_from(v).ok())
}

pub fn get_object<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

/// String elements of an array field; non-string elements are skipped.
pub fn get_str_list(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    obj.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect()
    })
}

/// Numeric elements of an array field; non-numeric elements are skipped.
pub fn get_f64_list(obj: &Map<String, Value>, key: &str) -> Option<Vec<f64>> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_f64).collect())
}

/// First element of a string array, e.g. `architectures[0]`.
pub fn first_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
}

/// Lowercased `model_type` of a config document.
pub fn model_type_lower(obj: &Map<String, Value>) -> Option<String> {
    get_str(obj, "model_type").map(str::to_ascii_lowercase)
}

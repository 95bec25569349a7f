//! ONNX model files.

use serde::{Deserialize, Serialize};

use crate::domain::FileEntry;
use crate::utils::format::human_size;

/// Runtimes able to load any ONNX export.
pub const BASE_RUNTIMES: [&str; 2] = ["onnxruntime", "onnxruntime-gpu"];

/// Runtime added when a file targets CUDA or a GPU.
pub const GPU_RUNTIME: &str = "tensorrt";

/// Analysis result for an ONNX repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxInfo {
    /// Models in file-list order
    pub models: Vec<OnnxModel>,
    /// Any model is an optimized export
    pub optimized: bool,
    /// Any model is int8 or int4
    pub quantized: bool,
    pub runtimes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxModel {
    pub path: String,
    /// File name without `.onnx`
    pub name: String,
    pub size: u64,
    /// `fp16`, `int8`, `int4` or `fp32`
    pub variant: String,
    pub optimized: bool,
}

impl OnnxModel {
    pub fn size_human(&self) -> String {
        human_size(self.size)
    }

    pub fn is_quantized(&self) -> bool {
        matches!(self.variant.as_str(), "int8" | "int4")
    }
}

impl OnnxInfo {
    /// The default model: the first full-precision export, else the first.
    pub fn default_model(&self) -> Option<&OnnxModel> {
        self.models
            .iter()
            .find(|m| m.variant == "fp32")
            .or_else(|| self.models.first())
    }
}

/// Precision variant from a model filename.
pub fn onnx_variant(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.contains("fp16") {
        "fp16"
    } else if lower.contains("int8") || lower.contains("quantized") {
        "int8"
    } else if lower.contains("int4") {
        "int4"
    } else {
        "fp32"
    }
}

/// Whether a model name marks an optimized export (`optimized`, or an `opt` name token).
fn is_optimized(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("optimized") || lower.split(['-', '_', '.']).any(|token| token == "opt")
}

/// Analyze the `.onnx` files of a repository.
pub fn analyze_onnx(files: &[FileEntry]) -> OnnxInfo {
    let models: Vec<OnnxModel> = files
        .iter()
        .filter(|f| f.has_extension("onnx"))
        .map(|f| {
            let name = f.stem().to_string();
            OnnxModel {
                path: f.path.clone(),
                variant: onnx_variant(&name).to_string(),
                optimized: is_optimized(&name),
                name,
                size: f.size,
            }
        })
        .collect();

    let mut runtimes: Vec<String> = BASE_RUNTIMES.iter().map(ToString::to_string).collect();
    let gpu_export = models.iter().any(|m| {
        let lower = m.name.to_ascii_lowercase();
        lower.contains("cuda") || lower.contains("gpu")
    });
    if gpu_export {
        runtimes.push(GPU_RUNTIME.to_string());
    }

    OnnxInfo {
        optimized: models.iter().any(|m| m.optimized),
        quantized: models.iter().any(OnnxModel::is_quantized),
        models,
        runtimes,
    }
}

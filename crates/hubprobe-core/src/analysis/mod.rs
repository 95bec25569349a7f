//! Classification and per-type extraction.
//!
//! Every function in this module is pure: it reads a file list and the
//! fetched configuration documents and performs no I/O.

pub mod classify;
pub mod dataset;
pub mod diffusers;
pub mod gguf;
pub mod lora;
pub mod metadata;
pub mod onnx;
pub mod quantized;
pub mod specialized;
pub mod transformers;

pub use classify::classify;
pub use dataset::{DatasetInfo, DatasetSplit, analyze_dataset};
pub use diffusers::{DiffusersComponent, DiffusersInfo, analyze_diffusers};
pub use gguf::{GgufInfo, GgufQuantization, analyze_gguf};
pub use lora::{LoraInfo, analyze_lora};
pub use metadata::{metadata_paths, paths_to_fetch};
pub use onnx::{OnnxInfo, OnnxModel, analyze_onnx};
pub use quantized::{QuantizedInfo, analyze_quantized};
pub use specialized::{
    AudioInfo, ImageNormalization, ImageSize, MultimodalInfo, VisionInfo, analyze_audio,
    analyze_multimodal, analyze_vision, detect_specialized_type,
};
pub use transformers::{TokenizerInfo, TransformersInfo, WeightFile, analyze_transformers};

use crate::domain::{FileEntry, MetadataMap, RepoDetails, RepoType};

/// Single refinement pass over a structural classification.
///
/// Only `transformers` and `generic` are refinable. The result of a
/// refinement is never refined again, so calling this on its own output
/// returns that output unchanged.
pub fn refine(initial: RepoType, files: &[FileEntry], metadata: &MetadataMap) -> RepoType {
    if !initial.is_refinable() {
        return initial;
    }
    detect_specialized_type(files, metadata).unwrap_or(initial)
}

/// Run the analyzer for `repo_type` and wrap its record.
///
/// The returned details may name a different type than requested: a
/// GGUF classification with no `.gguf` files degrades to generic, and a
/// GPTQ classification whose config says `awq` becomes AWQ. Without a
/// known method the requested quantized type is kept.
pub fn analyze(repo_type: RepoType, files: &[FileEntry], metadata: &MetadataMap) -> RepoDetails {
    match repo_type {
        RepoType::Gguf => analyze_gguf(files).map_or(RepoDetails::Generic, RepoDetails::Gguf),
        RepoType::Transformers => RepoDetails::Transformers(analyze_transformers(files, metadata)),
        RepoType::Diffusers => RepoDetails::Diffusers(analyze_diffusers(files, metadata)),
        RepoType::Lora => RepoDetails::Lora(analyze_lora(metadata)),
        RepoType::Gptq | RepoType::Awq => {
            let info = analyze_quantized(metadata);
            let awq = info.is_awq() || (repo_type == RepoType::Awq && info.method.is_none());
            if awq {
                RepoDetails::Awq(info)
            } else {
                RepoDetails::Gptq(info)
            }
        }
        RepoType::Onnx => RepoDetails::Onnx(analyze_onnx(files)),
        RepoType::Dataset => RepoDetails::Dataset(analyze_dataset(files)),
        RepoType::Audio => RepoDetails::Audio(analyze_audio(files, metadata)),
        RepoType::Vision => RepoDetails::Vision(analyze_vision(files, metadata)),
        RepoType::Multimodal => RepoDetails::Multimodal(analyze_multimodal(files, metadata)),
        RepoType::Generic => RepoDetails::Generic,
    }
}

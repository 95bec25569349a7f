//! Audio, vision and multimodal models, and the refinement predicates that
//! move a transformers or generic repository into one of those types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::metadata::{
    CONFIG_JSON, PREPROCESSOR_CONFIG_JSON, PROCESSOR_CONFIG_JSON, document, first_str,
    get_f64_list, get_object, get_str, get_string, get_u64, model_type_lower,
};
use crate::domain::{FileEntry, MetadataMap, RepoType};

pub const DEFAULT_AUDIO_TASK: &str = "audio-classification";
pub const DEFAULT_VISION_TASK: &str = "image-classification";
pub const DEFAULT_MULTIMODAL_TASK: &str = "image-to-text";

/// Channel count assumed for vision models (RGB).
pub const DEFAULT_NUM_CHANNELS: u64 = 3;

const AUDIO_MODEL_TYPES: [&str; 8] = [
    "whisper", "wav2vec", "hubert", "speech", "audio", "tts", "vits", "speecht5",
];

const VISION_MODEL_TYPES: [&str; 10] = [
    "vit",
    "resnet",
    "convnext",
    "swin",
    "deit",
    "beit",
    "detr",
    "yolos",
    "segformer",
    "dpt",
];

const MULTIMODAL_MODEL_TYPES: [&str; 12] = [
    "llava",
    "blip",
    "clip",
    "flava",
    "git",
    "pix2struct",
    "idefics",
    "fuyu",
    "paligemma",
    "qwen2_vl",
    "internvl",
    "cogvlm",
];

// ============================================================================
// Types
// ============================================================================

/// Analysis result for an audio model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub task: String,
    pub task_description: Option<String>,
    /// `processor_class`, else `feature_extractor_type`
    pub feature_extractor_type: Option<String>,
    pub sample_rate: Option<u64>,
    pub num_mel_bins: Option<u64>,
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    pub framework: String,
}

/// Input resolution of an image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: u64,
    pub width: u64,
}

impl ImageSize {
    pub const fn square(side: u64) -> Self {
        Self {
            height: side,
            width: side,
        }
    }
}

/// Per-channel normalization statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageNormalization {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Analysis result for a vision model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionInfo {
    pub task: String,
    pub task_description: Option<String>,
    /// `processor_class`, else `image_processor_type`
    pub image_processor_type: Option<String>,
    pub image_size: Option<ImageSize>,
    pub num_channels: u64,
    pub num_labels: Option<u64>,
    pub normalization: Option<ImageNormalization>,
    pub framework: String,
}

/// Analysis result for a multimodal model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultimodalInfo {
    pub task: String,
    pub task_description: Option<String>,
    /// Input modalities in `image`, `text`, `audio` order
    pub modalities: Vec<String>,
    pub processor_type: Option<String>,
    /// `vision_config.model_type`
    pub vision_encoder: Option<String>,
    /// `text_config.model_type`
    pub text_encoder: Option<String>,
    pub image_size: Option<ImageSize>,
    /// `text_config.max_position_embeddings`
    pub max_text_length: Option<u64>,
    pub framework: String,
}

// ============================================================================
// Task Tables
// ============================================================================

pub fn audio_task_description(task: &str) -> Option<&'static str> {
    let desc = match task {
        "automatic-speech-recognition" => {
            "Automatic Speech Recognition (ASR) - transcribes audio to text"
        }
        "audio-classification" => "Audio Classification - categorizes audio into classes",
        "text-to-speech" => "Text-to-Speech (TTS) - generates speech from text",
        "text-to-audio" => "Text-to-Audio - generates audio from text descriptions",
        "audio-to-audio" => "Audio-to-Audio - transforms audio (e.g., voice conversion)",
        "voice-activity-detection" => "Voice Activity Detection - detects speech in audio",
        _ => return None,
    };
    Some(desc)
}

pub fn vision_task_description(task: &str) -> Option<&'static str> {
    let desc = match task {
        "image-classification" => "Image Classification - categorizes images into classes",
        "object-detection" => "Object Detection - locates and identifies objects in images",
        "image-segmentation" => "Image Segmentation - segments images into regions",
        "semantic-segmentation" => "Semantic Segmentation - classifies each pixel",
        "instance-segmentation" => {
            "Instance Segmentation - identifies individual object instances"
        }
        "panoptic-segmentation" => {
            "Panoptic Segmentation - combines semantic and instance segmentation"
        }
        "depth-estimation" => "Depth Estimation - estimates depth from images",
        "image-to-image" => "Image-to-Image - transforms images",
        "unconditional-image-generation" => {
            "Unconditional Image Generation - generates images without prompts"
        }
        "zero-shot-image-classification" => {
            "Zero-Shot Classification - classifies without training"
        }
        _ => return None,
    };
    Some(desc)
}

pub fn multimodal_task_description(task: &str) -> Option<&'static str> {
    let desc = match task {
        "visual-question-answering" => {
            "Visual Question Answering (VQA) - answers questions about images"
        }
        "image-to-text" => "Image-to-Text - generates text descriptions of images",
        "image-text-to-text" => "Image-Text-to-Text - generates text from image and text input",
        "document-question-answering" => "Document QA - answers questions about documents",
        "video-text-to-text" => "Video-Text-to-Text - generates text from video and text input",
        "any-to-any" => "Any-to-Any - handles multiple modalities",
        _ => return None,
    };
    Some(desc)
}

// ============================================================================
// Shared Helpers
// ============================================================================

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn config_model_type(metadata: &MetadataMap) -> Option<String> {
    document(metadata, CONFIG_JSON).and_then(model_type_lower)
}

fn config_architecture(metadata: &MetadataMap) -> Option<String> {
    document(metadata, CONFIG_JSON)
        .and_then(|cfg| first_str(cfg, "architectures"))
        .map(str::to_ascii_lowercase)
}

/// Framework implied by the first weight-like file.
pub fn detect_framework(files: &[FileEntry]) -> &'static str {
    files
        .iter()
        .find_map(|f| match f.extension().as_str() {
            "safetensors" | "bin" => Some("transformers"),
            "onnx" => Some("onnx"),
            "pt" | "pth" => Some("pytorch"),
            _ => None,
        })
        .unwrap_or("transformers")
}

/// `size` as `{height, width}`, `{shortest_edge}` or a single number.
fn image_size(value: Option<&Value>) -> Option<ImageSize> {
    match value? {
        Value::Object(size) => {
            let height = get_u64(size, "height");
            let width = get_u64(size, "width");
            match (height, width) {
                (Some(height), Some(width)) => Some(ImageSize { height, width }),
                _ => get_u64(size, "shortest_edge").map(ImageSize::square),
            }
        }
        Value::Number(n) => n.as_u64().map(ImageSize::square),
        _ => None,
    }
}

fn processor_type(cfg: &Map<String, Value>, fallback_key: &str) -> Option<String> {
    get_string(cfg, "processor_class").or_else(|| get_string(cfg, fallback_key))
}

// ============================================================================
// Audio
// ============================================================================

/// Whether metadata describes an audio model.
pub fn is_audio_model(metadata: &MetadataMap) -> bool {
    if let Some(pre) = document(metadata, PREPROCESSOR_CONFIG_JSON) {
        if pre.contains_key("sampling_rate") || pre.contains_key("num_mel_bins") {
            return true;
        }
        if get_str(pre, "feature_extractor_type").is_some_and(|fe| {
            contains_any(
                &fe.to_ascii_lowercase(),
                &["audio", "speech", "wav2vec", "whisper"],
            )
        }) {
            return true;
        }
    }
    config_model_type(metadata).is_some_and(|mt| contains_any(&mt, &AUDIO_MODEL_TYPES))
}

fn detect_audio_task(files: &[FileEntry], metadata: &MetadataMap) -> String {
    if let Some(mt) = config_model_type(metadata) {
        if contains_any(&mt, &["whisper", "wav2vec", "speech", "asr"]) {
            return "automatic-speech-recognition".to_string();
        }
        if contains_any(&mt, &["tts", "vits", "speecht5"]) {
            return "text-to-speech".to_string();
        }
    }

    files
        .iter()
        .find_map(|f| {
            let name = f.name.to_ascii_lowercase();
            if contains_any(&name, &["asr", "stt"]) {
                Some("automatic-speech-recognition")
            } else if name.contains("tts") {
                Some("text-to-speech")
            } else {
                None
            }
        })
        .unwrap_or(DEFAULT_AUDIO_TASK)
        .to_string()
}

/// Analyze an audio model.
pub fn analyze_audio(files: &[FileEntry], metadata: &MetadataMap) -> AudioInfo {
    let mut info = AudioInfo::default();

    if let Some(pre) = document(metadata, PREPROCESSOR_CONFIG_JSON) {
        info.feature_extractor_type = processor_type(pre, "feature_extractor_type");
        info.sample_rate = get_u64(pre, "sampling_rate");
        info.num_mel_bins = get_u64(pre, "num_mel_bins");
        info.max_length = get_u64(pre, "max_length");
    }

    let mut task = None;
    if let Some(cfg) = document(metadata, CONFIG_JSON) {
        task = get_object(cfg, "task_specific_params").and_then(|p| p.keys().next().cloned());
        let multilingual = cfg
            .get("forced_decoder_ids")
            .and_then(Value::as_array)
            .is_some_and(|ids| !ids.is_empty());
        if multilingual {
            info.languages.push("multilingual".to_string());
        }
    }

    info.task = task.unwrap_or_else(|| detect_audio_task(files, metadata));
    info.task_description = audio_task_description(&info.task).map(ToString::to_string);
    info.framework = detect_framework(files).to_string();
    info
}

// ============================================================================
// Vision
// ============================================================================

/// Whether metadata describes a vision model.
pub fn is_vision_model(metadata: &MetadataMap) -> bool {
    if let Some(pre) = document(metadata, PREPROCESSOR_CONFIG_JSON) {
        if pre.contains_key("image_mean") || pre.contains_key("image_std") {
            return true;
        }
        if let Some(kind) = get_str(pre, "image_processor_type") {
            return !kind.is_empty();
        }
    }
    config_model_type(metadata).is_some_and(|mt| contains_any(&mt, &VISION_MODEL_TYPES))
}

fn detect_vision_task(metadata: &MetadataMap) -> &'static str {
    if let Some(mt) = config_model_type(metadata) {
        if contains_any(&mt, &["detr", "yolo"]) {
            return "object-detection";
        }
        if contains_any(&mt, &["segformer", "mask2former"]) {
            return "image-segmentation";
        }
        if contains_any(&mt, &["depth", "dpt"]) {
            return "depth-estimation";
        }
    }
    if let Some(arch) = config_architecture(metadata) {
        if arch.contains("fordetection") {
            return "object-detection";
        }
        if arch.contains("segmentation") {
            return "image-segmentation";
        }
        if arch.contains("classification") {
            return "image-classification";
        }
    }
    DEFAULT_VISION_TASK
}

/// Analyze a vision model.
pub fn analyze_vision(files: &[FileEntry], metadata: &MetadataMap) -> VisionInfo {
    let mut info = VisionInfo::default();

    if let Some(pre) = document(metadata, PREPROCESSOR_CONFIG_JSON) {
        info.image_processor_type = processor_type(pre, "image_processor_type");
        info.image_size = image_size(pre.get("size"));

        let mean = get_f64_list(pre, "image_mean");
        let std = get_f64_list(pre, "image_std");
        if mean.is_some() || std.is_some() {
            info.normalization = Some(ImageNormalization {
                mean: mean.unwrap_or_default(),
                std: std.unwrap_or_default(),
            });
        }
    }

    let mut num_channels = None;
    if let Some(cfg) = document(metadata, CONFIG_JSON) {
        info.num_labels = get_u64(cfg, "num_labels");
        num_channels = get_u64(cfg, "num_channels").filter(|c| *c > 0);
    }
    info.num_channels = num_channels.unwrap_or(DEFAULT_NUM_CHANNELS);

    info.task = detect_vision_task(metadata).to_string();
    info.task_description = vision_task_description(&info.task).map(ToString::to_string);
    info.framework = detect_framework(files).to_string();
    info
}

// ============================================================================
// Multimodal
// ============================================================================

/// Whether metadata describes a multimodal model.
///
/// True for configs with both `vision_config` and `text_config`, for known
/// multimodal model types, or whenever `processor_config.json` was fetched.
pub fn is_multimodal_model(metadata: &MetadataMap) -> bool {
    if let Some(cfg) = document(metadata, CONFIG_JSON) {
        if cfg.contains_key("vision_config") && cfg.contains_key("text_config") {
            return true;
        }
        if model_type_lower(cfg).is_some_and(|mt| contains_any(&mt, &MULTIMODAL_MODEL_TYPES)) {
            return true;
        }
    }
    metadata.contains_key(PROCESSOR_CONFIG_JSON)
}

fn detect_multimodal_task(metadata: &MetadataMap) -> &'static str {
    if let Some(mt) = config_model_type(metadata) {
        if contains_any(&mt, &["llava", "idefics", "paligemma", "qwen2_vl"]) {
            return "image-text-to-text";
        }
        if contains_any(&mt, &["blip", "git"]) {
            return "image-to-text";
        }
        if mt.contains("vqa") {
            return "visual-question-answering";
        }
    }
    if config_architecture(metadata)
        .is_some_and(|arch| contains_any(&arch, &["forcausallm", "conditiongeneration"]))
    {
        return "image-text-to-text";
    }
    DEFAULT_MULTIMODAL_TASK
}

/// Analyze a multimodal model.
pub fn analyze_multimodal(files: &[FileEntry], metadata: &MetadataMap) -> MultimodalInfo {
    let mut info = MultimodalInfo::default();

    if let Some(processor) = document(metadata, PROCESSOR_CONFIG_JSON) {
        info.processor_type = get_string(processor, "processor_class");
    }

    if let Some(cfg) = document(metadata, CONFIG_JSON) {
        if let Some(vision) = get_object(cfg, "vision_config") {
            info.vision_encoder = get_string(vision, "model_type");
            info.image_size = get_u64(vision, "image_size").map(ImageSize::square);
            info.modalities.push("image".to_string());
        }
        if let Some(text) = get_object(cfg, "text_config") {
            info.text_encoder = get_string(text, "model_type");
            info.max_text_length = get_u64(text, "max_position_embeddings");
            info.modalities.push("text".to_string());
        }
        if get_object(cfg, "audio_config").is_some() {
            info.modalities.push("audio".to_string());
        }
    }

    info.task = detect_multimodal_task(metadata).to_string();
    info.task_description = multimodal_task_description(&info.task).map(ToString::to_string);
    info.framework = detect_framework(files).to_string();
    info
}

// ============================================================================
// Refinement
// ============================================================================

/// A more specific type for a transformers or generic repository, if any.
///
/// Checked in order: multimodal, audio, vision, then ONNX files.
pub fn detect_specialized_type(files: &[FileEntry], metadata: &MetadataMap) -> Option<RepoType> {
    if is_multimodal_model(metadata) {
        Some(RepoType::Multimodal)
    } else if is_audio_model(metadata) {
        Some(RepoType::Audio)
    } else if is_vision_model(metadata) {
        Some(RepoType::Vision)
    } else if files.iter().any(|f| f.has_extension("onnx")) {
        Some(RepoType::Onnx)
    } else {
        None
    }
}

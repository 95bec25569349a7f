//! Diffusion pipeline analysis from `model_index.json`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::metadata::{MODEL_INDEX_JSON, document, get_string};
use crate::domain::{FileEntry, MetadataMap};
use crate::utils::format::human_size;

/// Precision variants recognized in file and directory names.
pub const PRECISION_VARIANTS: [&str; 3] = ["fp16", "fp32", "bf16"];

const DEFAULT_PIPELINE_DESCRIPTION: &str = "Diffusers pipeline";

/// Analysis result for a diffusers repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffusersInfo {
    /// `_class_name`, e.g. `StableDiffusionXLPipeline`
    pub pipeline_type: Option<String>,
    pub pipeline_description: Option<String>,
    /// `_diffusers_version`
    pub diffusers_version: Option<String>,
    /// Components in name order
    pub components: Vec<DiffusersComponent>,
    /// Precision variants with dedicated files, sorted
    pub variants: Vec<String>,
    /// Precisions available, sorted; plain weight files count as `fp32`
    pub precisions: Vec<String>,
}

/// A named sub-model of a pipeline (`unet`, `vae`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffusersComponent {
    pub name: String,
    pub library: Option<String>,
    pub class_name: Option<String>,
    /// Total size of the files under `<name>/`
    pub size: u64,
    /// Paths under `<name>/`
    pub files: Vec<String>,
    /// Whether the pipeline cannot run without it
    pub required: bool,
}

impl DiffusersComponent {
    pub fn size_human(&self) -> String {
        human_size(self.size)
    }

    /// Display description: the class name, else `<library> component`.
    pub fn description(&self) -> String {
        match (&self.class_name, &self.library) {
            (Some(class), _) => class.clone(),
            (None, Some(lib)) => format!("{lib} component"),
            (None, None) => "Pipeline component".to_string(),
        }
    }
}

impl DiffusersInfo {
    pub fn component(&self, name: &str) -> Option<&DiffusersComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn required_components(&self) -> impl Iterator<Item = &DiffusersComponent> {
        self.components.iter().filter(|c| c.required)
    }
}

// ============================================================================
// Static Tables
// ============================================================================

pub fn pipeline_description(class_name: &str) -> Option<&'static str> {
    let desc = match class_name {
        "StableDiffusionPipeline" => "Stable Diffusion v1.x text-to-image",
        "StableDiffusionImg2ImgPipeline" => "Stable Diffusion image-to-image",
        "StableDiffusionInpaintPipeline" => "Stable Diffusion inpainting",
        "StableDiffusionXLPipeline" => "Stable Diffusion XL text-to-image",
        "StableDiffusionXLImg2ImgPipeline" => "SDXL image-to-image",
        "StableDiffusionXLInpaintPipeline" => "SDXL inpainting",
        "FluxPipeline" => "Flux text-to-image",
        "FluxImg2ImgPipeline" => "Flux image-to-image",
        "FluxControlNetPipeline" => "Flux with ControlNet",
        "KandinskyPipeline" => "Kandinsky v2 text-to-image",
        "KandinskyV22Pipeline" => "Kandinsky v2.2 text-to-image",
        "StableVideoDiffusionPipeline" => "Stable Video Diffusion",
        "PixArtAlphaPipeline" => "PixArt-α text-to-image",
        "HunyuanDiTPipeline" => "Hunyuan-DiT text-to-image",
        "WuerstchenPipeline" => "Würstchen text-to-image",
        "AnimateDiffPipeline" => "AnimateDiff animation",
        "LatentConsistencyModelPipeline" => "LCM fast inference",
        _ => return None,
    };
    Some(desc)
}

/// Components a known pipeline class cannot run without.
pub fn required_components(class_name: &str) -> &'static [&'static str] {
    match class_name {
        "StableDiffusionPipeline" => &["unet", "vae", "text_encoder", "tokenizer", "scheduler"],
        "StableDiffusionXLPipeline" => &[
            "unet",
            "vae",
            "text_encoder",
            "text_encoder_2",
            "tokenizer",
            "tokenizer_2",
            "scheduler",
        ],
        "FluxPipeline" => &[
            "transformer",
            "vae",
            "text_encoder",
            "text_encoder_2",
            "tokenizer",
            "tokenizer_2",
            "scheduler",
        ],
        _ => &[],
    }
}

pub fn variant_description(variant: &str) -> &'static str {
    match variant {
        "fp16" => "Half precision - Recommended, uses less VRAM",
        "fp32" => "Full precision - Maximum quality, more VRAM",
        "bf16" => "Brain float - Good quality, efficient on modern GPUs",
        _ => "Model variant",
    }
}

// ============================================================================
// File Helpers
// ============================================================================

/// Whether a file is tagged with a precision variant, by name
/// (`model.fp16.safetensors`, `model_fp16.bin`) or by directory (`.../fp16/`).
pub fn has_variant(file: &FileEntry, variant: &str) -> bool {
    let name = file.name.to_ascii_lowercase();
    let dir = file.directory.to_ascii_lowercase();
    name.contains(&format!(".{variant}."))
        || name.contains(&format!("_{variant}."))
        || dir.split('/').any(|segment| segment == variant)
}

/// Variant tag of a file, if it carries one.
fn file_variant(file: &FileEntry) -> Option<&'static str> {
    PRECISION_VARIANTS
        .iter()
        .copied()
        .find(|v| has_variant(file, v))
}

/// Files under `<component>/`, plus root-level files named after the component.
pub fn component_files<'a>(files: &'a [FileEntry], component: &str) -> Vec<&'a FileEntry> {
    let prefix = format!("{component}/");
    files
        .iter()
        .filter(|f| {
            f.path.starts_with(&prefix) || (f.directory.is_empty() && f.name.starts_with(component))
        })
        .collect()
}

fn detect_variants(files: &[FileEntry]) -> Vec<String> {
    let found: BTreeSet<&str> = files.iter().filter_map(file_variant).collect();
    found.into_iter().map(ToString::to_string).collect()
}

fn detect_precisions(files: &[FileEntry], variants: &[String]) -> Vec<String> {
    let mut found: BTreeSet<String> = variants.iter().cloned().collect();
    let has_plain_weights = files.iter().any(|f| {
        (f.has_extension("safetensors") || f.has_extension("bin")) && file_variant(f).is_none()
    });
    if has_plain_weights {
        found.insert("fp32".to_string());
    }
    found.into_iter().collect()
}

// ============================================================================
// Analysis
// ============================================================================

/// Analyze a diffusers repository.
pub fn analyze_diffusers(files: &[FileEntry], metadata: &MetadataMap) -> DiffusersInfo {
    let mut info = DiffusersInfo::default();

    if let Some(index) = document(metadata, MODEL_INDEX_JSON) {
        info.pipeline_type = get_string(index, "_class_name");
        info.pipeline_description = info.pipeline_type.as_deref().map(|class| {
            pipeline_description(class)
                .unwrap_or(DEFAULT_PIPELINE_DESCRIPTION)
                .to_string()
        });
        info.diffusers_version = get_string(index, "_diffusers_version");

        let required = info
            .pipeline_type
            .as_deref()
            .map(required_components)
            .unwrap_or_default();

        info.components = index
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .map(|(name, value)| {
                let (library, class_name) = match value.as_array().map(Vec::as_slice) {
                    Some([lib, class, ..]) => (
                        lib.as_str().map(ToString::to_string),
                        class.as_str().map(ToString::to_string),
                    ),
                    _ => (None, None),
                };
                let owned = component_files(files, name);

                DiffusersComponent {
                    name: name.clone(),
                    library,
                    class_name,
                    size: owned.iter().map(|f| f.size).fold(0, u64::saturating_add),
                    files: owned.iter().map(|f| f.path.clone()).collect(),
                    required: required.contains(&name.as_str()),
                }
            })
            .collect();
        info.components.sort_by(|a, b| a.name.cmp(&b.name));
    }

    info.variants = detect_variants(files);
    info.precisions = detect_precisions(files, &info.variants);
    info
}

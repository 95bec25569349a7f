//! Flattening of type-specific records into [`SelectableItem`]s.
//!
//! | Type | Category | Filter |
//! |------|----------|--------|
//! | gguf | quantization | lowercase code (`q4_k_m`) or file stem |
//! | diffusers | variant, then component | `fp16` / component name |
//! | dataset | split | split name |
//! | transformers, audio, vision, multimodal, gptq, awq | format | `.safetensors`, `.bin`, `.pt` |
//! | transformers | variant | `fp16`, `bf16`, `fp32` |
//! | onnx | variant | path from the repository root |
//!
//! Format and variant items only appear when there is a real choice
//! (more than one option). LoRA and generic repositories have no items.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::dataset::split_description;
use crate::analysis::diffusers::{has_variant, variant_description};
use crate::analysis::gguf::UNKNOWN_QUANT;
use crate::analysis::transformers::{precision_marker, weight_files};
use crate::analysis::{DatasetInfo, DiffusersInfo, GgufInfo, OnnxInfo, TransformersInfo};
use crate::domain::{FileEntry, ItemCategory, RepoDetails, RepoSnapshot, SelectableItem, WeightFormat};
use crate::recommend::{
    is_default_format, is_default_quantization, is_default_split, is_default_variant,
};
use crate::utils::format::title_case;

/// Quality carried by the preferred weight format item.
pub const PREFERRED_FORMAT_QUALITY: u8 = 5;

/// Project a snapshot into its download options.
pub fn to_selectable_items(snapshot: &RepoSnapshot) -> Vec<SelectableItem> {
    let files = snapshot.files();
    match &snapshot.details {
        RepoDetails::Gguf(info) => gguf_items(info),
        RepoDetails::Diffusers(info) => diffusers_items(info, files),
        RepoDetails::Dataset(info) => dataset_items(info),
        RepoDetails::Transformers(info) => {
            let mut items = format_items(files);
            items.extend(precision_items(info));
            items
        }
        RepoDetails::Gptq(_)
        | RepoDetails::Awq(_)
        | RepoDetails::Audio(_)
        | RepoDetails::Vision(_)
        | RepoDetails::Multimodal(_) => format_items(files),
        RepoDetails::Onnx(info) => onnx_items(info),
        RepoDetails::Lora(_) | RepoDetails::Generic => Vec::new(),
    }
}

/// Union of the files of the selected items, sorted and deduplicated.
pub fn files_for_selection(items: &[SelectableItem], ids: &[&str]) -> Vec<String> {
    let files: BTreeSet<&String> = items
        .iter()
        .filter(|item| ids.contains(&item.id.as_str()))
        .flat_map(|item| &item.files)
        .collect();
    files.into_iter().cloned().collect()
}

/// Sum of the known sizes of the selected items.
pub fn selected_size(items: &[SelectableItem], ids: &[&str]) -> u64 {
    items
        .iter()
        .filter(|item| ids.contains(&item.id.as_str()))
        .filter_map(|item| item.size)
        .fold(0, u64::saturating_add)
}

/// Filter tokens of the recommended items, in item order.
pub fn recommended_filters(items: &[SelectableItem]) -> Vec<&str> {
    items
        .iter()
        .filter(|item| item.recommended)
        .map(|item| item.filter.as_str())
        .collect()
}

// ============================================================================
// Per-Type Projections
// ============================================================================

fn gguf_items(info: &GgufInfo) -> Vec<SelectableItem> {
    info.quantizations
        .iter()
        .map(|q| {
            let label = if q.name == UNKNOWN_QUANT {
                q.id.clone()
            } else {
                q.name.clone()
            };
            SelectableItem {
                id: q.id.clone(),
                label,
                description: q.description.clone(),
                size: Some(q.size),
                quality: q.quality,
                recommended: is_default_quantization(&q.name),
                category: ItemCategory::Quantization,
                filter: q.id.clone(),
                files: q.paths(),
                estimated_ram: Some(q.estimated_ram),
            }
        })
        .collect()
}

fn variant_item(variant: &str, matching: &[&FileEntry]) -> SelectableItem {
    SelectableItem {
        id: variant.to_string(),
        label: variant.to_ascii_uppercase(),
        description: variant_description(variant).to_string(),
        size: Some(matching.iter().map(|f| f.size).fold(0, u64::saturating_add)),
        quality: 0,
        recommended: is_default_variant(variant),
        category: ItemCategory::Variant,
        filter: variant.to_string(),
        files: matching.iter().map(|f| f.path.clone()).collect(),
        estimated_ram: None,
    }
}

fn diffusers_items(info: &DiffusersInfo, files: &[FileEntry]) -> Vec<SelectableItem> {
    let variants = info.variants.iter().map(|variant| {
        let matching: Vec<&FileEntry> = files.iter().filter(|f| has_variant(f, variant)).collect();
        variant_item(variant, &matching)
    });

    let components = info.components.iter().map(|comp| SelectableItem {
        id: comp.name.clone(),
        label: comp.name.clone(),
        description: comp.description(),
        size: Some(comp.size),
        quality: 0,
        recommended: comp.required,
        category: ItemCategory::Component,
        filter: comp.name.clone(),
        files: comp.files.clone(),
        estimated_ram: None,
    });

    variants.chain(components).collect()
}

fn dataset_items(info: &DatasetInfo) -> Vec<SelectableItem> {
    info.splits
        .iter()
        .map(|split| SelectableItem {
            id: split.name.clone(),
            label: title_case(&split.name),
            description: format!(
                "{} ({} files)",
                split_description(&split.name),
                split.file_count()
            ),
            size: Some(split.size),
            quality: 0,
            recommended: is_default_split(&split.name),
            category: ItemCategory::Split,
            filter: split.name.clone(),
            files: split.files.clone(),
            estimated_ram: None,
        })
        .collect()
}

/// One item per weight format, when more than one format is present.
fn format_items(files: &[FileEntry]) -> Vec<SelectableItem> {
    let mut by_format: BTreeMap<WeightFormat, (u64, Vec<String>)> = BTreeMap::new();
    for weight in weight_files(files) {
        let entry = by_format.entry(weight.format).or_default();
        entry.0 = entry.0.saturating_add(weight.size);
        entry.1.push(weight.path);
    }
    if by_format.len() < 2 {
        return Vec::new();
    }

    by_format
        .into_iter()
        .map(|(format, (size, paths))| {
            let preferred = is_default_format(format);
            SelectableItem {
                id: format.as_str().to_string(),
                label: format.label().to_string(),
                description: format.description().to_string(),
                size: Some(size),
                quality: if preferred { PREFERRED_FORMAT_QUALITY } else { 0 },
                recommended: preferred,
                category: ItemCategory::Format,
                filter: format.filter_token().to_string(),
                files: paths,
                estimated_ram: None,
            }
        })
        .collect()
}

/// One item per precision marker in weight filenames, when there is more than one.
fn precision_items(info: &TransformersInfo) -> Vec<SelectableItem> {
    if info.precision_variants.len() < 2 {
        return Vec::new();
    }
    info.precision_variants
        .iter()
        .map(|variant| {
            let matching: Vec<FileEntry> = info
                .weight_files
                .iter()
                .filter(|w| precision_marker(&w.name) == Some(variant.as_str()))
                .map(|w| FileEntry::new(w.path.clone(), w.size))
                .collect();
            let refs: Vec<&FileEntry> = matching.iter().collect();
            variant_item(variant, &refs)
        })
        .collect()
}

fn onnx_items(info: &OnnxInfo) -> Vec<SelectableItem> {
    if info.models.len() < 2 {
        return Vec::new();
    }
    let default_path = info.default_model().map(|m| m.path.as_str());
    let shared_stem =
        |name: &str| info.models.iter().filter(|m| m.name == name).count() > 1;

    // Stems repeat across directories (encoder/model.onnx, decoder/model.onnx)
    // and prefix each other (model, model_fp16), so ids and filters use the path.
    info.models
        .iter()
        .map(|model| {
            let mut description = format!("{} ONNX model", model.variant.to_ascii_uppercase());
            if model.optimized {
                description.push_str(" (optimized)");
            }
            let label = if shared_stem(&model.name) {
                model
                    .path
                    .strip_suffix(".onnx")
                    .unwrap_or(&model.path)
                    .to_string()
            } else {
                model.name.clone()
            };
            SelectableItem {
                id: model.path.clone(),
                label,
                description,
                size: Some(model.size),
                quality: 0,
                recommended: default_path == Some(model.path.as_str()),
                category: ItemCategory::Variant,
                filter: model.path.clone(),
                files: vec![model.path.clone()],
                estimated_ram: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::domain::{MetadataMap, RepoType};
    use serde_json::json;

    fn snapshot(repo_type: RepoType, files: Vec<FileEntry>, metadata: MetadataMap) -> RepoSnapshot {
        let details = analyze(repo_type, &files, &metadata);
        RepoSnapshot::new("owner/repo", repo_type == RepoType::Dataset, "main", files, metadata, details)
    }

    #[test]
    fn test_gguf_items() {
        let snap = snapshot(
            RepoType::Gguf,
            vec![
                FileEntry::new("m.Q4_K_M.gguf", 4_000),
                FileEntry::new("m.Q8_0.gguf", 8_000),
                FileEntry::new("mystery.gguf", 1),
            ],
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.category == ItemCategory::Quantization));

        let rec: Vec<&SelectableItem> = items.iter().filter(|i| i.recommended).collect();
        assert_eq!(rec.len(), 1);
        assert_eq!(rec[0].filter, "q4_k_m");
        assert_eq!(rec[0].files, vec!["m.Q4_K_M.gguf".to_string()]);
        assert!(rec[0].estimated_ram.is_some());

        let unknown = items.iter().find(|i| i.id == "mystery").unwrap();
        assert_eq!(unknown.label, "mystery");
        assert_eq!(unknown.quality, 3);
    }

    #[test]
    fn test_diffusers_items() {
        let mut md = MetadataMap::new();
        md.insert(
            "model_index.json".to_string(),
            json!({"_class_name": "StableDiffusionPipeline",
                   "unet": ["diffusers", "UNet2DConditionModel"],
                   "safety_checker": ["stable_diffusion", "StableDiffusionSafetyChecker"]}),
        );
        let snap = snapshot(
            RepoType::Diffusers,
            vec![
                FileEntry::new("model_index.json", 1),
                FileEntry::new("unet/diffusion_pytorch_model.fp16.safetensors", 50),
                FileEntry::new("unet/diffusion_pytorch_model.safetensors", 100),
            ],
            md,
        );
        let items = snap.selectable_items();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["fp16", "safety_checker", "unet"]);

        assert_eq!(items[0].category, ItemCategory::Variant);
        assert!(items[0].recommended);
        assert_eq!(items[0].size, Some(50));
        assert!(!items[1].recommended);
        assert!(items[2].recommended);
        assert_eq!(items[2].size, Some(150));
    }

    #[test]
    fn test_dataset_items() {
        let snap = snapshot(
            RepoType::Dataset,
            vec![
                FileEntry::new("data/test-0.parquet", 10),
                FileEntry::new("data/train-0.parquet", 1000),
                FileEntry::new("data/train-1.parquet", 2000),
            ],
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        assert_eq!(items[0].id, "train");
        assert_eq!(items[0].label, "Train");
        assert_eq!(items[0].description, "Primary training data (2 files)");
        assert!(items[0].recommended);
        assert_eq!(items[1].id, "test");
        assert_eq!(selected_size(&items, &["train", "test"]), 3010);
    }

    #[test]
    fn test_format_items_only_with_choice() {
        let single = snapshot(
            RepoType::Transformers,
            vec![FileEntry::new("config.json", 1), FileEntry::new("model.safetensors", 10)],
            MetadataMap::new(),
        );
        assert!(single.selectable_items().is_empty());

        let both = snapshot(
            RepoType::Transformers,
            vec![
                FileEntry::new("config.json", 1),
                FileEntry::new("model.safetensors", 10),
                FileEntry::new("pytorch_model.bin", 12),
            ],
            MetadataMap::new(),
        );
        let items = both.selectable_items();
        assert_eq!(items.len(), 2);
        let st = items.iter().find(|i| i.id == "safetensors").unwrap();
        assert_eq!(st.filter, ".safetensors");
        assert_eq!(st.quality, 5);
        assert!(st.recommended);
        let bin = items.iter().find(|i| i.id == "pytorch_bin").unwrap();
        assert_eq!(bin.filter, ".bin");
        assert_eq!(bin.quality, 0);
        assert!(!bin.recommended);
    }

    #[test]
    fn test_transformers_precision_items() {
        let snap = snapshot(
            RepoType::Transformers,
            vec![
                FileEntry::new("model.fp16.safetensors", 5),
                FileEntry::new("model.bf16.safetensors", 5),
            ],
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["bf16", "fp16"]);
        assert!(items[1].recommended);
        assert_eq!(items[1].files, vec!["model.fp16.safetensors".to_string()]);
    }

    #[test]
    fn test_onnx_items() {
        let snap = snapshot(
            RepoType::Onnx,
            vec![
                FileEntry::new("onnx/model_fp16.onnx", 5),
                FileEntry::new("onnx/model.onnx", 10),
            ],
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        assert_eq!(items.len(), 2);
        let rec = items.iter().find(|i| i.recommended).unwrap();
        assert_eq!(rec.id, "onnx/model.onnx");
        assert_eq!(rec.label, "model");
        assert_eq!(rec.filter, "onnx/model.onnx");
    }

    #[test]
    fn test_onnx_filters_select_one_file_each() {
        let paths = [
            "encoder/model.onnx",
            "decoder/model.onnx",
            "onnx/model.onnx",
            "onnx/model_fp16.onnx",
            "onnx/model_quantized.onnx",
        ];
        let snap = snapshot(
            RepoType::Onnx,
            paths.iter().map(|p| FileEntry::new(*p, 1)).collect(),
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        assert_eq!(items.len(), paths.len());

        let ids: BTreeSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), paths.len());

        for item in &items {
            let matched: Vec<&str> = paths
                .iter()
                .copied()
                .filter(|p| p.contains(item.filter.as_str()))
                .collect();
            assert_eq!(matched, vec![item.id.as_str()], "filter {}", item.filter);
            assert_eq!(files_for_selection(&items, &[item.id.as_str()]), item.files);
        }

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"encoder/model"));
        assert!(labels.contains(&"model_fp16"));
    }

    #[test]
    fn test_lora_and_generic_have_no_items() {
        let snap = snapshot(RepoType::Lora, vec![], MetadataMap::new());
        assert!(snap.selectable_items().is_empty());
        let snap = snapshot(RepoType::Generic, vec![], MetadataMap::new());
        assert!(snap.selectable_items().is_empty());
    }

    #[test]
    fn test_selection_helpers() {
        let snap = snapshot(
            RepoType::Gguf,
            vec![
                FileEntry::new("Q8_0/m-Q8_0-00001-of-00002.gguf", 5),
                FileEntry::new("Q8_0/m-Q8_0-00002-of-00002.gguf", 5),
                FileEntry::new("m.Q4_K_M.gguf", 4),
            ],
            MetadataMap::new(),
        );
        let items = snap.selectable_items();
        assert_eq!(files_for_selection(&items, &["q8_0"]).len(), 2);
        assert_eq!(selected_size(&items, &["q8_0", "q4_k_m"]), 14);
        assert_eq!(selected_size(&items, &[]), 0);
        assert_eq!(recommended_filters(&items), vec!["q4_k_m"]);
    }
}

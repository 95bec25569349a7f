//! LoRA / PEFT adapter analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::{ADAPTER_CONFIG_JSON, document, get_bool, get_f64, get_string, get_u64};
use crate::domain::{MetadataMap, RelatedDownload, RelatedKind};

/// Module count assumed when `target_modules` is not given.
pub const DEFAULT_TARGET_MODULES: u64 = 4;

/// Fallback description for unknown PEFT types.
pub const GENERIC_ADAPTER_DESCRIPTION: &str = "PEFT adapter";

/// Analysis result for an adapter repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoraInfo {
    /// `peft_type` (`LORA`, `IA3`, ...)
    pub adapter_type: Option<String>,
    pub adapter_description: Option<String>,
    /// `base_model_name_or_path`
    pub base_model: Option<String>,
    /// `r`
    pub rank: Option<u64>,
    /// `lora_alpha`
    pub alpha: Option<f64>,
    /// `lora_dropout`
    pub dropout: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_modules: Vec<String>,
    pub bias: Option<String>,
    pub task_type: Option<String>,
    pub fan_in_fan_out: Option<bool>,
    pub init_lora_weights: Option<bool>,
    /// QLoRA quantization type (e.g. `nf4`)
    pub quant_type: Option<String>,
}

impl LoraInfo {
    /// QLoRA adapters are either typed as such or carry a quant type.
    pub fn is_qlora(&self) -> bool {
        self.adapter_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("qlora"))
            || self.quant_type.is_some()
    }

    pub const fn requires_base_model(&self) -> bool {
        self.base_model.is_some()
    }

    /// `alpha / rank` when both are nonzero, otherwise the rank itself.
    #[allow(clippy::cast_precision_loss)]
    pub fn effective_rank(&self) -> f64 {
        let rank = self.rank.unwrap_or(0);
        match self.alpha {
            Some(alpha) if rank != 0 && alpha != 0.0 => alpha / rank as f64,
            _ => rank as f64,
        }
    }

    /// Approximate adapter parameter count for a base model hidden size.
    ///
    /// `2 × rank × hidden × modules`, with [`DEFAULT_TARGET_MODULES`] when the
    /// module list is empty. Zero when rank or hidden size is zero.
    pub fn estimate_parameters(&self, hidden_dim: u64) -> u64 {
        let rank = self.rank.unwrap_or(0);
        if rank == 0 || hidden_dim == 0 {
            return 0;
        }
        let modules = match self.target_modules.len() {
            0 => DEFAULT_TARGET_MODULES,
            n => n as u64,
        };
        2u64.saturating_mul(rank)
            .saturating_mul(hidden_dim)
            .saturating_mul(modules)
    }

    /// Companion downloads: the base model, when one is named.
    pub fn related_downloads(&self) -> Vec<RelatedDownload> {
        self.base_model
            .iter()
            .map(|repo| RelatedDownload {
                kind: RelatedKind::BaseModel,
                repo: repo.clone(),
                label: format!("Base model: {repo}"),
                description: "Required base model for this adapter".to_string(),
                required: true,
                size: None,
            })
            .collect()
    }
}

/// Description of a PEFT adapter type.
pub fn adapter_description(peft_type: &str) -> &'static str {
    match peft_type.to_ascii_lowercase().as_str() {
        "lora" => "Low-Rank Adaptation for efficient fine-tuning",
        "qlora" => "Quantized LoRA with 4-bit base model",
        "ia3" => "Infused Adapter by Inhibiting and Amplifying Inner Activations",
        "adalora" => "Adaptive LoRA with dynamic rank allocation",
        "prefix" | "prefix_tuning" => "Prefix Tuning prepends trainable tokens",
        "prompt" | "prompt_tuning" => "Prompt Tuning learns soft prompts",
        "p_tuning" => "P-Tuning learns continuous prompt embeddings",
        "lora_fa" => "LoRA with Frozen-A matrix",
        "vera" => "Vector-based Random Matrix Adaptation",
        "oft" => "Orthogonal Fine-Tuning",
        "boft" => "Block Orthogonal Fine-Tuning",
        _ => GENERIC_ADAPTER_DESCRIPTION,
    }
}

/// `target_modules` as a list, an object's keys, or a single pattern string.
fn target_modules(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(Value::String(pattern)) if !pattern.is_empty() => vec![pattern.clone()],
        _ => Vec::new(),
    }
}

/// Analyze `adapter_config.json`.
pub fn analyze_lora(metadata: &MetadataMap) -> LoraInfo {
    let Some(cfg) = document(metadata, ADAPTER_CONFIG_JSON) else {
        return LoraInfo::default();
    };

    let adapter_type = get_string(cfg, "peft_type");
    LoraInfo {
        adapter_description: adapter_type
            .as_deref()
            .map(|t| adapter_description(t).to_string()),
        adapter_type,
        base_model: get_string(cfg, "base_model_name_or_path"),
        rank: get_u64(cfg, "r"),
        alpha: get_f64(cfg, "lora_alpha"),
        dropout: get_f64(cfg, "lora_dropout"),
        target_modules: target_modules(cfg.get("target_modules")),
        bias: get_string(cfg, "bias"),
        task_type: get_string(cfg, "task_type"),
        fan_in_fan_out: get_bool(cfg, "fan_in_fan_out"),
        init_lora_weights: get_bool(cfg, "init_lora_weights"),
        quant_type: get_string(cfg, "quant_type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter(config: Value) -> LoraInfo {
        let mut md = MetadataMap::new();
        md.insert("adapter_config.json".to_string(), config);
        analyze_lora(&md)
    }

    #[test]
    fn test_standard_lora_config() {
        let info = adapter(json!({
            "peft_type": "LORA",
            "base_model_name_or_path": "meta-llama/Llama-2-7b-hf",
            "r": 16,
            "lora_alpha": 32,
            "lora_dropout": 0.05,
            "target_modules": ["q_proj", "v_proj"],
            "bias": "none",
            "task_type": "CAUSAL_LM"
        }));

        assert_eq!(info.adapter_type.as_deref(), Some("LORA"));
        assert_eq!(
            info.adapter_description.as_deref(),
            Some("Low-Rank Adaptation for efficient fine-tuning")
        );
        assert_eq!(info.rank, Some(16));
        assert!((info.effective_rank() - 2.0).abs() < f64::EPSILON);
        assert_eq!(info.target_modules.len(), 2);
        assert!(info.requires_base_model());
        assert!(!info.is_qlora());
        assert_eq!(info.estimate_parameters(4096), 2 * 16 * 4096 * 2);
    }

    #[test]
    fn test_target_modules_as_map_or_string() {
        let info = adapter(json!({"target_modules": {"k_proj": true, "o_proj": true}}));
        assert_eq!(info.target_modules, vec!["k_proj".to_string(), "o_proj".to_string()]);

        let info = adapter(json!({"target_modules": "all-linear"}));
        assert_eq!(info.target_modules, vec!["all-linear".to_string()]);
    }

    #[test]
    fn test_effective_rank_without_alpha() {
        let info = adapter(json!({"r": 8}));
        assert!((info.effective_rank() - 8.0).abs() < f64::EPSILON);
        assert_eq!(LoraInfo::default().effective_rank(), 0.0);
    }

    #[test]
    fn test_parameter_estimate_defaults() {
        let info = adapter(json!({"r": 8}));
        assert_eq!(info.estimate_parameters(4096), 2 * 8 * 4096 * 4);
        assert_eq!(info.estimate_parameters(0), 0);
        assert_eq!(LoraInfo::default().estimate_parameters(4096), 0);
    }

    #[test]
    fn test_parameter_estimate_saturates() {
        let info = adapter(json!({"r": 1e14}));
        assert_eq!(info.rank, Some(100_000_000_000_000));
        assert_eq!(info.estimate_parameters(1_000_000), u64::MAX);
        assert_eq!(info.estimate_parameters(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_qlora_and_unknown_types() {
        let info = adapter(json!({"peft_type": "LORA", "quant_type": "nf4"}));
        assert!(info.is_qlora());

        let info = adapter(json!({"peft_type": "SOMETHING_NEW"}));
        assert_eq!(
            info.adapter_description.as_deref(),
            Some(GENERIC_ADAPTER_DESCRIPTION)
        );
    }

    #[test]
    fn test_related_downloads() {
        let info = adapter(json!({"base_model_name_or_path": "mistralai/Mistral-7B-v0.1"}));
        let related = info.related_downloads();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].repo, "mistralai/Mistral-7B-v0.1");
        assert!(related[0].required);

        assert!(LoraInfo::default().related_downloads().is_empty());
    }

    #[test]
    fn test_missing_config() {
        assert_eq!(analyze_lora(&MetadataMap::new()), LoraInfo::default());
    }
}

//! GPTQ / AWQ / EXL2 / bitsandbytes / HQQ / EETQ quantized transformers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::metadata::{
    CONFIG_JSON, QUANTIZE_CONFIG_JSON, document, first_str, get_bool, get_f64, get_object,
    get_i64, get_str_list, get_string, get_u32, get_u64,
};
use crate::domain::MetadataMap;
use crate::recommend::estimate_vram;

/// Analysis result for a post-training quantized model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantizedInfo {
    /// `quant_method` as written in the config (`gptq`, `awq`, ...)
    pub method: Option<String>,
    pub method_description: Option<String>,
    pub bits: Option<u32>,
    pub group_size: Option<i64>,
    pub desc_act: Option<bool>,
    pub symmetric: Option<bool>,
    pub zero_point: Option<bool>,
    pub version: Option<String>,
    /// EXL2 average bits per weight
    pub bits_per_weight: Option<f64>,
    /// Modules kept in full precision
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_modules: Vec<String>,
    /// Inference backends able to load this model
    pub backends: Vec<String>,
    /// `architectures[0]` from `config.json`
    pub model_architecture: Option<String>,
    /// `_name_or_path` from `config.json`
    pub base_model: Option<String>,
    pub estimated_vram: Option<u64>,
}

impl QuantizedInfo {
    fn method_is(&self, name: &str) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(name))
    }

    pub fn is_gptq(&self) -> bool {
        self.method_is("gptq")
    }

    pub fn is_awq(&self) -> bool {
        self.method_is("awq")
    }

    pub fn is_exl2(&self) -> bool {
        self.method_is("exl2")
    }

    /// Whether the given backend can load this model (case-insensitive).
    pub fn supports_backend(&self, backend: &str) -> bool {
        self.backends.iter().any(|b| b.eq_ignore_ascii_case(backend))
    }
}

/// Description of a quantization method.
pub fn method_description(method: &str) -> Option<&'static str> {
    let desc = match method.to_ascii_lowercase().as_str() {
        "gptq" => "GPTQ - GPU-accelerated post-training quantization",
        "awq" => "AWQ - Activation-aware Weight Quantization",
        "exl2" => "EXL2 - ExLlamaV2 mixed-precision quantization",
        "bitsandbytes" | "bnb" => "bitsandbytes INT8/INT4 quantization",
        "hqq" => "HQQ - Half-Quadratic Quantization",
        "eetq" => "EETQ - Easy and Efficient Quantization",
        _ => return None,
    };
    Some(desc)
}

/// Backends compatible with a quantization method.
///
/// GPTQ with group size 128 and no act-order also runs on vLLM.
pub fn compatible_backends(
    method: &str,
    group_size: Option<i64>,
    desc_act: Option<bool>,
) -> Vec<String> {
    let backends: &[&str] = match method.to_ascii_lowercase().as_str() {
        "gptq" => {
            if group_size == Some(128) && desc_act != Some(true) {
                &["auto-gptq", "exllamav2", "transformers", "vllm"]
            } else {
                &["auto-gptq", "exllamav2", "transformers"]
            }
        }
        "awq" => &["autoawq", "vllm", "transformers"],
        "exl2" => &["exllamav2"],
        "bitsandbytes" | "bnb" => &["transformers", "bitsandbytes"],
        "hqq" => &["hqq", "transformers"],
        "eetq" => &["eetq", "transformers"],
        _ => &[],
    };
    backends.iter().map(ToString::to_string).collect()
}

/// Pick the document holding quantization parameters.
///
/// `quantize_config.json` wins; otherwise the nested `quantization_config`
/// of `config.json`, otherwise `config.json` itself.
fn quantization_source(metadata: &MetadataMap) -> Option<&Map<String, Value>> {
    if let Some(doc) = document(metadata, QUANTIZE_CONFIG_JSON) {
        return Some(doc);
    }
    let config = document(metadata, CONFIG_JSON)?;
    Some(get_object(config, "quantization_config").unwrap_or(config))
}

/// Analyze the quantization configuration of a repository.
///
/// Missing documents leave every field empty.
pub fn analyze_quantized(metadata: &MetadataMap) -> QuantizedInfo {
    let mut info = QuantizedInfo::default();

    if let Some(cfg) = quantization_source(metadata) {
        info.method = get_string(cfg, "quant_method");
        info.method_description = info
            .method
            .as_deref()
            .and_then(method_description)
            .map(ToString::to_string);
        info.bits = get_u32(cfg, "bits");
        info.group_size = get_i64(cfg, "group_size");
        info.desc_act = get_bool(cfg, "desc_act");
        info.symmetric = get_bool(cfg, "sym");
        info.zero_point = get_bool(cfg, "zero_point");
        info.version = get_string(cfg, "version");
        info.bits_per_weight = get_f64(cfg, "bits_per_weight");
        info.excluded_modules = get_str_list(cfg, "modules_to_not_convert").unwrap_or_default();
    }

    if let Some(method) = info.method.as_deref() {
        info.backends = compatible_backends(method, info.group_size, info.desc_act);
    }

    if let Some(config) = document(metadata, CONFIG_JSON) {
        info.model_architecture = first_str(config, "architectures").map(ToString::to_string);
        info.base_model = get_string(config, "_name_or_path");
        if let (Some(hidden), Some(layers)) = (
            get_u64(config, "hidden_size"),
            get_u64(config, "num_hidden_layers"),
        ) {
            info.estimated_vram = estimate_vram(hidden, layers, info.bits.unwrap_or(0));
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(entries: &[(&str, Value)]) -> MetadataMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_gptq_with_vllm_support() {
        let md = metadata(&[
            (
                "quantize_config.json",
                json!({"quant_method": "gptq", "bits": 4, "group_size": 128, "desc_act": false, "sym": true}),
            ),
            (
                "config.json",
                json!({"architectures": ["LlamaForCausalLM"], "hidden_size": 4096, "num_hidden_layers": 32}),
            ),
        ]);
        let info = analyze_quantized(&md);

        assert!(info.is_gptq());
        assert_eq!(info.bits, Some(4));
        assert_eq!(info.symmetric, Some(true));
        assert!(info.supports_backend("vllm"));
        assert!(info.supports_backend("AUTO-GPTQ"));
        assert_eq!(info.model_architecture.as_deref(), Some("LlamaForCausalLM"));
        assert_eq!(info.estimated_vram, estimate_vram(4096, 32, 4));
    }

    #[test]
    fn test_gptq_act_order_excludes_vllm() {
        let md = metadata(&[(
            "quantize_config.json",
            json!({"quant_method": "gptq", "bits": 4, "group_size": 128, "desc_act": true}),
        )]);
        let info = analyze_quantized(&md);
        assert!(!info.supports_backend("vllm"));
        assert_eq!(info.backends.len(), 3);
        assert!(info.estimated_vram.is_none());
    }

    #[test]
    fn test_float_group_size_keeps_vllm() {
        let md = metadata(&[(
            "quantize_config.json",
            json!({"quant_method": "gptq", "bits": 4, "group_size": 128.0, "desc_act": false}),
        )]);
        let info = analyze_quantized(&md);
        assert_eq!(info.group_size, Some(128));
        assert!(info.supports_backend("vllm"));

        let md = metadata(&[(
            "quantize_config.json",
            json!({"quant_method": "gptq", "group_size": -1}),
        )]);
        let info = analyze_quantized(&md);
        assert_eq!(info.group_size, Some(-1));
        assert!(!info.supports_backend("vllm"));
    }

    #[test]
    fn test_awq_fields() {
        let md = metadata(&[(
            "quantize_config.json",
            json!({"quant_method": "awq", "bits": 4, "zero_point": true, "version": "GEMM",
                   "modules_to_not_convert": ["lm_head", 3]}),
        )]);
        let info = analyze_quantized(&md);

        assert!(info.is_awq());
        assert_eq!(info.zero_point, Some(true));
        assert_eq!(info.version.as_deref(), Some("GEMM"));
        assert_eq!(info.excluded_modules, vec!["lm_head".to_string()]);
        assert_eq!(
            info.method_description.as_deref(),
            Some("AWQ - Activation-aware Weight Quantization")
        );
    }

    #[test]
    fn test_falls_back_to_nested_quantization_config() {
        let md = metadata(&[(
            "config.json",
            json!({"quantization_config": {"quant_method": "exl2", "bits_per_weight": 4.65}}),
        )]);
        let info = analyze_quantized(&md);
        assert!(info.is_exl2());
        assert_eq!(info.bits_per_weight, Some(4.65));
        assert_eq!(info.backends, vec!["exllamav2".to_string()]);
    }

    #[test]
    fn test_missing_documents_yield_empty_record() {
        let info = analyze_quantized(&MetadataMap::new());
        assert_eq!(info, QuantizedInfo::default());
    }

    #[test]
    fn test_wrong_types_are_ignored() {
        let md = metadata(&[(
            "quantize_config.json",
            json!({"quant_method": 5, "bits": "four", "desc_act": "no"}),
        )]);
        let info = analyze_quantized(&md);
        assert!(info.method.is_none());
        assert!(info.bits.is_none());
        assert!(info.desc_act.is_none());
        assert!(info.backends.is_empty());
    }

    #[test]
    fn test_unknown_method_has_no_description() {
        assert!(method_description("mystery").is_none());
        assert!(compatible_backends("mystery", None, None).is_empty());
        assert_eq!(compatible_backends("bnb", None, None).len(), 2);
    }
}

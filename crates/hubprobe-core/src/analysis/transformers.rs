//! Transformers model analysis: architecture, tokenizer and weight files.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::metadata::{
    CONFIG_JSON, GENERATION_CONFIG_JSON, TOKENIZER_CONFIG_JSON, document, first_str, get_bool,
    get_string, get_u64,
};
use crate::domain::{FileEntry, MetadataMap, WeightFormat};
use crate::utils::format::human_size;

/// Inference backends able to serve a plain transformers checkpoint.
pub const TRANSFORMERS_BACKENDS: [&str; 3] = ["transformers", "vLLM", "text-generation-inference"];

/// Precision assumed when neither the config nor the filenames say.
pub const DEFAULT_PRECISION: &str = "fp32";

static SHARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-_](\d+)[-_]of[-_](\d+)").expect("shard pattern is valid")
});

// ============================================================================
// Types
// ============================================================================

/// Analysis result for a transformers repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformersInfo {
    /// `architectures[0]`, e.g. `LlamaForCausalLM`
    pub architecture: Option<String>,
    pub architecture_description: Option<String>,
    pub model_type: Option<String>,
    pub hidden_size: Option<u64>,
    pub num_hidden_layers: Option<u64>,
    pub num_attention_heads: Option<u64>,
    pub intermediate_size: Option<u64>,
    pub vocab_size: Option<u64>,
    pub max_position_embeddings: Option<u64>,
    /// Effective context: `sliding_window`, else `max_seq_len`, else `max_position_embeddings`
    pub context_length: Option<u64>,
    /// `torch_dtype` as written
    pub torch_dtype: Option<String>,
    /// Normalized precision (`fp16`, `bf16`, `fp32`, `fp64`)
    pub precision: String,
    /// Precision markers found in weight filenames, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precision_variants: Vec<String>,
    /// `bos_token_id`, `eos_token_id` and `pad_token_id` when present
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub special_tokens: BTreeMap<String, Value>,
    pub tokenizer: Option<TokenizerInfo>,
    /// Raw `generation_config.json`
    pub generation_config: Option<Map<String, Value>>,
    /// Weight files, ordered by shard index then name
    pub weight_files: Vec<WeightFile>,
    pub is_sharded: bool,
    pub shard_count: u32,
    pub estimated_parameters: Option<u64>,
    /// Formatted parameter estimate such as `6.7B`
    pub estimated_parameters_human: Option<String>,
    pub task: Option<String>,
    pub task_description: Option<String>,
    pub backends: Vec<String>,
}

/// A single model weight file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightFile {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub format: WeightFormat,
    /// `N` of an `N-of-M` filename
    pub shard_index: Option<u32>,
    /// `M` of an `N-of-M` filename
    pub shard_total: Option<u32>,
}

impl WeightFile {
    pub fn size_human(&self) -> String {
        human_size(self.size)
    }
}

/// Fields of `tokenizer_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerInfo {
    pub tokenizer_class: Option<String>,
    pub vocab_size: Option<u64>,
    pub model_max_length: Option<u64>,
    pub padding_side: Option<String>,
    pub truncation_side: Option<String>,
    pub add_bos_token: Option<bool>,
    pub add_eos_token: Option<bool>,
    pub chat_template: Option<String>,
}

impl TokenizerInfo {
    pub const fn has_chat_template(&self) -> bool {
        self.chat_template.is_some()
    }
}

impl TransformersInfo {
    /// Weight formats present, in enum order.
    pub fn formats(&self) -> Vec<WeightFormat> {
        let found: BTreeSet<WeightFormat> = self.weight_files.iter().map(|w| w.format).collect();
        found.into_iter().collect()
    }

    pub fn files_of_format(&self, format: WeightFormat) -> impl Iterator<Item = &WeightFile> {
        self.weight_files.iter().filter(move |w| w.format == format)
    }

    pub fn total_weight_size(&self) -> u64 {
        self.weight_files.iter().map(|w| w.size).fold(0, u64::saturating_add)
    }
}

// ============================================================================
// Static Tables
// ============================================================================

/// Normalize a `torch_dtype` value; unknown values are returned unchanged.
pub fn normalize_precision(dtype: &str) -> String {
    match dtype.to_ascii_lowercase().as_str() {
        "float16" | "torch.float16" => "fp16".to_string(),
        "bfloat16" | "torch.bfloat16" => "bf16".to_string(),
        "float32" | "torch.float32" => "fp32".to_string(),
        "float64" | "torch.float64" => "fp64".to_string(),
        _ => dtype.to_string(),
    }
}

/// Task and description from an architecture class name.
pub fn infer_task(architecture: &str) -> (&'static str, &'static str) {
    let lower = architecture.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["causallm", "gpt", "llama", "mistral", "falcon", "codegen"]) {
        (
            "text-generation",
            "Autoregressive text generation (chat, completion)",
        )
    } else if has(&["sequenceclassification", "forsequence"]) {
        ("text-classification", "Text classification (sentiment, topic)")
    } else if has(&["tokenclassification", "fortoken"]) {
        ("token-classification", "Token classification (NER, POS tagging)")
    } else if has(&["questionanswering", "forqa"]) {
        ("question-answering", "Extractive question answering")
    } else if has(&["maskedlm", "formasked"]) {
        ("fill-mask", "Fill-mask (masked language modeling)")
    } else if has(&["conditionalgeneration", "seq2seq", "t5", "bart"]) {
        (
            "text2text-generation",
            "Text-to-text generation (translation, summarization)",
        )
    } else if lower.contains("model") && !lower.contains("for") {
        ("feature-extraction", "Feature extraction (embeddings)")
    } else {
        ("text-generation", "General language model")
    }
}

/// Human-readable description of an architecture class.
pub fn describe_architecture(architecture: &str) -> &'static str {
    match architecture {
        "LlamaForCausalLM" => "Meta Llama decoder-only transformer",
        "MistralForCausalLM" => {
            "Mistral AI decoder-only transformer with sliding window attention"
        }
        "Qwen2ForCausalLM" => "Alibaba Qwen2 decoder-only transformer",
        "Phi3ForCausalLM" => "Microsoft Phi-3 small language model",
        "PhiForCausalLM" => "Microsoft Phi small language model",
        "GPT2LMHeadModel" => "OpenAI GPT-2 decoder-only transformer",
        "GPTNeoForCausalLM" => "EleutherAI GPT-Neo decoder-only transformer",
        "GPTNeoXForCausalLM" => "EleutherAI GPT-NeoX decoder-only transformer",
        "GPTJForCausalLM" => "EleutherAI GPT-J decoder-only transformer",
        "FalconForCausalLM" => "TII Falcon decoder-only transformer",
        "BertForSequenceClassification" => "BERT encoder for sequence classification",
        "BertForTokenClassification" => "BERT encoder for token classification",
        "BertForQuestionAnswering" => "BERT encoder for question answering",
        "BertModel" => "BERT encoder base model",
        "RobertaForSequenceClassification" => "RoBERTa encoder for sequence classification",
        "RobertaModel" => "RoBERTa encoder base model",
        "T5ForConditionalGeneration" => "T5 encoder-decoder for text-to-text",
        "BartForConditionalGeneration" => "BART encoder-decoder for text-to-text",
        "BloomForCausalLM" => "BigScience BLOOM multilingual transformer",
        "OPTForCausalLM" => "Meta OPT decoder-only transformer",
        "GemmaForCausalLM" => "Google Gemma decoder-only transformer",
        "Gemma2ForCausalLM" => "Google Gemma 2 decoder-only transformer",
        "StableLmForCausalLM" => "StabilityAI StableLM decoder-only transformer",
        "CodeLlamaForCausalLM" => "Meta Code Llama for code generation",
        "DeepseekV2ForCausalLM" => "DeepSeek V2 decoder-only transformer",
        "InternLM2ForCausalLM" => "InternLM 2 decoder-only transformer",
        arch if arch.contains("ForCausalLM") => "Decoder-only transformer for text generation",
        arch if arch.contains("ForSequenceClassification") => {
            "Encoder transformer for sequence classification"
        }
        arch if arch.contains("ForTokenClassification") => {
            "Encoder transformer for token classification"
        }
        arch if arch.contains("ForQuestionAnswering") => {
            "Encoder transformer for question answering"
        }
        arch if arch.contains("ForConditionalGeneration") => {
            "Encoder-decoder transformer for text generation"
        }
        _ => "Transformer model",
    }
}

// ============================================================================
// Estimates
// ============================================================================

/// Approximate parameter count from architecture dimensions.
///
/// `vocab·h + 4·h²·L + ffn + (2·h·L + h)`, where `ffn` is `2·h·inter·L`,
/// or `8·h²·L` when the intermediate size is unknown. `None` without a
/// hidden size and layer count.
pub fn estimate_parameters(
    hidden_size: u64,
    num_layers: u64,
    vocab_size: u64,
    intermediate_size: Option<u64>,
) -> Option<u64> {
    if hidden_size == 0 || num_layers == 0 {
        return None;
    }
    let h = hidden_size;
    let l = num_layers;

    let embedding = vocab_size.saturating_mul(h);
    let attention = 4u64.saturating_mul(h).saturating_mul(h).saturating_mul(l);
    let ffn = match intermediate_size {
        Some(inter) if inter > 0 => 2u64.saturating_mul(h).saturating_mul(inter).saturating_mul(l),
        _ => 8u64.saturating_mul(h).saturating_mul(h).saturating_mul(l),
    };
    let layer_norm = 2u64.saturating_mul(h).saturating_mul(l).saturating_add(h);

    Some(
        embedding
            .saturating_add(attention)
            .saturating_add(ffn)
            .saturating_add(layer_norm),
    )
}

/// Format a parameter count: `6.7B`, `176B`, `350M`, or the plain number.
#[allow(clippy::cast_precision_loss)]
pub fn format_parameter_count(params: u64) -> Option<String> {
    const BILLION: u64 = 1_000_000_000;
    const MILLION: u64 = 1_000_000;

    match params {
        0 => None,
        p if p >= BILLION => {
            let b = p as f64 / BILLION as f64;
            if b >= 100.0 {
                Some(format!("{}B", p / BILLION))
            } else {
                Some(format!("{b:.1}B"))
            }
        }
        p if p >= MILLION => Some(format!("{:.0}M", p as f64 / MILLION as f64)),
        p => Some(p.to_string()),
    }
}

// ============================================================================
// Files
// ============================================================================

fn shard_marker(name: &str) -> (Option<u32>, Option<u32>) {
    SHARD_PATTERN.captures(name).map_or((None, None), |caps| {
        (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        )
    })
}

/// Model weight files, excluding optimizer and training state.
pub fn weight_files(files: &[FileEntry]) -> Vec<WeightFile> {
    let mut weights: Vec<WeightFile> = files
        .iter()
        .filter_map(|f| {
            let format = WeightFormat::from_extension(&f.extension())?;
            let lower = f.name.to_ascii_lowercase();
            if lower.contains("optimizer") || lower.contains("training") {
                return None;
            }
            let (shard_index, shard_total) = shard_marker(&f.name);
            Some(WeightFile {
                path: f.path.clone(),
                name: f.name.clone(),
                size: f.size,
                format,
                shard_index,
                shard_total,
            })
        })
        .collect();

    weights.sort_by(|a, b| {
        a.shard_index
            .unwrap_or(0)
            .cmp(&b.shard_index.unwrap_or(0))
            .then_with(|| a.name.cmp(&b.name))
    });
    weights
}

/// Precision marker in a filename, if any.
pub fn precision_marker(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("fp16") || (lower.contains("float16") && !lower.contains("bfloat16")) {
        Some("fp16")
    } else if lower.contains("bf16") || lower.contains("bfloat16") {
        Some("bf16")
    } else if lower.contains("fp32") || lower.contains("float32") {
        Some("fp32")
    } else {
        None
    }
}

/// Precision of the first file carrying a marker, else [`DEFAULT_PRECISION`].
pub fn detect_precision_from_files(files: &[FileEntry]) -> &'static str {
    files
        .iter()
        .find_map(|f| precision_marker(&f.name))
        .unwrap_or(DEFAULT_PRECISION)
}

/// Explicit or implicit sharding as `(is_sharded, shard_count)`.
///
/// An `N-of-M` marker with `M > 1` wins. Otherwise several safetensors or
/// several `.bin` files count as implicit shards.
fn detect_sharding(weights: &[WeightFile]) -> (bool, u32) {
    if let Some(total) = weights
        .iter()
        .filter_map(|w| w.shard_total)
        .find(|total| *total > 1)
    {
        return (true, total);
    }

    let count = |format| {
        u32::try_from(weights.iter().filter(|w| w.format == format).count()).unwrap_or(u32::MAX)
    };
    let implicit = count(WeightFormat::Safetensors).max(count(WeightFormat::PytorchBin));
    if implicit > 1 { (true, implicit) } else { (false, 0) }
}

// ============================================================================
// Analysis
// ============================================================================

fn parse_tokenizer(cfg: &Map<String, Value>) -> TokenizerInfo {
    TokenizerInfo {
        tokenizer_class: get_string(cfg, "tokenizer_class"),
        vocab_size: get_u64(cfg, "vocab_size"),
        model_max_length: get_u64(cfg, "model_max_length"),
        padding_side: get_string(cfg, "padding_side"),
        truncation_side: get_string(cfg, "truncation_side"),
        add_bos_token: get_bool(cfg, "add_bos_token"),
        add_eos_token: get_bool(cfg, "add_eos_token"),
        chat_template: get_string(cfg, "chat_template"),
    }
}

fn apply_config(cfg: &Map<String, Value>, info: &mut TransformersInfo) {
    info.architecture = first_str(cfg, "architectures").map(ToString::to_string);
    info.architecture_description = info
        .architecture
        .as_deref()
        .map(|arch| describe_architecture(arch).to_string());
    info.model_type = get_string(cfg, "model_type");
    info.hidden_size = get_u64(cfg, "hidden_size");
    info.num_hidden_layers = get_u64(cfg, "num_hidden_layers");
    info.num_attention_heads = get_u64(cfg, "num_attention_heads");
    info.intermediate_size = get_u64(cfg, "intermediate_size");
    info.vocab_size = get_u64(cfg, "vocab_size");
    info.max_position_embeddings = get_u64(cfg, "max_position_embeddings");

    let nonzero = |key: &str| get_u64(cfg, key).filter(|v| *v > 0);
    info.context_length = nonzero("sliding_window")
        .or_else(|| nonzero("max_seq_len"))
        .or(info.max_position_embeddings);

    info.torch_dtype = get_string(cfg, "torch_dtype");

    info.special_tokens = ["bos_token_id", "eos_token_id", "pad_token_id"]
        .into_iter()
        .filter_map(|key| cfg.get(key).map(|v| (key.to_string(), v.clone())))
        .collect();
}

/// Analyze a transformers repository.
pub fn analyze_transformers(files: &[FileEntry], metadata: &MetadataMap) -> TransformersInfo {
    let mut info = TransformersInfo {
        backends: TRANSFORMERS_BACKENDS.iter().map(ToString::to_string).collect(),
        ..TransformersInfo::default()
    };

    if let Some(cfg) = document(metadata, CONFIG_JSON) {
        apply_config(cfg, &mut info);
    }
    info.tokenizer = document(metadata, TOKENIZER_CONFIG_JSON).map(parse_tokenizer);
    info.generation_config = document(metadata, GENERATION_CONFIG_JSON).cloned();

    info.weight_files = weight_files(files);
    info.precision = info.torch_dtype.as_deref().map_or_else(
        || detect_precision_from_files(files).to_string(),
        normalize_precision,
    );
    let variants: BTreeSet<&str> = info
        .weight_files
        .iter()
        .filter_map(|w| precision_marker(&w.name))
        .collect();
    info.precision_variants = variants.into_iter().map(ToString::to_string).collect();

    (info.is_sharded, info.shard_count) = detect_sharding(&info.weight_files);

    if let (Some(hidden), Some(layers)) = (info.hidden_size, info.num_hidden_layers) {
        info.estimated_parameters = estimate_parameters(
            hidden,
            layers,
            info.vocab_size.unwrap_or(0),
            info.intermediate_size,
        );
        info.estimated_parameters_human =
            info.estimated_parameters.and_then(format_parameter_count);
    }

    if let Some(arch) = info.architecture.as_deref() {
        let (task, description) = infer_task(arch);
        info.task = Some(task.to_string());
        info.task_description = Some(description.to_string());
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn llama_metadata() -> MetadataMap {
        let mut md = MetadataMap::new();
        md.insert(
            "config.json".to_string(),
            json!({
                "architectures": ["LlamaForCausalLM"],
                "model_type": "llama",
                "hidden_size": 4096,
                "num_hidden_layers": 32,
                "num_attention_heads": 32,
                "intermediate_size": 11008,
                "vocab_size": 32000,
                "max_position_embeddings": 4096,
                "torch_dtype": "float16",
                "bos_token_id": 1,
                "eos_token_id": [2, 32000]
            }),
        );
        md.insert(
            "tokenizer_config.json".to_string(),
            json!({
                "tokenizer_class": "LlamaTokenizer",
                "model_max_length": 1e30,
                "padding_side": "left",
                "add_bos_token": true,
                "chat_template": "{% for m in messages %}{{ m.content }}{% endfor %}"
            }),
        );
        md.insert("generation_config.json".to_string(), json!({"temperature": 0.6}));
        md
    }

    fn llama_files() -> Vec<FileEntry> {
        vec![
            FileEntry::new("config.json", 1),
            FileEntry::new("model-00002-of-00002.safetensors", 3_500_000_000),
            FileEntry::new("model-00001-of-00002.safetensors", 9_900_000_000),
            FileEntry::new("pytorch_model.bin", 13_000_000_000),
            FileEntry::new("optimizer.pt", 100),
        ]
    }

    #[test]
    fn test_config_fields() {
        let info = analyze_transformers(&llama_files(), &llama_metadata());

        assert_eq!(info.architecture.as_deref(), Some("LlamaForCausalLM"));
        assert_eq!(
            info.architecture_description.as_deref(),
            Some("Meta Llama decoder-only transformer")
        );
        assert_eq!(info.hidden_size, Some(4096));
        assert_eq!(info.context_length, Some(4096));
        assert_eq!(info.precision, "fp16");
        assert_eq!(info.special_tokens.len(), 2);
        assert_eq!(info.task.as_deref(), Some("text-generation"));
        assert_eq!(info.backends.len(), 3);
        assert!(info.generation_config.is_some());
    }

    #[test]
    fn test_parameter_estimate() {
        let info = analyze_transformers(&llama_files(), &llama_metadata());
        let expected = 32000 * 4096 + 4 * 4096 * 4096 * 32 + 2 * 4096 * 11008 * 32 + (2 * 4096 * 32 + 4096);
        assert_eq!(info.estimated_parameters, Some(expected));
        assert_eq!(info.estimated_parameters_human.as_deref(), Some("5.2B"));
    }

    #[test]
    fn test_weight_files_and_sharding() {
        let info = analyze_transformers(&llama_files(), &llama_metadata());

        let names: Vec<&str> = info.weight_files.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "pytorch_model.bin",
                "model-00001-of-00002.safetensors",
                "model-00002-of-00002.safetensors"
            ]
        );
        assert!(info.is_sharded);
        assert_eq!(info.shard_count, 2);
        assert_eq!(
            info.formats(),
            vec![WeightFormat::Safetensors, WeightFormat::PytorchBin]
        );
        assert_eq!(info.files_of_format(WeightFormat::Safetensors).count(), 2);
    }

    #[test]
    fn test_implicit_sharding() {
        let files = vec![
            FileEntry::new("a.safetensors", 1),
            FileEntry::new("b.safetensors", 1),
            FileEntry::new("c.safetensors", 1),
        ];
        let info = analyze_transformers(&files, &MetadataMap::new());
        assert!(info.is_sharded);
        assert_eq!(info.shard_count, 3);

        let single = analyze_transformers(&files[..1], &MetadataMap::new());
        assert!(!single.is_sharded);
    }

    #[test]
    fn test_tokenizer() {
        let info = analyze_transformers(&[], &llama_metadata());
        let tok = info.tokenizer.unwrap();
        assert_eq!(tok.tokenizer_class.as_deref(), Some("LlamaTokenizer"));
        assert_eq!(tok.model_max_length, None);
        assert_eq!(tok.add_bos_token, Some(true));
        assert!(tok.has_chat_template());
    }

    #[test]
    fn test_sliding_window_preferred() {
        let mut md = MetadataMap::new();
        md.insert(
            "config.json".to_string(),
            json!({"max_position_embeddings": 32768, "sliding_window": 4096}),
        );
        let info = analyze_transformers(&[], &md);
        assert_eq!(info.context_length, Some(4096));
        assert_eq!(info.max_position_embeddings, Some(32768));

        md.insert(
            "config.json".to_string(),
            json!({"max_position_embeddings": 32768, "sliding_window": null}),
        );
        assert_eq!(analyze_transformers(&[], &md).context_length, Some(32768));
    }

    #[test]
    fn test_precision_from_files() {
        let files = vec![
            FileEntry::new("model.bf16.safetensors", 1),
            FileEntry::new("model.fp16.safetensors", 1),
        ];
        let info = analyze_transformers(&files, &MetadataMap::new());
        assert_eq!(info.precision, "bf16");
        assert_eq!(info.precision_variants, vec!["bf16".to_string(), "fp16".to_string()]);
        assert!(info.architecture.is_none());
        assert!(info.task.is_none());
        assert!(info.estimated_parameters.is_none());

        assert_eq!(detect_precision_from_files(&[]), "fp32");
    }

    #[test]
    fn test_infer_task() {
        assert_eq!(infer_task("BertForSequenceClassification").0, "text-classification");
        assert_eq!(infer_task("BertForTokenClassification").0, "token-classification");
        assert_eq!(infer_task("RobertaForMaskedLM").0, "fill-mask");
        assert_eq!(infer_task("T5ForConditionalGeneration").0, "text2text-generation");
        assert_eq!(infer_task("BertModel").0, "feature-extraction");
        assert_eq!(infer_task("SomethingElse"), ("text-generation", "General language model"));
    }

    #[test]
    fn test_format_parameter_count() {
        assert_eq!(format_parameter_count(0), None);
        assert_eq!(format_parameter_count(7_241_732_096).as_deref(), Some("7.2B"));
        assert_eq!(format_parameter_count(176_000_000_000).as_deref(), Some("176B"));
        assert_eq!(format_parameter_count(350_000_000).as_deref(), Some("350M"));
        assert_eq!(format_parameter_count(5_000).as_deref(), Some("5000"));
    }

    #[test]
    fn test_normalize_precision() {
        assert_eq!(normalize_precision("torch.bfloat16"), "bf16");
        assert_eq!(normalize_precision("float32"), "fp32");
        assert_eq!(normalize_precision("auto"), "auto");
    }
}

//! Size estimates and default selections.

use crate::analysis::gguf::{GgufInfo, GgufQuantization, sort_by_quality};
use crate::domain::{DEFAULT_RECOMMENDED, WeightFormat};

/// Fixed runtime overhead added to every GGUF RAM estimate.
pub const RAM_OVERHEAD_BYTES: u64 = 500 * 1024 * 1024;

/// Bit width assumed for VRAM estimates when the config does not say.
pub const DEFAULT_VRAM_BITS: u32 = 4;

/// Estimated RAM to load a GGUF file: `size × 1.1 + 500 MiB`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn estimate_ram(file_size: u64) -> u64 {
    (((file_size as f64) * 1.1) as u64).saturating_add(RAM_OVERHEAD_BYTES)
}

/// Quantizations whose estimated RAM fits the budget, best first.
///
/// Every returned entry fits; ties in quality prefer the smaller file.
#[must_use]
pub fn recommend_gguf(info: &GgufInfo, available_ram: u64) -> Vec<GgufQuantization> {
    let mut fitting: Vec<GgufQuantization> = info
        .quantizations
        .iter()
        .filter(|q| q.estimated_ram <= available_ram)
        .cloned()
        .collect();
    sort_by_quality(&mut fitting);
    fitting
}

/// Estimated VRAM for a quantized transformer:
/// `12 × hidden² × layers × (bits / 8) × 1.2`.
///
/// Returns `None` when either dimension is zero. A zero bit width falls
/// back to [`DEFAULT_VRAM_BITS`].
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn estimate_vram(hidden_size: u64, num_layers: u64, bits: u32) -> Option<u64> {
    if hidden_size == 0 || num_layers == 0 {
        return None;
    }
    let bits = if bits == 0 { DEFAULT_VRAM_BITS } else { bits };
    let params = 12.0 * (hidden_size as f64).powi(2) * num_layers as f64;
    let bytes = params * (f64::from(bits) / 8.0) * 1.2;
    Some(bytes as u64)
}

// ============================================================================
// Default Selections
// ============================================================================

/// Whether a GGUF quantization code is the default pick.
#[must_use]
pub fn is_default_quantization(name: &str) -> bool {
    name == DEFAULT_RECOMMENDED.as_str()
}

/// Whether a precision variant is the default pick.
#[must_use]
pub fn is_default_variant(variant: &str) -> bool {
    variant == "fp16"
}

/// Whether a dataset split is the default pick.
#[must_use]
pub fn is_default_split(split: &str) -> bool {
    split == "train"
}

/// Whether a weight format is the default pick.
#[must_use]
pub fn is_default_format(format: WeightFormat) -> bool {
    format == WeightFormat::Safetensors
}

//! llama.cpp quantization levels with their static quality ratings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Quality used for codes that match the quantization pattern but are not rated.
pub const DEFAULT_QUALITY: u8 = 3;

/// The quantization level every GGUF projection marks as recommended.
pub const DEFAULT_RECOMMENDED: QuantLevel = QuantLevel::Q4KM;

/// A rated llama.cpp quantization level.
///
/// Only levels with a known quality rating are listed here. Other codes the
/// filename pattern recognizes are kept as plain strings by the GGUF analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantLevel {
    // 2-bit
    Q2K,
    Q2KS,
    Iq2S,
    Iq2Xs,
    Iq2Xxs,
    // 3-bit
    Q3KS,
    Q3KM,
    Q3KL,
    Iq3S,
    Iq3Xs,
    Iq3M,
    // 4-bit
    Q4_0,
    Q4_1,
    Q4KS,
    Q4KM,
    Iq4Nl,
    Iq4Xs,
    // 5-bit
    Q5_0,
    Q5_1,
    Q5KS,
    Q5KM,
    // 6-bit and up
    Q6K,
    Q8_0,
    F16,
    F32,
    Bf16,
}

impl QuantLevel {
    /// Every rated level.
    pub const ALL: [Self; 26] = [
        Self::Q2K,
        Self::Q2KS,
        Self::Iq2S,
        Self::Iq2Xs,
        Self::Iq2Xxs,
        Self::Q3KS,
        Self::Q3KM,
        Self::Q3KL,
        Self::Iq3S,
        Self::Iq3Xs,
        Self::Iq3M,
        Self::Q4_0,
        Self::Q4_1,
        Self::Q4KS,
        Self::Q4KM,
        Self::Iq4Nl,
        Self::Iq4Xs,
        Self::Q5_0,
        Self::Q5_1,
        Self::Q5KS,
        Self::Q5KM,
        Self::Q6K,
        Self::Q8_0,
        Self::F16,
        Self::F32,
        Self::Bf16,
    ];

    /// Canonical uppercase code as it appears in filenames.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q2K => "Q2_K",
            Self::Q2KS => "Q2_K_S",
            Self::Iq2S => "IQ2_S",
            Self::Iq2Xs => "IQ2_XS",
            Self::Iq2Xxs => "IQ2_XXS",
            Self::Q3KS => "Q3_K_S",
            Self::Q3KM => "Q3_K_M",
            Self::Q3KL => "Q3_K_L",
            Self::Iq3S => "IQ3_S",
            Self::Iq3Xs => "IQ3_XS",
            Self::Iq3M => "IQ3_M",
            Self::Q4_0 => "Q4_0",
            Self::Q4_1 => "Q4_1",
            Self::Q4KS => "Q4_K_S",
            Self::Q4KM => "Q4_K_M",
            Self::Iq4Nl => "IQ4_NL",
            Self::Iq4Xs => "IQ4_XS",
            Self::Q5_0 => "Q5_0",
            Self::Q5_1 => "Q5_1",
            Self::Q5KS => "Q5_K_S",
            Self::Q5KM => "Q5_K_M",
            Self::Q6K => "Q6_K",
            Self::Q8_0 => "Q8_0",
            Self::F16 => "F16",
            Self::F32 => "F32",
            Self::Bf16 => "BF16",
        }
    }

    /// Quality rating from 1 (smallest, lossy) to 5 (near-lossless).
    #[must_use]
    pub const fn quality(&self) -> u8 {
        match self {
            Self::Q2K | Self::Q2KS | Self::Iq2S | Self::Iq2Xs | Self::Iq2Xxs => 1,
            Self::Q3KS | Self::Q3KM | Self::Q3KL | Self::Iq3S | Self::Iq3Xs | Self::Iq3M => 2,
            Self::Q4_0 | Self::Q4_1 | Self::Q4KS | Self::Iq4Nl | Self::Iq4Xs => 3,
            Self::Q4KM | Self::Q5_0 | Self::Q5_1 | Self::Q5KS => 4,
            Self::Q5KM | Self::Q6K | Self::Q8_0 | Self::F16 | Self::F32 | Self::Bf16 => 5,
        }
    }

    /// Short human description of the size/quality trade-off.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Q2K | Self::Q2KS => "Smallest, significant quality loss",
            Self::Iq2S => "Importance matrix 2-bit, small",
            Self::Iq2Xs => "Importance matrix 2-bit, extra small",
            Self::Iq2Xxs => "Importance matrix 2-bit, extra extra small",
            Self::Q3KS => "Very small, noticeable quality loss",
            Self::Q3KM | Self::Q3KL => "Small, noticeable quality loss",
            Self::Iq3S => "Importance matrix 3-bit, small",
            Self::Iq3Xs => "Importance matrix 3-bit, extra small",
            Self::Iq3M => "Importance matrix 3-bit, medium",
            Self::Q4_0 => "Legacy 4-bit, good balance",
            Self::Q4_1 => "Legacy 4-bit with scales",
            Self::Q4KS => "Small 4-bit, good quality",
            Self::Q4KM => "Medium 4-bit, recommended",
            Self::Iq4Nl => "Importance matrix 4-bit, non-linear",
            Self::Iq4Xs => "Importance matrix 4-bit, extra small",
            Self::Q5_0 => "Legacy 5-bit, very good quality",
            Self::Q5_1 => "Legacy 5-bit with scales",
            Self::Q5KS => "Small 5-bit, excellent quality",
            Self::Q5KM => "Medium 5-bit, excellent quality",
            Self::Q6K => "6-bit, near-lossless",
            Self::Q8_0 => "8-bit, minimal loss",
            Self::F16 => "Half precision, full quality",
            Self::F32 => "Full precision, original quality",
            Self::Bf16 => "Brain float 16, full quality",
        }
    }
}

/// Render a quality rating as five stars.
#[must_use]
pub fn quality_stars(quality: u8) -> String {
    let filled = usize::from(quality.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

impl fmt::Display for QuantLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuantLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .iter()
            .find(|q| q.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

//! Uniform download options and related downloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::format::human_size;

// ============================================================================
// Item Category
// ============================================================================

/// Groups selectable items for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Quantization,
    Component,
    Variant,
    Split,
    Format,
}

impl ItemCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quantization => "quantization",
            Self::Component => "component",
            Self::Variant => "variant",
            Self::Split => "split",
            Self::Format => "format",
        }
    }

    /// Section heading used by selectors.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Quantization => "Quantizations",
            Self::Component => "Components",
            Self::Variant => "Variants",
            Self::Split => "Splits",
            Self::Format => "Formats",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Weight Format
// ============================================================================

/// Serialization format of model weight files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightFormat {
    Safetensors,
    PytorchBin,
    Pytorch,
}

impl WeightFormat {
    /// Detect the format from a file extension (without dot, any case).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "safetensors" => Some(Self::Safetensors),
            "bin" => Some(Self::PytorchBin),
            "pt" | "pth" => Some(Self::Pytorch),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safetensors => "safetensors",
            Self::PytorchBin => "pytorch_bin",
            Self::Pytorch => "pytorch",
        }
    }

    /// Substring handed to downstream tooling to select files of this format.
    #[must_use]
    pub const fn filter_token(&self) -> &'static str {
        match self {
            Self::Safetensors => ".safetensors",
            Self::PytorchBin => ".bin",
            Self::Pytorch => ".pt",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Safetensors => "SafeTensors",
            Self::PytorchBin => "PyTorch (.bin)",
            Self::Pytorch => "PyTorch (.pt)",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Safetensors => "SafeTensors format (recommended, faster loading)",
            Self::PytorchBin => "PyTorch pickle format (legacy)",
            Self::Pytorch => "PyTorch checkpoint",
        }
    }
}

impl fmt::Display for WeightFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Selectable Item
// ============================================================================

/// One user-selectable download option.
///
/// Items are a pure projection of a snapshot; they are recomputed on demand
/// and never stored on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableItem {
    /// Stable identifier within the item list
    pub id: String,
    /// Display label
    pub label: String,
    /// Longer description
    pub description: String,
    /// Total size of the resolved files, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Quality rating 0-5 (0 when not meaningful)
    pub quality: u8,
    /// Whether this is the default choice within its category
    pub recommended: bool,
    /// Grouping category
    pub category: ItemCategory,
    /// Filter token passed to the download tool
    pub filter: String,
    /// Repository paths this item resolves to
    pub files: Vec<String>,
    /// Estimated RAM needed to run this option (GGUF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_ram: Option<u64>,
}

impl SelectableItem {
    /// Size formatted with binary units, or empty when unknown.
    #[must_use]
    pub fn size_human(&self) -> String {
        self.size.map(human_size).unwrap_or_default()
    }
}

// ============================================================================
// Related Downloads
// ============================================================================

/// Kind of companion repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    BaseModel,
}

/// Another repository the analyzed one depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDownload {
    pub kind: RelatedKind,
    /// Repository identifier (`owner/name`)
    pub repo: String,
    pub label: String,
    pub description: String,
    /// Whether the analyzed repository is unusable without it
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

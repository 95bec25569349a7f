//! Domain types shared by the analyzers, the projector and the ports.

mod item;
mod quant;
mod repo;
mod snapshot;

pub use item::{ItemCategory, RelatedDownload, RelatedKind, SelectableItem, WeightFormat};
pub use quant::{DEFAULT_QUALITY, DEFAULT_RECOMMENDED, QuantLevel, quality_stars};
pub use repo::{FileEntry, RefKind, RepoRef, RepoType};
pub use snapshot::{MetadataMap, RepoDetails, RepoSnapshot};

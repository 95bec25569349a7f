//! Dataset split, subset and format detection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::FileEntry;
use crate::utils::format::human_size;

/// Split names recognized in paths, in match order.
pub const STANDARD_SPLITS: [&str; 5] = ["train", "test", "validation", "dev", "eval"];

/// Split assigned to data files with no recognizable split.
pub const DEFAULT_SPLIT: &str = "default";

const DATA_EXTENSIONS: [&str; 12] = [
    "parquet", "arrow", "json", "jsonl", "csv", "tsv", "txt", "tar", "tar.gz", "zip", "gz", "zst",
];

const FORMAT_PREFERENCE: [&str; 6] = ["parquet", "arrow", "jsonl", "json", "csv", "txt"];

/// Analysis result for a dataset repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Splits in priority order
    pub splits: Vec<DatasetSplit>,
    /// Config/subset names, sorted
    pub configs: Vec<String>,
    /// Data formats seen, sorted
    pub formats: Vec<String>,
    /// Preferred format among `formats`
    pub primary_format: Option<String>,
}

/// Files belonging to one split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSplit {
    pub name: String,
    /// Paths of the split's data files
    pub files: Vec<String>,
    pub size: u64,
}

impl DatasetSplit {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn size_human(&self) -> String {
        human_size(self.size)
    }
}

impl DatasetInfo {
    pub fn split(&self, name: &str) -> Option<&DatasetSplit> {
        self.splits.iter().find(|s| s.name == name)
    }

    pub fn has_multiple_configs(&self) -> bool {
        self.configs.len() > 1
    }

    pub fn has_multiple_formats(&self) -> bool {
        self.formats.len() > 1
    }

    /// Total size of the named splits; an empty selection means every split.
    pub fn calculate_selected_size(&self, selected: &[&str]) -> u64 {
        if selected.is_empty() {
            return self.splits.iter().map(|s| s.size).fold(0, u64::saturating_add);
        }
        let names: BTreeSet<&str> = selected.iter().copied().collect();
        names
            .into_iter()
            .filter_map(|name| self.split(name))
            .map(|s| s.size)
            .fold(0, u64::saturating_add)
    }
}

// ============================================================================
// Detection Rules
// ============================================================================

fn is_data_extension(ext: &str) -> bool {
    DATA_EXTENSIONS.contains(&ext)
}

/// Infer a split from a path and base name, or `default`.
pub fn detect_split(path: &str, name: &str) -> &'static str {
    let path = path.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();

    STANDARD_SPLITS
        .iter()
        .find(|split| {
            path.contains(&format!("/{split}/"))
                || path.starts_with(&format!("{split}/"))
                || name.contains(&format!("{split}-"))
                || name.contains(&format!("{split}_"))
                || name.starts_with(&format!("{split}."))
        })
        .copied()
        .unwrap_or(DEFAULT_SPLIT)
}

/// First directory segment that is neither `data` nor a split name.
pub fn detect_config(path: &str) -> Option<String> {
    let (dirs, _) = path.rsplit_once('/')?;
    dirs.split('/')
        .find(|segment| {
            let lower = segment.to_ascii_lowercase();
            !segment.is_empty() && lower != "data" && !STANDARD_SPLITS.contains(&lower.as_str())
        })
        .map(ToString::to_string)
}

/// Order of splits: train, validation, dev, test, eval.
///
/// [`DEFAULT_SPLIT`] and any other name sort last.
pub fn split_priority(split: &str) -> u8 {
    match split {
        "train" => 0,
        "validation" => 1,
        "dev" => 2,
        "test" => 3,
        "eval" => 4,
        _ => 5,
    }
}

/// Preferred format: parquet, arrow, jsonl, json, csv, txt, else the first.
pub fn select_primary_format(formats: &[String]) -> Option<String> {
    FORMAT_PREFERENCE
        .iter()
        .find(|pref| formats.iter().any(|f| f == *pref))
        .map(|pref| (*pref).to_string())
        .or_else(|| formats.first().cloned())
}

pub fn format_description(format: &str) -> &'static str {
    match format {
        "parquet" => "Apache Parquet columnar format (recommended)",
        "arrow" => "Apache Arrow IPC format",
        "json" | "jsonl" => "JSON Lines format",
        "csv" => "Comma-separated values",
        "tsv" => "Tab-separated values",
        "txt" => "Plain text",
        "tar" => "WebDataset tar archives",
        "tar.gz" => "Compressed WebDataset archives",
        "zip" | "gz" | "zst" => "Compressed archive",
        _ => "Data format",
    }
}

pub fn split_description(split: &str) -> &'static str {
    match split {
        "train" => "Primary training data",
        "validation" => "Validation/evaluation set",
        "dev" => "Development set",
        "test" => "Held-out test set",
        "eval" => "Evaluation set",
        DEFAULT_SPLIT => "Default dataset split",
        _ => "Dataset split",
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Group data-bearing files into splits.
pub fn analyze_dataset(files: &[FileEntry]) -> DatasetInfo {
    let mut splits: BTreeMap<&'static str, DatasetSplit> = BTreeMap::new();
    let mut formats = BTreeSet::new();
    let mut configs = BTreeSet::new();

    for file in files {
        let ext = file.extension();
        if !is_data_extension(&ext) {
            continue;
        }

        let split_name = detect_split(&file.path, &file.name);
        if let Some(config) = detect_config(&file.path) {
            configs.insert(config);
        }
        formats.insert(ext);

        let split = splits.entry(split_name).or_insert_with(|| DatasetSplit {
            name: split_name.to_string(),
            files: Vec::new(),
            size: 0,
        });
        split.files.push(file.path.clone());
        split.size = split.size.saturating_add(file.size);
    }

    let mut splits: Vec<DatasetSplit> = splits.into_values().collect();
    splits.sort_by_key(|s| split_priority(&s.name));

    let formats: Vec<String> = formats.into_iter().collect();
    DatasetInfo {
        splits,
        configs: configs.into_iter().collect(),
        primary_format: select_primary_format(&formats),
        formats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_aggregation() {
        let files = vec![
            FileEntry::new("train-0.parquet", 1000),
            FileEntry::new("train-1.parquet", 2000),
            FileEntry::new("README.md", 50),
        ];
        let info = analyze_dataset(&files);

        let train = info.split("train").unwrap();
        assert_eq!(train.size, 3000);
        assert_eq!(train.file_count(), 2);
        assert_eq!(info.splits.len(), 1);
        assert_eq!(info.formats, vec!["parquet".to_string()]);
    }

    #[test]
    fn test_detect_split() {
        assert_eq!(detect_split("data/train/0000.parquet", "0000.parquet"), "train");
        assert_eq!(detect_split("train/a.csv", "a.csv"), "train");
        assert_eq!(detect_split("data/validation-00000.parquet", "validation-00000.parquet"), "validation");
        assert_eq!(detect_split("test.jsonl", "test.jsonl"), "test");
        assert_eq!(detect_split("dev_set.json", "dev_set.json"), "dev");
        assert_eq!(detect_split("data/en/shard.parquet", "shard.parquet"), DEFAULT_SPLIT);
        assert_eq!(detect_split("corpus.txt", "corpus.txt"), DEFAULT_SPLIT);
    }

    #[test]
    fn test_detect_config() {
        assert_eq!(detect_config("data/en/train-0.parquet").as_deref(), Some("en"));
        assert_eq!(detect_config("wikitext-2/train/a.parquet").as_deref(), Some("wikitext-2"));
        assert_eq!(detect_config("train/de/a.parquet").as_deref(), Some("de"));
        assert_eq!(detect_config("data/train-0.parquet"), None);
        assert_eq!(detect_config("train.parquet"), None);
    }

    #[test]
    fn test_split_ordering() {
        let files = vec![
            FileEntry::new("misc/other.csv", 1),
            FileEntry::new("test.csv", 1),
            FileEntry::new("eval-0.csv", 1),
            FileEntry::new("train.csv", 1),
            FileEntry::new("validation.csv", 1),
        ];
        let info = analyze_dataset(&files);
        let names: Vec<&str> = info.splits.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["train", "validation", "test", "eval", "default"]);
        assert_eq!(info.configs, vec!["misc".to_string()]);
    }

    #[test]
    fn test_default_split_sorts_last() {
        assert!(split_priority("eval") < split_priority(DEFAULT_SPLIT));
        assert_eq!(split_priority(DEFAULT_SPLIT), split_priority("holdout"));
    }

    #[test]
    fn test_select_primary_format() {
        let formats = vec!["json".to_string(), "parquet".to_string(), "csv".to_string()];
        assert_eq!(select_primary_format(&formats).as_deref(), Some("parquet"));
        assert_eq!(select_primary_format(&[]), None);
        assert_eq!(
            select_primary_format(&["zst".to_string()]).as_deref(),
            Some("zst")
        );
    }

    #[test]
    fn test_compound_extension() {
        let files = vec![FileEntry::new("shards/train-000.tar.gz", 10)];
        let info = analyze_dataset(&files);
        assert_eq!(info.formats, vec!["tar.gz".to_string()]);
        assert_eq!(info.primary_format.as_deref(), Some("tar.gz"));
    }

    #[test]
    fn test_selected_size() {
        let files = vec![
            FileEntry::new("train.parquet", 100),
            FileEntry::new("test.parquet", 10),
        ];
        let info = analyze_dataset(&files);
        assert_eq!(info.calculate_selected_size(&[]), 110);
        assert_eq!(info.calculate_selected_size(&["test"]), 10);
        assert_eq!(info.calculate_selected_size(&["nope"]), 0);
        assert_eq!(info.calculate_selected_size(&["test", "test"]), 10);
        assert!(!info.has_multiple_formats());
    }
}

//! Structural classification of a repository from its file list.

use std::collections::HashSet;

use crate::domain::{FileEntry, RepoType};

/// Structural facts about a file list, computed once.
struct FileIndex<'a> {
    names: HashSet<&'a str>,
    extensions: HashSet<String>,
}

impl<'a> FileIndex<'a> {
    fn new(files: &'a [FileEntry]) -> Self {
        let mut names = HashSet::new();
        let mut extensions = HashSet::new();
        for file in files {
            names.insert(file.path.as_str());
            names.insert(file.name.as_str());
            extensions.insert(file.extension());
        }
        Self { names, extensions }
    }

    fn has_file(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn has_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }
}

/// Assign exactly one type from file structure alone.
///
/// First match wins:
/// 1. dataset flag
/// 2. any `.gguf` file
/// 3. `model_index.json`
/// 4. `adapter_config.json`
/// 5. `quantize_config.json` (reported as GPTQ until the method is known)
/// 6. any `.onnx` file
/// 7. `config.json` with `.safetensors` or `.bin` weights
/// 8. generic
///
/// Marker files match on either full path or base name.
pub fn classify(files: &[FileEntry], is_dataset: bool) -> RepoType {
    if is_dataset {
        return RepoType::Dataset;
    }

    let index = FileIndex::new(files);

    if index.has_extension("gguf") {
        RepoType::Gguf
    } else if index.has_file("model_index.json") {
        RepoType::Diffusers
    } else if index.has_file("adapter_config.json") {
        RepoType::Lora
    } else if index.has_file("quantize_config.json") {
        RepoType::Gptq
    } else if index.has_extension("onnx") {
        RepoType::Onnx
    } else if index.has_file("config.json")
        && (index.has_extension("safetensors") || index.has_extension("bin"))
    {
        RepoType::Transformers
    } else {
        RepoType::Generic
    }
}

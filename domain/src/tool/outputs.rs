//! Outputs reported by the tool wrapper
//!
//! The wrapper exposes what a tool produced as named entries (for example
//! `outfile`, `binary_mask`, `tissue_maps`). Invocations pick the entries
//! they expect; an absent optional entry is simply `None`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A single named wrapper output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    Path(PathBuf),
    Paths(Vec<PathBuf>),
}

/// Named outputs returned by one wrapper call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperOutputs {
    entries: BTreeMap<String, OutputValue>,
}

impl WrapperOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries
            .insert(name.into(), OutputValue::Path(path.into()));
        self
    }

    pub fn with_paths<I, P>(mut self, name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.entries.insert(name.into(), OutputValue::Paths(paths));
        self
    }

    /// Single path output, if the wrapper reported one under `name`
    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.entries.get(name)? {
            OutputValue::Path(p) => Some(p),
            OutputValue::Paths(_) => None,
        }
    }

    /// List output; absent entries read as empty
    pub fn paths(&self, name: &str) -> &[PathBuf] {
        match self.entries.get(name) {
            Some(OutputValue::Paths(paths)) => paths,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_paths_lookup() {
        let outputs = WrapperOutputs::new()
            .with_path("outfile", "/out/seg.nii.gz")
            .with_paths("tissue_maps", ["/out/pve_0.nii.gz", "/out/pve_1.nii.gz"]);

        assert_eq!(
            outputs.path("outfile"),
            Some(Path::new("/out/seg.nii.gz"))
        );
        assert_eq!(outputs.paths("tissue_maps").len(), 2);
        // Kind mismatches and absent entries are not errors
        assert!(outputs.path("tissue_maps").is_none());
        assert!(outputs.paths("outfile").is_empty());
        assert!(outputs.path("bias_field").is_none());
    }
}

//! Dataset location: an explicit path, or the first existing candidate of an ordered list.

use std::path::{Path, PathBuf};

use crate::config::DataConfig;
use crate::error::{DashboardError, Result};

/// Ordered candidate locations for the dataset file. First match wins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetLocator {
    candidates: Vec<PathBuf>,
}

impl DatasetLocator {
    /// Only `path` is considered.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    /// `<cwd>/<file_name>`, then `<dir>/<file_name>` for every configured search path.
    pub fn search(file_name: &str, cwd: Option<&Path>, search_paths: &[PathBuf]) -> Self {
        let mut candidates = Vec::with_capacity(search_paths.len() + 1);
        match cwd {
            Some(dir) => candidates.push(dir.join(file_name)),
            None => candidates.push(PathBuf::from(file_name)),
        }
        for dir in search_paths {
            let candidate = dir.join(file_name);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        Self { candidates }
    }

    /// Build the locator the binary uses: the `--path` override, or the configured search.
    pub fn from_config(data: &DataConfig, path_override: Option<&Path>) -> Self {
        match path_override {
            Some(path) => Self::explicit(path),
            None => {
                let cwd = std::env::current_dir().ok();
                Self::search(&data.file_name, cwd.as_deref(), &data.search_paths)
            }
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that is an existing file, or `DatasetNotFound` listing every candidate.
    pub fn resolve(&self) -> Result<PathBuf> {
        for candidate in &self.candidates {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "dataset found");
                return Ok(candidate.clone());
            }
            tracing::trace!(path = %candidate.display(), "dataset candidate missing");
        }
        Err(DashboardError::DatasetNotFound {
            searched: self.candidates.clone(),
        })
    }
}

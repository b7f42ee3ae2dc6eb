use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while analyzing a single artifact. All variants are
/// artifact-local: one failing artifact never aborts the scan of the others.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("malformed class file{}: {detail}", entry_label(.entry))]
    MalformedClassFormat {
        entry: Option<String>,
        detail: String,
    },

    #[error("archive read failure at {path}: {message}")]
    ArchiveRead {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("inheritance chain starting at {owner} exceeded {limit} levels, hierarchy is cyclic")]
    UnresolvableCyclicHierarchy { owner: String, limit: usize },
}

impl ScanError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedClassFormat {
            entry: None,
            detail: detail.into(),
        }
    }

    pub fn in_entry(self, entry: &str) -> Self {
        match self {
            Self::MalformedClassFormat { detail, .. } => Self::MalformedClassFormat {
                entry: Some(entry.to_string()),
                detail,
            },
            other => other,
        }
    }

    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ArchiveRead {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn archive_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::ArchiveRead {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

fn entry_label(entry: &Option<String>) -> String {
    match entry {
        Some(name) => format!(" ({name})"),
        None => String::new(),
    }
}

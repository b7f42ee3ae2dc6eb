use std::collections::HashSet;

// Platform types terminate ancestor walks and are never deprecation
// candidates.
const PLATFORM_PREFIXES: [&str; 2] = ["java/", "javax/"];

pub fn is_platform_class(internal_name: &str) -> bool {
    PLATFORM_PREFIXES
        .iter()
        .any(|p| internal_name.starts_with(p))
}

/// Tuning knobs for one scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Owners are only matched when their qualified name contains one of
    /// these substrings; an empty list disables the filter. Misses host
    /// classes that a plugin shades under another namespace.
    pub relevant_namespaces: Vec<String>,

    /// Owners whose name ends with one of these are dropped before any
    /// matching. Groovy's DefaultTypeTransformation shim produces synthetic
    /// call sites that are not genuine usage.
    pub denied_owner_suffixes: Vec<String>,

    /// Artifact file names skipped without decoding anything.
    pub ignored_artifacts: HashSet<String>,

    /// Ancestor-walk depth bound; exceeding it means the artifact's class
    /// data is cyclic.
    pub max_inheritance_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            relevant_namespaces: vec![
                "jenkins".to_string(),
                "hudson".to_string(),
                "org/kohsuke".to_string(),
            ],
            denied_owner_suffixes: vec!["DefaultTypeTransformation".to_string()],
            // python-wrapper ships auto-generated wrappers for every
            // extension point; none of it is genuine usage.
            ignored_artifacts: ["python-wrapper.hpi".to_string()].into(),
            max_inheritance_depth: 64,
        }
    }
}

impl ScanConfig {
    /// Matches every owner regardless of namespace.
    pub fn unfiltered() -> Self {
        Self {
            relevant_namespaces: Vec::new(),
            ..Self::default()
        }
    }

    pub fn is_relevant(&self, owner: &str) -> bool {
        self.relevant_namespaces.is_empty()
            || self.relevant_namespaces.iter().any(|ns| owner.contains(ns))
    }

    pub fn is_denied(&self, owner: &str) -> bool {
        self.denied_owner_suffixes
            .iter()
            .any(|suffix| owner.ends_with(suffix))
    }

    pub fn is_ignored_artifact(&self, file_name: &str) -> bool {
        self.ignored_artifacts.contains(file_name)
    }
}

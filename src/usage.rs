use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Name + version of one analyzed artifact; the pair is the reporting
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArtifactId {
    pub name: String,
    pub version: String,
}

impl ArtifactId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Which deprecated signature keys one artifact's classes reference.
/// Ordered sets: re-recording is a no-op and output order is independent of
/// decode order.
#[derive(Debug, Clone, Serialize)]
pub struct DeprecatedUsage {
    pub artifact: ArtifactId,
    classes: BTreeSet<String>,
    methods: BTreeSet<String>,
    fields: BTreeSet<String>,
}

impl DeprecatedUsage {
    pub fn new(artifact: ArtifactId) -> Self {
        Self {
            artifact,
            classes: BTreeSet::new(),
            methods: BTreeSet::new(),
            fields: BTreeSet::new(),
        }
    }

    pub fn record_class(&mut self, key: String) {
        self.classes.insert(key);
    }

    pub fn record_method(&mut self, key: String) {
        self.methods.insert(key);
    }

    pub fn record_field(&mut self, key: String) {
        self.fields.insert(key);
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    pub fn has_deprecated_usage(&self) -> bool {
        !self.classes.is_empty() || !self.methods.is_empty() || !self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_is_idempotent_and_sorted() {
        let mut usage = DeprecatedUsage::new(ArtifactId::new("git", "5.0.0"));
        usage.record_method("hudson/model/Run#b()V".to_string());
        usage.record_method("hudson/model/Run#a()V".to_string());
        usage.record_method("hudson/model/Run#b()V".to_string());

        let methods: Vec<&String> = usage.methods().iter().collect();
        assert_eq!(methods, ["hudson/model/Run#a()V", "hudson/model/Run#b()V"]);
    }

    #[test]
    fn empty_record_reports_no_usage() {
        let usage = DeprecatedUsage::new(ArtifactId::new("git", "5.0.0"));
        assert!(!usage.has_deprecated_usage());
    }

    #[test]
    fn any_category_counts_as_usage() {
        let mut usage = DeprecatedUsage::new(ArtifactId::new("git", "5.0.0"));
        usage.record_field("hudson/model/Run#number:I".to_string());
        assert!(usage.has_deprecated_usage());
    }
}

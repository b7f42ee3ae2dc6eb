use std::collections::HashSet;
use std::path::Path;

use crate::archive::ArchiveClasses;
use crate::classfile::{self, ClassSummary};
use crate::config::is_platform_class;
use crate::error::ScanError;

/// Signature key for a method: `owner#name(Args)Ret`.
pub fn method_key(owner: &str, name: &str, descriptor: &str) -> String {
    format!("{owner}#{name}{descriptor}")
}

/// Signature key for a field: `owner#name:Descriptor`.
pub fn field_key(owner: &str, name: &str, descriptor: &str) -> String {
    format!("{owner}#{name}:{descriptor}")
}

/// The catalog of known-deprecated signature keys, built once per run.
#[derive(Debug, Default, Clone)]
pub struct DeprecatedApi {
    classes: HashSet<String>,
    methods: HashSet<String>,
    fields: HashSet<String>,
}

impl DeprecatedApi {
    pub fn from_sets(
        classes: HashSet<String>,
        methods: HashSet<String>,
        fields: HashSet<String>,
    ) -> Self {
        Self {
            classes,
            methods,
            fields,
        }
    }

    pub fn from_core_archive(path: &Path) -> Result<Self, ScanError> {
        let mut api = Self::default();
        let source = ArchiveClasses::open(path)?;
        source.for_each_class(&mut |entry_name, bytes| {
            let summary = classfile::decode(bytes).map_err(|e| e.in_entry(entry_name))?;
            api.index_class(&summary);
            Ok(())
        })?;
        Ok(api)
    }

    /// A deprecated class contributes its class key and every declared
    /// member key; otherwise only members carrying the attribute themselves
    /// contribute.
    pub fn index_class(&mut self, summary: &ClassSummary) {
        if is_platform_class(&summary.name) {
            return;
        }
        if summary.deprecated {
            self.classes.insert(summary.name.clone());
        }
        for m in &summary.declared_methods {
            if summary.deprecated || m.deprecated {
                self.methods
                    .insert(method_key(&summary.name, &m.name, &m.descriptor));
            }
        }
        for f in &summary.declared_fields {
            if summary.deprecated || f.deprecated {
                self.fields
                    .insert(field_key(&summary.name, &f.name, &f.descriptor));
            }
        }
    }

    pub fn classes(&self) -> &HashSet<String> {
        &self.classes
    }

    pub fn methods(&self) -> &HashSet<String> {
        &self.methods
    }

    pub fn fields(&self) -> &HashSet<String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.methods.is_empty() && self.fields.is_empty()
    }
}

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::analyze::ArtifactOutcome;
use crate::catalog::DeprecatedApi;

/// Usage of one plugin, keyed by `"name version"` in `ScanReport::plugins`
/// so that two scanned versions of one plugin never collide.
#[derive(Debug, Serialize)]
pub struct PluginUsage {
    pub version: String,
    pub classes: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    pub fields: BTreeSet<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct UnusedApis {
    pub classes: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    pub fields: BTreeSet<String>,
}

/// The merged output of one run: usage grouped by plugin, the reverse
/// grouping by API key, catalog entries nobody uses, and per-artifact
/// failures. Everything is BTree-ordered so two runs over the same inputs
/// serialize identically.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub plugins: BTreeMap<String, PluginUsage>,
    pub by_api: BTreeMap<String, BTreeSet<String>>,
    pub unused: UnusedApis,
    pub failures: BTreeMap<String, String>,
}

impl ScanReport {
    pub fn build(api: &DeprecatedApi, outcomes: &[ArtifactOutcome]) -> Self {
        let mut plugins = BTreeMap::new();
        let mut by_api: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let mut used: BTreeSet<&String> = BTreeSet::new();

        for outcome in outcomes {
            let id = outcome.artifact.to_string();
            match &outcome.result {
                Ok(usage) => {
                    if !usage.has_deprecated_usage() {
                        continue;
                    }
                    for key in usage
                        .classes()
                        .iter()
                        .chain(usage.methods())
                        .chain(usage.fields())
                    {
                        by_api.entry(key.clone()).or_default().insert(id.clone());
                        used.insert(key);
                    }
                    plugins.insert(
                        id,
                        PluginUsage {
                            version: outcome.artifact.version.clone(),
                            classes: usage.classes().clone(),
                            methods: usage.methods().clone(),
                            fields: usage.fields().clone(),
                        },
                    );
                }
                Err(e) => {
                    failures.insert(id, e.to_string());
                }
            }
        }

        let unused = UnusedApis {
            classes: leftover(api.classes(), &used),
            methods: leftover(api.methods(), &used),
            fields: leftover(api.fields(), &used),
        };

        Self {
            plugins,
            by_api,
            unused,
            failures,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "plugins with deprecated usage: {}", self.plugins.len());
        for (id, usage) in &self.plugins {
            let _ = writeln!(out, "\n{id}");
            for key in usage.classes.iter().chain(&usage.methods).chain(&usage.fields) {
                let _ = writeln!(out, "  {key}");
            }
        }
        let _ = writeln!(
            out,
            "\nunused deprecated APIs: {} classes, {} methods, {} fields",
            self.unused.classes.len(),
            self.unused.methods.len(),
            self.unused.fields.len()
        );
        if !self.failures.is_empty() {
            let _ = writeln!(out, "\nfailed artifacts: {}", self.failures.len());
            for (name, error) in &self.failures {
                let _ = writeln!(out, "  {name}: {error}");
            }
        }
        out
    }
}

fn leftover(
    catalog: &std::collections::HashSet<String>,
    used: &BTreeSet<&String>,
) -> BTreeSet<String> {
    catalog
        .iter()
        .filter(|key| !used.contains(key))
        .cloned()
        .collect()
}

use std::collections::HashMap;

use crate::classfile::ClassSummary;
use crate::config::is_platform_class;

/// Direct-parent index for the classes of one artifact. Full ancestor
/// chains are walked lazily during resolution; platform parents are pruned
/// at indexing time.
#[derive(Debug, Default)]
pub struct Hierarchy {
    parents_by_class: HashMap<String, Vec<String>>,
}

impl Hierarchy {
    pub fn index(&mut self, summary: &ClassSummary) {
        let mut parents = Vec::new();
        if let Some(super_name) = &summary.super_name {
            if !is_platform_class(super_name) {
                parents.push(super_name.clone());
            }
        }
        for interface in &summary.interfaces {
            if !is_platform_class(interface) {
                parents.push(interface.clone());
            }
        }
        if !parents.is_empty() {
            self.parents_by_class.insert(summary.name.clone(), parents);
        }
    }

    /// Empty when the class is unknown to this artifact or has only
    /// platform parents.
    pub fn parents(&self, class_name: &str) -> &[String] {
        self.parents_by_class
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.parents_by_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents_by_class.is_empty()
    }
}

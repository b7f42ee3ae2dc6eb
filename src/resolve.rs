use crate::catalog::{DeprecatedApi, field_key, method_key};
use crate::classfile::MemberRef;
use crate::config::{ScanConfig, is_platform_class};
use crate::error::ScanError;
use crate::hierarchy::Hierarchy;
use crate::usage::DeprecatedUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Field,
}

/// Matches one artifact's references against the catalog, walking the
/// artifact's inheritance graph for inherited members.
pub struct Resolver<'a> {
    api: &'a DeprecatedApi,
    hierarchy: &'a Hierarchy,
    config: &'a ScanConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a DeprecatedApi, hierarchy: &'a Hierarchy, config: &'a ScanConfig) -> Self {
        Self {
            api,
            hierarchy,
            config,
        }
    }

    /// The literal owner written at the site is matched first, then each
    /// ancestor with the same name and descriptor.
    pub fn record(
        &self,
        usage: &mut DeprecatedUsage,
        reference: &MemberRef,
        kind: MemberKind,
    ) -> Result<(), ScanError> {
        self.resolve(
            usage,
            &reference.owner,
            &reference.name,
            &reference.descriptor,
            kind,
            0,
        )
    }

    fn resolve(
        &self,
        usage: &mut DeprecatedUsage,
        owner: &str,
        name: &str,
        descriptor: &str,
        kind: MemberKind,
        depth: usize,
    ) -> Result<(), ScanError> {
        // Hierarchies are acyclic in any well-formed artifact, so hitting
        // the bound means the class data itself is defective.
        if depth > self.config.max_inheritance_depth {
            return Err(ScanError::UnresolvableCyclicHierarchy {
                owner: owner.to_string(),
                limit: self.config.max_inheritance_depth,
            });
        }
        if is_platform_class(owner) || self.config.is_denied(owner) {
            return Ok(());
        }
        if !self.config.is_relevant(owner) {
            return Ok(());
        }

        // A deprecated owner class flags the whole reference; member-level
        // matching would be redundant for this site.
        if self.api.classes().contains(owner) {
            usage.record_class(owner.to_string());
            return Ok(());
        }

        match kind {
            MemberKind::Method => {
                let key = method_key(owner, name, descriptor);
                if self.api.methods().contains(&key) {
                    usage.record_method(key);
                }
            }
            MemberKind::Field => {
                let key = field_key(owner, name, descriptor);
                if self.api.fields().contains(&key) {
                    usage.record_field(key);
                }
            }
        }

        for parent in self.hierarchy.parents(owner) {
            self.resolve(usage, parent, name, descriptor, kind, depth + 1)?;
        }
        Ok(())
    }
}

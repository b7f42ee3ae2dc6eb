use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::archive::ArchiveClasses;
use crate::catalog::DeprecatedApi;
use crate::classfile;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::hierarchy::Hierarchy;
use crate::resolve::{MemberKind, Resolver};
use crate::usage::{ArtifactId, DeprecatedUsage};

/// Two full traversals of the artifact's class entries: the first builds
/// the inheritance graph, the second resolves references against the
/// catalog. A reference in any class may need ancestor data from any other
/// class of the same artifact, so one pass is not enough.
pub fn analyze_artifact(
    artifact: ArtifactId,
    path: &Path,
    api: &DeprecatedApi,
    config: &ScanConfig,
) -> Result<DeprecatedUsage, ScanError> {
    let mut usage = DeprecatedUsage::new(artifact);

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if config.is_ignored_artifact(file_name) {
        return Ok(usage);
    }

    let source = ArchiveClasses::open(path)?;

    let mut hierarchy = Hierarchy::default();
    source.for_each_class(&mut |entry, bytes| {
        let summary = classfile::decode(bytes).map_err(|e| e.in_entry(entry))?;
        hierarchy.index(&summary);
        Ok(())
    })?;
    debug!(artifact = %usage.artifact, classes = hierarchy.len(), "hierarchy indexed");

    let resolver = Resolver::new(api, &hierarchy, config);
    source.for_each_class(&mut |entry, bytes| {
        let summary = classfile::decode(bytes).map_err(|e| e.in_entry(entry))?;
        for site in &summary.method_refs {
            resolver.record(&mut usage, site, MemberKind::Method)?;
        }
        for site in &summary.field_refs {
            resolver.record(&mut usage, site, MemberKind::Field)?;
        }
        Ok(())
    })?;

    Ok(usage)
}

/// Either a complete usage record or that artifact's failure.
pub struct ArtifactOutcome {
    pub artifact: ArtifactId,
    pub path: PathBuf,
    pub result: Result<DeprecatedUsage, ScanError>,
}

/// Fan the artifact list out over the rayon pool, one artifact per worker.
/// Output order follows input order regardless of scheduling.
pub fn analyze_all(
    artifacts: Vec<(ArtifactId, PathBuf)>,
    api: &DeprecatedApi,
    config: &ScanConfig,
) -> Vec<ArtifactOutcome> {
    artifacts
        .into_par_iter()
        .map(|(artifact, path)| {
            let result = analyze_artifact(artifact.clone(), &path, api, config);
            match &result {
                Ok(usage) => debug!(
                    artifact = %artifact,
                    has_usage = usage.has_deprecated_usage(),
                    "analyzed"
                ),
                Err(e) => warn!(artifact = %artifact, error = %e, "analysis failed"),
            }
            ArtifactOutcome {
                artifact,
                path,
                result,
            }
        })
        .collect()
}

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::usage::ArtifactId;

const ARTIFACT_EXTENSIONS: [&str; 4] = ["hpi", "jpi", "jar", "war"];

/// Find every plugin archive under `base_path`, sorted by path so the scan
/// processes (and reports) artifacts in a stable order.
pub fn scan_artifacts(base_path: &Path) -> Result<Vec<(ArtifactId, PathBuf)>> {
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if is_artifact(path) {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut paths: Vec<PathBuf> = rx.iter().collect();
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|p| (artifact_identity(&p), p))
        .collect())
}

fn is_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ARTIFACT_EXTENSIONS.contains(&e))
}

/// Derive name + version from a `name-version.ext` file name: split at the
/// first hyphen followed by a digit, Maven style. Files without a version
/// segment get version `unknown`.
pub fn artifact_identity(path: &Path) -> ArtifactId {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    for (i, _) in stem.match_indices('-') {
        if stem.as_bytes().get(i + 1).is_some_and(u8::is_ascii_digit) {
            return ArtifactId::new(&stem[..i], &stem[i + 1..]);
        }
    }
    ArtifactId::new(stem, "unknown")
}

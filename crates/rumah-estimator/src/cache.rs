//! On-disk model cache.
//!
//! A cache entry is keyed by a fingerprint of everything that went into the
//! fit: algorithm identity, the hyperparameter search space, the feature set,
//! and the training data itself. Changing any of those changes the path, so a
//! stale artifact is never silently served. Persistence goes through a
//! uniquely named temp file plus rename so concurrent writers cannot leave a
//! torn file behind.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::math::{Array1, Array2};

/// Whether a model came from disk or from a fresh fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Fingerprint a fitting configuration and its training data.
pub fn model_fingerprint(
    algorithm: &str,
    search_spec_json: &str,
    feature_names: &[String],
    x: &Array2<f32>,
    y: &Array1<f32>,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    algorithm.hash(&mut hasher);
    search_spec_json.hash(&mut hasher);
    for name in feature_names {
        name.hash(&mut hasher);
    }
    x.shape().hash(&mut hasher);
    for v in x.as_slice() {
        v.to_bits().hash(&mut hasher);
    }
    for v in y.iter() {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Cache file path for a named model under `dir`.
pub fn cache_path(dir: &Path, name: &str, fingerprint: u64) -> PathBuf {
    dir.join(format!("{}-{:016x}.json", name, fingerprint))
}

/// Return the cached model at `path`, or run `train` and persist its result.
///
/// A cache hit is unconditional: whatever is on disk is deserialized and
/// returned without refitting. Fit errors from `train` propagate untouched.
pub fn fit_or_load<M, F>(path: &Path, train: F) -> Result<(M, CacheStatus)>
where
    M: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<M>,
{
    if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cached model: {}", path.display()))?;
        let model = serde_json::from_str(&text)
            .with_context(|| format!("Failed to deserialize cached model: {}", path.display()))?;
        log::info!("Loaded model from cache: {}", path.display());
        return Ok((model, CacheStatus::Hit));
    }

    let model = train()?;
    persist(path, &model)?;
    log::info!("Fitted model and cached it at {}", path.display());
    Ok((model, CacheStatus::Miss))
}

/// Atomic write: serialize into a uniquely named temp file in the cache
/// directory, then rename over the target. Concurrent writers each get
/// their own temp file, so no writer can publish another's partial output.
fn persist<M: Serialize>(path: &Path, model: &M) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;

    let json = serde_json::to_string(model).context("Failed to serialize model")?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write cache file")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move cache file into place: {}", path.display()))?;
    Ok(())
}

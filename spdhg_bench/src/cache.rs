use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};
use crate::BenchError;

/// On-disk artifact cache
///
/// Artifacts are JSON files `{name}.json` below one folder.
/// Floating-point numbers round-trip exactly.
#[derive(Debug, Clone)]
pub struct ArtifactCache
{
    folder: PathBuf,
}

impl ArtifactCache
{
    /// Creates an instance, creating `folder` if absent.
    pub fn new<P: AsRef<Path>>(folder: P) -> Result<Self, BenchError>
    {
        let folder = folder.as_ref().to_path_buf();
        fs::create_dir_all(&folder)?;

        Ok(ArtifactCache {
            folder,
        })
    }

    /// Cache folder.
    pub fn folder(&self) -> &Path
    {
        &self.folder
    }

    /// Path of the artifact `name`.
    pub fn path(&self, name: &str) -> PathBuf
    {
        self.folder.join(format!("{}.json", name))
    }

    /// Loads the artifact `name` if present.
    ///
    /// Returns `Ok(None)` if absent,
    /// or `Err` with [`BenchError::CacheCorruption`] if present but not of type `T`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, BenchError>
    {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }

        let s = fs::read_to_string(&path)?;
        let v = serde_json::from_str(&s).map_err(|e| BenchError::CacheCorruption {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        log::info!("loaded {}", path.display());
        Ok(Some(v))
    }

    /// Saves `value` as the artifact `name`, replacing an existing one.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), BenchError>
    {
        let path = self.path(name);
        let s = serde_json::to_string(value).map_err(std::io::Error::from)?;
        fs::write(&path, s)?;
        log::info!("saved {}", path.display());
        Ok(())
    }

    /// Loads the artifact `name`, or computes and saves it if absent.
    ///
    /// A corrupt artifact is an error, never recomputed.
    pub fn load_or_compute<T, C>(&self, name: &str, compute: C) -> Result<T, BenchError>
    where T: Serialize + DeserializeOwned, C: FnOnce() -> Result<T, BenchError>
    {
        if let Some(v) = self.load(name)? {
            Ok(v)
        }
        else {
            let v = compute()?;
            self.save(name, &v)?;
            Ok(v)
        }
    }
}

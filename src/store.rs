//! Whole-file JSON persistence with a single writer per file.

use std::{
    ffi::OsString,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::error::{BotError, Result};

/// A JSON document on disk that is always read and written as a whole.
///
/// Mutations go through [`JsonFile::update`], which holds the file's write
/// lock for the full load/modify/save cycle so concurrent writers cannot
/// overwrite each other.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _document: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _document: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole document.
    ///
    /// # Errors
    ///
    /// Returns `StoreNotFound` if the file is missing, `StoreParse` if it is
    /// not a valid document, and `Io` for any other read failure.
    pub async fn load(&self) -> Result<T> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BotError::StoreNotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw).map_err(|source| BotError::StoreParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Like [`JsonFile::load`], but a missing file is an empty document.
    ///
    /// # Errors
    ///
    /// Returns `StoreParse` or `Io` as [`JsonFile::load`] does.
    pub async fn load_or_default(&self) -> Result<T> {
        match self.load().await {
            Err(BotError::StoreNotFound { path }) => {
                warn!("{} does not exist yet, starting empty", path.display());
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Overwrite the document.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the temp file cannot be written or renamed.
    pub async fn save(&self, document: &T) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(document).await
    }

    /// Load (or start empty), apply `mutate`, and save, all under the write lock.
    ///
    /// Nothing is written if loading fails.
    ///
    /// # Errors
    ///
    /// Returns `StoreParse` or `Io` from the load or the save.
    pub async fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> Result<R> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_or_default().await?;
        let output = mutate(&mut document);
        self.write(&document).await?;
        Ok(output)
    }

    async fn write(&self, document: &T) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(document).map_err(std::io::Error::from)?;
        json.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(&self.path);
        let written = match tokio::fs::write(&tmp, &json).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await
                && cleanup.kind() != ErrorKind::NotFound
            {
                warn!("Could not remove {}: {cleanup}", tmp.display());
            }
            return Err(e.into());
        }

        debug!("Saved {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

use crate::ai::MediaType;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// An image handed over by the user, not yet on disk where we control it.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("{} is not a file path", path.display()))
            })?
            .to_string();
        Ok(Self {
            file_name,
            bytes: fs::read(path)?,
        })
    }
}

/// Local directory where uploads are written before use.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// The directory is created on the first [`UploadStore::save`].
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `upload` into the store and return its path.
    ///
    /// Only the final component of the upload's name is kept.
    pub fn save(&self, upload: &ImageUpload) -> Result<PathBuf> {
        let name = Path::new(&upload.file_name)
            .file_name()
            .ok_or_else(|| {
                Error::InvalidArgument(format!("Invalid upload name '{}'", upload.file_name))
            })?;
        let path = self.dir.join(name);

        MediaType::from_path(&path)?;
        if upload.bytes.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "Upload '{}' is empty",
                upload.file_name
            )));
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, &upload.bytes)?;
        tracing::info!("Saved upload to {}", path.display());
        Ok(path)
    }
}

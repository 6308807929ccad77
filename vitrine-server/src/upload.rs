//! Media uploads: files land in the uploads directory under a
//! timestamp-random name and are served back at `/uploads/<name>`.

use std::path::PathBuf;

use rand::Rng;
use rand::distributions::Alphanumeric;
use vitrine_core::{UploadError, Uploader};

pub struct DiskUploader {
    dir: PathBuf,
}

impl DiskUploader {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// `<millis>-<rand6>.<ext>`, keeping the original extension so the
    /// static file server picks the right content type.
    fn storage_name(filename: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        let ext = filename.rsplit_once('.').map(|(_, e)| e).unwrap_or("bin");
        format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            suffix,
            ext
        )
    }
}

impl Uploader for DiskUploader {
    fn store(&self, filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
        std::fs::create_dir_all(&self.dir)?;
        let name = Self::storage_name(filename);
        std::fs::write(self.dir.join(&name), bytes)?;
        Ok(format!("/uploads/{name}"))
    }
}

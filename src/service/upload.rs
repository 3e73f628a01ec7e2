//! Upload validation and temporary staging

use super::config::ServiceConfig;
use super::ServiceError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// One uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as declared by the client
    pub filename: String,

    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Lowercase extension of the declared filename, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check the upload against the service rules; returns the extension
    pub fn validate(&self, config: &ServiceConfig) -> Result<String, ServiceError> {
        if self.filename.trim().is_empty() {
            return Err(ServiceError::InputValidation("No selected file".to_string()));
        }

        let extension = match self.extension() {
            Some(ext) if config.allows_extension(&ext) => ext,
            _ => {
                return Err(ServiceError::InputValidation(format!(
                    "Unsupported file type: {} (allowed: {})",
                    self.filename,
                    config.allowed_extensions.join(", ")
                )))
            }
        };

        if self.bytes.is_empty() {
            return Err(ServiceError::InputValidation("Uploaded file is empty".to_string()));
        }

        if self.byte_size() > config.max_upload_bytes {
            return Err(ServiceError::InputValidation(format!(
                "File too large ({} bytes, max {})",
                self.byte_size(),
                config.max_upload_bytes
            )));
        }

        Ok(extension)
    }
}

/// Upload bytes persisted to a uniquely named temp file
///
/// The file is removed when this value is dropped, whether or not the
/// analysis succeeded.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn stage(upload: &Upload, extension: &str, dir: Option<&Path>) -> std::io::Result<Self> {
        let suffix = format!(".{}", extension);
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(&suffix);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(&upload.bytes)?;
        file.flush()?;

        log::debug!("Staged {} bytes at {:?}", upload.bytes.len(), file.path());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> ServiceConfig {
        ServiceConfig::new()
    }

    #[test]
    fn accepts_known_extensions_any_case() {
        let upload = Upload::new("Track.MP3", vec![1, 2, 3]);
        assert_eq!(upload.validate(&config()).unwrap(), "mp3");
    }

    #[test]
    fn rejects_empty_filename() {
        let upload = Upload::new("", vec![1, 2, 3]);
        assert!(matches!(
            upload.validate(&config()),
            Err(ServiceError::InputValidation(_))
        ));
    }

    #[test]
    fn rejects_disallowed_and_missing_extensions() {
        for name in ["song.ogg", "song", "archive.tar.gz", ".mp3"] {
            let upload = Upload::new(name, vec![1, 2, 3]);
            assert!(
                matches!(upload.validate(&config()), Err(ServiceError::InputValidation(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_and_oversized_bodies() {
        assert!(Upload::new("a.wav", Vec::new()).validate(&config()).is_err());

        let small_limit = config().with_max_upload_bytes(2);
        assert!(Upload::new("a.wav", vec![0; 3]).validate(&small_limit).is_err());
    }

    #[test]
    fn staged_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let upload = Upload::new("clip.wav", vec![7; 16]);

        let staged = StagedUpload::stage(&upload, "wav", Some(dir.path())).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "wav");
        assert_eq!(std::fs::read(&path).unwrap(), vec![7; 16]);

        drop(staged);
        assert!(!path.exists());
    }
}

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create file `{file_name}`")]
    CreatingFailed {
        source: anyhow::Error,
        file_name: String,
    },

    #[error("failed to write to file `{file_name}`")]
    WritingFailed {
        source: anyhow::Error,
        file_name: String,
    },
}

/// Writes `bytes` to `path` exactly as given, truncating whatever was there.
/// The parent directory must already exist.
pub fn save_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = || path.display().to_string();

    let mut f = File::create(path).map_err(|e| Error::CreatingFailed {
        source: e.into(),
        file_name: file_name(),
    })?;

    f.write_all(bytes).map_err(|e| Error::WritingFailed {
        source: e.into(),
        file_name: file_name(),
    })?;

    Ok(())
}

use crate::eprintln_tagged;
use crate::imp::config::{ConfigFile, LOCAL_CONFIG_FILE};
use crate::imp::fs;
use crate::ExitStatus;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
#[clap(about = "Writes the default configuration so that it can be edited")]
pub struct InitConfig {
    #[clap(help = "Where to write the config; ./minify.json by default")]
    path: Option<PathBuf>,

    #[clap(short, long, help = "Overwrites an existing file")]
    force: bool,
}

pub type Result<T> = std::result::Result<T, Error>;

delegate_impl_error_error_kind! {
    #[error("failed to write the default config")]
    pub struct Error(ErrorKind);
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("`{name}` already exists; pass --force to overwrite it")]
    AlreadyExists { name: String },

    #[error("failed to serialize the default config")]
    SerializationFailed { source: anyhow::Error },

    #[error("failed to write `{name}`")]
    WritingFailed { source: anyhow::Error, name: String },
}

impl InitConfig {
    pub fn run(self, _quiet: bool) -> Result<ExitStatus> {
        let path = self
            .path
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
        write_default_config(&path, self.force)?;
        eprintln_tagged!("Created": "`{}`", path.display());

        Ok(ExitStatus::Success)
    }
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error(ErrorKind::AlreadyExists {
            name: path.display().to_string(),
        }));
    }

    let mut json = ConfigFile::default()
        .to_json()
        .map_err(|source| Error(ErrorKind::SerializationFailed { source }))?;
    json.push('\n');

    fs::save_artifact(path, json.as_bytes()).map_err(|e| {
        Error(ErrorKind::WritingFailed {
            source: e.into(),
            name: path.display().to_string(),
        })
    })
}

use crate::imp::config::{PipelineConfig, Source, Timeouts};
use crate::imp::fs;
use crate::imp::minify::{self, ErrorKind, MinifyResponse};
use reqwest::StatusCode;
use std::path::PathBuf;

/// What one successful pipeline left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub status: StatusCode,
    pub len: usize,
}

/// Runs one pipeline to completion: build the request, wait for the whole
/// response, then write it out.  Nothing is written unless a response body
/// was received, and with `strict` only a success status counts.
pub fn run_pipeline(
    pipeline: &PipelineConfig,
    timeouts: &Timeouts,
    strict: bool,
) -> minify::Result<Artifact> {
    let url = pipeline.endpoint_url();
    let response = request(pipeline, timeouts, &url)?;

    if strict && !response.is_success() {
        return Err(ErrorKind::RemoteProtocol {
            status: response.status,
            url,
        }
        .into());
    }

    fs::save_artifact(&pipeline.output, &response.body).map_err(|e| ErrorKind::LocalIo {
        source: e.into(),
        path: pipeline.output.display().to_string(),
    })?;

    Ok(Artifact {
        path: pipeline.output.clone(),
        status: response.status,
        len: response.body.len(),
    })
}

fn request(
    pipeline: &PipelineConfig,
    timeouts: &Timeouts,
    url: &str,
) -> minify::Result<MinifyResponse> {
    match &pipeline.source {
        Source::RemoteSources { urls, extra_params } => {
            minify::minify_remote_sources(timeouts, url, urls, extra_params)
        }
        Source::LocalText { path } => minify::minify_local_text(timeouts, url, path),
    }
}

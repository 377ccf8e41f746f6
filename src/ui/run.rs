use crate::imp::config::{ConfigFile, PipelineConfig};
use crate::imp::pipeline;
use crate::ui::print_macros;
use crate::ExitStatus;
use crate::{eprintln_error, eprintln_info, eprintln_tagged, eprintln_warning};
use itertools::Itertools as _;

#[derive(clap::Args)]
#[clap(about = "Runs the configured minification pipelines in order")]
pub struct Run {
    #[clap(help = "Names of the pipelines to run; all of them when omitted")]
    names: Vec<String>,

    #[clap(
        short,
        long,
        help = "Keeps running the remaining pipelines after one fails"
    )]
    keep_going: bool,

    #[clap(long, help = "Treats a non-success HTTP status as a failure")]
    strict: bool,
}

pub type Result<T> = std::result::Result<T, Error>;

delegate_impl_error_error_kind! {
    #[error("failed to run pipelines")]
    pub struct Error(ErrorKind);
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("unknown pipeline `{name}`; configured pipelines are: {known}")]
    UnknownPipeline { name: String, known: String },

    #[error("no pipelines are configured")]
    NoPipelines,

    #[error("pipeline `{name}` failed")]
    PipelineFailed { source: anyhow::Error, name: String },
}

impl Run {
    pub fn run(self, quiet: bool, config: &ConfigFile) -> Result<ExitStatus> {
        let selected = select_pipelines(&config.pipelines, &self.names)?;
        let timeouts = config.general.timeouts();

        let mut failed = Vec::new();
        for pipeline in &selected {
            eprintln_tagged!(
                "Minifying": "{} ({}) at {}",
                pipeline.name,
                pipeline.source.describe(),
                pipeline.endpoint_url()
            );

            let artifact = match pipeline::run_pipeline(pipeline, &timeouts, self.strict) {
                Ok(artifact) => artifact,
                Err(e) if self.keep_going => {
                    eprintln_error!("pipeline `{}`: {}: {}", pipeline.name, e, e.kind());
                    print_macros::print_causes(quiet, e.kind());
                    failed.push(pipeline.name.as_str());
                    continue;
                }
                Err(e) => {
                    return Err(Error(ErrorKind::PipelineFailed {
                        source: e.into(),
                        name: pipeline.name.clone(),
                    }))
                }
            };

            if !artifact.status.is_success() {
                eprintln_warning!(
                    "the service answered with HTTP {}; the body was saved as is",
                    artifact.status
                );
            }
            eprintln_tagged!(
                "Saved": "{} bytes to `{}`",
                artifact.len,
                artifact.path.display()
            );
            if !quiet {
                eprintln_info!("HTTP status: {}", artifact.status);
            }
        }

        if !failed.is_empty() {
            eprintln_warning!(
                "{} of {} pipeline(s) failed: {}",
                failed.len(),
                selected.len(),
                failed.iter().join(", ")
            );
            return Ok(ExitStatus::Failure);
        }

        eprintln_tagged!("Finished": "{} pipeline(s)", selected.len());
        Ok(ExitStatus::Success)
    }
}

/// Picks the pipelines named in `names`, keeping the configured order.  An
/// empty `names` selects everything.
fn select_pipelines<'a>(
    pipelines: &'a [PipelineConfig],
    names: &[String],
) -> Result<Vec<&'a PipelineConfig>> {
    if pipelines.is_empty() {
        return Err(Error(ErrorKind::NoPipelines));
    }

    if let Some(unknown) = names
        .iter()
        .find(|name| pipelines.iter().all(|p| &p.name != *name))
    {
        return Err(Error(ErrorKind::UnknownPipeline {
            name: unknown.clone(),
            known: pipelines.iter().map(|p| p.name.as_str()).join(", "),
        }));
    }

    Ok(pipelines
        .iter()
        .filter(|p| names.is_empty() || names.contains(&p.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imp::config::{General, Scheme, Service, Source};
    use crate::imp::minify;
    use crate::imp::mock_server::{self, MockServer};
    use std::fs;
    use std::path::Path;
    use tempdir::TempDir;

    fn js_pipeline(name: &str, host: String, output: &Path) -> PipelineConfig {
        PipelineConfig {
            name: name.to_string(),
            service: Service {
                scheme: Some(Scheme::Http),
                host,
                path: None,
            },
            source: Source::RemoteSources {
                urls: vec!["https://host/a.js".to_string()],
                extra_params: Source::default_extra_params(),
            },
            output: output.to_path_buf(),
        }
    }

    fn config(pipelines: Vec<PipelineConfig>) -> ConfigFile {
        ConfigFile {
            general: General {
                timeout_milliseconds: 10_000,
                connect_timeout_milliseconds: 5_000,
            },
            pipelines,
        }
    }

    fn run_cmd(keep_going: bool, strict: bool) -> Run {
        Run {
            names: Vec::new(),
            keep_going,
            strict,
        }
    }

    #[test]
    fn first_failure_stops_the_run() {
        let dir = TempDir::new("run").unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        // never contacted; the server thread is left waiting
        let later = MockServer::start(|_| (200, b"ok".to_vec()));
        let config = config(vec![
            js_pipeline("a", mock_server::unused_host(), &a),
            js_pipeline("b", later.host(), &b),
        ]);

        let err = run_cmd(false, false).run(true, &config).unwrap_err();

        match err.kind() {
            ErrorKind::PipelineFailed { name, .. } => assert_eq!(name, "a"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn keep_going_runs_the_rest_and_fails() {
        let dir = TempDir::new("run").unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        let server = MockServer::start(|_| (200, b"ok".to_vec()));
        let config = config(vec![
            js_pipeline("a", mock_server::unused_host(), &a),
            js_pipeline("b", server.host(), &b),
        ]);

        let status = run_cmd(true, false).run(true, &config).unwrap();
        server.finish();

        assert_eq!(status, ExitStatus::Failure);
        assert!(!a.exists());
        assert_eq!(fs::read_to_string(&b).unwrap(), "ok");
    }

    #[test]
    fn earlier_artifacts_survive_a_later_failure() {
        let dir = TempDir::new("run").unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        let server = MockServer::start(|_| (200, b"console.log(1);".to_vec()));
        let config = config(vec![
            js_pipeline("a", server.host(), &a),
            js_pipeline("b", mock_server::unused_host(), &b),
        ]);

        let err = run_cmd(false, false).run(true, &config).unwrap_err();
        server.finish();

        assert!(matches!(err.kind(), ErrorKind::PipelineFailed { name, .. } if name == "b"));
        assert_eq!(fs::read_to_string(&a).unwrap(), "console.log(1);");
        assert!(!b.exists());
    }

    #[test]
    fn strict_stops_on_error_status() {
        let dir = TempDir::new("run").unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        let server = MockServer::start(|_| (400, b"Error(13): no input".to_vec()));
        let later = MockServer::start(|_| (200, b"ok".to_vec()));
        let config = config(vec![
            js_pipeline("a", server.host(), &a),
            js_pipeline("b", later.host(), &b),
        ]);

        let err = run_cmd(false, true).run(true, &config).unwrap_err();
        server.finish();

        match err.kind() {
            ErrorKind::PipelineFailed { name, source } => {
                assert_eq!(name, "a");
                let cause = source
                    .downcast_ref::<minify::Error>()
                    .expect("cause is a minify error");
                assert!(matches!(
                    cause.kind(),
                    minify::ErrorKind::RemoteProtocol { .. }
                ));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn all_pipelines_succeeding_is_success() {
        let dir = TempDir::new("run").unwrap();
        let a = dir.path().join("a.js");
        let server = MockServer::start(|_| (200, b"x".to_vec()));
        let config = config(vec![js_pipeline("a", server.host(), &a)]);

        let status = run_cmd(false, false).run(true, &config).unwrap();
        server.finish();

        assert_eq!(status, ExitStatus::Success);
        assert_eq!(fs::read_to_string(&a).unwrap(), "x");
    }

    fn names(selected: &[&PipelineConfig]) -> Vec<String> {
        selected.iter().map(|p| p.name.clone()).collect()
    }

    fn args(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn selects_everything_by_default() {
        let pipelines = ConfigFile::default_pipelines();
        let selected = select_pipelines(&pipelines, &[]).unwrap();
        assert_eq!(names(&selected), ["js", "css"]);
    }

    #[test]
    fn keeps_configured_order() {
        let pipelines = ConfigFile::default_pipelines();
        let selected = select_pipelines(&pipelines, &args(&["css", "js", "css"])).unwrap();
        assert_eq!(names(&selected), ["js", "css"]);
    }

    #[test]
    fn selects_a_single_pipeline() {
        let pipelines = ConfigFile::default_pipelines();
        let selected = select_pipelines(&pipelines, &args(&["css"])).unwrap();
        assert_eq!(names(&selected), ["css"]);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let pipelines = ConfigFile::default_pipelines();
        let err = select_pipelines(&pipelines, &args(&["js", "sass"])).unwrap_err();
        match err.kind() {
            ErrorKind::UnknownPipeline { name, known } => {
                assert_eq!(name, "sass");
                assert_eq!(known, "js, css");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = select_pipelines(&[], &[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NoPipelines));
    }
}

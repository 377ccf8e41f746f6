use anyhow::{bail, ensure, Context, Result};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "minify.json";

const DUMBCHESS_JS_BASE: &str =
    "https://raw.githubusercontent.com/Guillaume-Mayer/dumbchess-client/master/js/";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub general: General,
    #[serde(default = "ConfigFile::default_pipelines")]
    pub pipelines: Vec<PipelineConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct General {
    #[serde(default = "General::default_timeout_milliseconds")]
    pub timeout_milliseconds: u64,
    #[serde(default = "General::default_connect_timeout_milliseconds")]
    pub connect_timeout_milliseconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub total: Duration,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub name: String,
    pub service: Service,
    pub source: Source,
    pub output: PathBuf,
}

/// Where a pipeline's request goes.  Scheme and path default to what the
/// source kind expects (`http` + `/compile` for the compiler, `https` +
/// `/raw` for the CSS minifier).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "https")]
    Https,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Source {
    /// Source files the compiler service downloads by itself.
    #[serde(rename = "remote_sources")]
    RemoteSources {
        urls: Vec<String>,
        #[serde(default = "Source::default_extra_params")]
        extra_params: IndexMap<String, String>,
    },

    /// A local text file whose content is posted as is.
    #[serde(rename = "local_text")]
    LocalText { path: PathBuf },
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

impl ConfigFile {
    /// Loads the config: the explicitly given file, `./minify.json`, the file
    /// in the user config directory, or the built-in defaults, in that order.
    pub fn get_config(explicit: Option<&Path>) -> Result<ConfigFile> {
        if let Some(path) = explicit {
            return ConfigFile::from_path(path);
        }

        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(config_dir().map(|dir| dir.join("config.json")));
        for path in candidates {
            if path.is_file() {
                return ConfigFile::from_path(&path);
            }
        }

        Ok(ConfigFile::default())
    }

    pub fn from_path(path: &Path) -> Result<ConfigFile> {
        let mut text = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut text))
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;

        ConfigFile::from_json(&text)
            .with_context(|| format!("error in config file `{}`", path.display()))
    }

    pub fn from_json(text: &str) -> Result<ConfigFile> {
        let config: ConfigFile = serde_json::from_str(text).context("malformed json")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize config")
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.general.timeout_milliseconds > 0,
            "general.timeout_milliseconds must be greater than 0"
        );
        ensure!(
            self.general.connect_timeout_milliseconds > 0,
            "general.connect_timeout_milliseconds must be greater than 0"
        );

        let mut seen = HashSet::new();
        for pipeline in &self.pipelines {
            ensure!(!pipeline.name.is_empty(), "pipeline name must not be empty");
            if !seen.insert(pipeline.name.as_str()) {
                bail!("pipeline `{}` is defined more than once", pipeline.name);
            }
            ensure!(
                !pipeline.service.host.is_empty(),
                "pipeline `{}` has an empty service host",
                pipeline.name
            );
            if let Source::RemoteSources { urls, .. } = &pipeline.source {
                ensure!(
                    !urls.is_empty(),
                    "pipeline `{}` lists no source urls",
                    pipeline.name
                );
            }
        }

        Ok(())
    }

    pub fn default_pipelines() -> Vec<PipelineConfig> {
        let js_urls = ["dumb-const.js", "dumb-chess.js", "dumb-client.js", "dumb-main.js"]
            .iter()
            .map(|file| format!("{}{}", DUMBCHESS_JS_BASE, file))
            .collect();

        vec![
            PipelineConfig {
                name: "js".to_string(),
                service: Service::with_host("closure-compiler.appspot.com"),
                source: Source::RemoteSources {
                    urls: js_urls,
                    extra_params: Source::default_extra_params(),
                },
                output: PathBuf::from("minified/dumb.js"),
            },
            PipelineConfig {
                name: "css".to_string(),
                service: Service::with_host("cssminifier.com"),
                source: Source::LocalText {
                    path: PathBuf::from("css/chess.css"),
                },
                output: PathBuf::from("minified/dumb.css"),
            },
        ]
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            general: General::default(),
            pipelines: ConfigFile::default_pipelines(),
        }
    }
}

impl Default for General {
    fn default() -> Self {
        General {
            timeout_milliseconds: General::default_timeout_milliseconds(),
            connect_timeout_milliseconds: General::default_connect_timeout_milliseconds(),
        }
    }
}

impl General {
    pub fn default_timeout_milliseconds() -> u64 {
        60_000
    }

    pub fn default_connect_timeout_milliseconds() -> u64 {
        10_000
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_milliseconds),
            total: Duration::from_millis(self.timeout_milliseconds),
        }
    }
}

impl PipelineConfig {
    pub fn endpoint_url(&self) -> String {
        let scheme = self
            .service
            .scheme
            .unwrap_or_else(|| self.source.default_scheme());
        let path = self
            .service
            .path
            .as_deref()
            .unwrap_or_else(|| self.source.default_path());
        let slash = if path.starts_with('/') { "" } else { "/" };

        format!("{}://{}{}{}", scheme, self.service.host, slash, path)
    }
}

impl Service {
    pub fn with_host(host: &str) -> Service {
        Service {
            scheme: None,
            host: host.to_string(),
            path: None,
        }
    }
}

impl Source {
    pub fn default_extra_params() -> IndexMap<String, String> {
        [
            ("compilation_level", "ADVANCED_OPTIMIZATIONS"),
            ("output_format", "text"),
            ("output_info", "compiled_code"),
        ]
        .iter()
        .map(|&(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn default_scheme(&self) -> Scheme {
        match self {
            Source::RemoteSources { .. } => Scheme::Http,
            Source::LocalText { .. } => Scheme::Https,
        }
    }

    pub fn default_path(&self) -> &'static str {
        match self {
            Source::RemoteSources { .. } => "/compile",
            Source::LocalText { .. } => "/raw",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::RemoteSources { urls, .. } => format!("{} remote source(s)", urls.len()),
            Source::LocalText { path } => format!("`{}`", path.display()),
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("minify-assets"))
}

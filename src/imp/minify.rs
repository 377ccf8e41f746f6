use crate::eprintln_debug;
use crate::imp::config::Timeouts;
use crate::imp::form::{self, FormBody};
use indexmap::IndexMap;
use reqwest::blocking::Client;
use reqwest::header;
use reqwest::StatusCode;
use std::fs;
use std::path::Path;

/// Repeated once per source file; the compiler concatenates them in order.
pub const CODE_URL_KEY: &str = "code_url";

/// Carries the whole CSS text.
pub const INPUT_KEY: &str = "input";

pub type Result<T> = std::result::Result<T, Error>;

delegate_impl_error_error_kind! {
    #[error("failed to minify")]
    pub struct Error(ErrorKind);
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("the service at `{url}` is unavailable")]
    RemoteUnavailable { source: anyhow::Error, url: String },

    #[error("the service at `{url}` answered with HTTP {status}")]
    RemoteProtocol { status: StatusCode, url: String },

    #[error("local file `{path}` could not be accessed")]
    LocalIo { source: anyhow::Error, path: String },

    #[error("invalid service endpoint `{url}`")]
    InvalidEndpoint { source: anyhow::Error, url: String },

    #[error("no source urls to compile")]
    NoSourceUrls,
}

/// Whatever the service sent back.  The body is never inspected; success
/// output and error payloads look the same here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl MinifyResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Asks the compiler service at `url` to fetch `source_urls` and compile them
/// into a single output.
pub fn minify_remote_sources(
    timeouts: &Timeouts,
    url: &str,
    source_urls: &[String],
    extra_params: &IndexMap<String, String>,
) -> Result<MinifyResponse> {
    let body = remote_sources_form(source_urls, extra_params)?;
    post_form(timeouts, url, &body)
}

/// Sends the content of the local file at `path` to the minifier at `url`.
pub fn minify_local_text(timeouts: &Timeouts, url: &str, path: &Path) -> Result<MinifyResponse> {
    let text = fs::read_to_string(path).map_err(|e| ErrorKind::LocalIo {
        source: e.into(),
        path: path.display().to_string(),
    })?;
    post_form(timeouts, url, &local_text_form(text))
}

pub fn remote_sources_form(
    source_urls: &[String],
    extra_params: &IndexMap<String, String>,
) -> Result<FormBody> {
    if source_urls.is_empty() {
        return Err(Error(ErrorKind::NoSourceUrls));
    }

    let mut form = FormBody::new();
    for url in source_urls {
        form.push(CODE_URL_KEY, url.as_str());
    }
    for (key, value) in extra_params {
        form.push(key.as_str(), value.as_str());
    }

    Ok(form)
}

pub fn local_text_form(text: String) -> FormBody {
    let mut form = FormBody::new();
    form.push(INPUT_KEY, text);
    form
}

fn make_client(timeouts: &Timeouts) -> reqwest::Result<Client> {
    // a fresh client per request, with no idle connections kept around
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.total)
        .pool_max_idle_per_host(0)
        .build()
}

fn post_form(timeouts: &Timeouts, url: &str, form: &FormBody) -> Result<MinifyResponse> {
    let unavailable = |e: reqwest::Error| ErrorKind::RemoteUnavailable {
        source: e.into(),
        url: url.to_string(),
    };

    let parsed = reqwest::Url::parse(url).map_err(|e| ErrorKind::InvalidEndpoint {
        source: e.into(),
        url: url.to_string(),
    })?;

    let client = make_client(timeouts).map_err(unavailable)?;
    let body = form.encode();
    eprintln_debug!(
        "POST {} ({} field(s), {} bytes)",
        url,
        form.pairs().len(),
        body.len()
    );

    let res = client
        .post(parsed)
        .header(header::CONTENT_TYPE, form::CONTENT_TYPE)
        .header(header::CONNECTION, "close")
        .body(body)
        .send()
        .map_err(unavailable)?;

    let status = res.status();
    let body = res.bytes().map_err(unavailable)?.to_vec();
    eprintln_debug!("response: {} ({} bytes)", status, body.len());

    Ok(MinifyResponse { status, body })
}

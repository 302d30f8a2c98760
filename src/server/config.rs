use std::{fmt, time::Duration};

use buildstructor::buildstructor;
use camino::Utf8PathBuf;
use derive_getters::Getters;
use explorer_gemini::{DEFAULT_MODEL, GEMINI_ENDPOINT};
use explorer_graphql::NERDGRAPH_ENDPOINT;
use url::Url;

/// Name of the UI file looked up in the working directory
pub const DEFAULT_HTML_FILE: &str = "log_explorer.html";

/// How long a NerdGraph call may take
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a Gemini call may take
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything the handlers need to know, resolved once at startup
#[derive(Clone, Getters)]
pub struct ProxyConfig {
    html_file: Option<Utf8PathBuf>,
    nerdgraph_url: Url,
    gemini_url: Url,
    gemini_model: String,
    gemini_api_key: Option<String>,
    upstream_timeout: Duration,
    ai_timeout: Duration,
}

#[buildstructor]
impl ProxyConfig {
    /// Anything left out falls back to the public endpoints and default timeouts.
    /// An empty Gemini key counts as no key.
    #[builder]
    pub fn new(
        html_file: Option<Utf8PathBuf>,
        nerdgraph_url: Option<Url>,
        gemini_url: Option<Url>,
        gemini_model: Option<String>,
        gemini_api_key: Option<String>,
        upstream_timeout: Option<Duration>,
        ai_timeout: Option<Duration>,
    ) -> Result<ProxyConfig, url::ParseError> {
        let nerdgraph_url = match nerdgraph_url {
            Some(url) => url,
            None => Url::parse(NERDGRAPH_ENDPOINT)?,
        };
        let gemini_url = match gemini_url {
            Some(url) => url,
            None => Url::parse(GEMINI_ENDPOINT)?,
        };
        Ok(ProxyConfig {
            html_file,
            nerdgraph_url,
            gemini_url,
            gemini_model: gemini_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_key: gemini_api_key.filter(|key| !key.is_empty()),
            upstream_timeout: upstream_timeout.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT),
            ai_timeout: ai_timeout.unwrap_or(DEFAULT_AI_TIMEOUT),
        })
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("html_file", &self.html_file)
            .field("nerdgraph_url", &self.nerdgraph_url.as_str())
            .field("gemini_url", &self.gemini_url.as_str())
            .field("gemini_model", &self.gemini_model)
            .field(
                "gemini_api_key",
                &self
                    .gemini_api_key
                    .as_deref()
                    .map(crate::utils::env::mask_key),
            )
            .field("upstream_timeout", &self.upstream_timeout)
            .field("ai_timeout", &self.ai_timeout)
            .finish()
    }
}

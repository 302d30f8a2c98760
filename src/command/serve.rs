use std::{env, net::IpAddr, time::Duration};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use explorer_gemini::{DEFAULT_MODEL, GEMINI_ENDPOINT};
use explorer_graphql::NERDGRAPH_ENDPOINT;
use tokio::net::TcpListener;
use url::Url;

use crate::{
    Result,
    server::{self, AppState, ProxyConfig, config::DEFAULT_HTML_FILE, static_asset},
    utils::env::{ExplorerEnv, ExplorerEnvKey},
};

#[derive(Debug, Clone, Args)]
pub struct Serve {
    /// Address to listen on
    #[arg(long, env = "LOG_EXPLORER_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "LOG_EXPLORER_PORT", default_value_t = 5002)]
    port: u16,

    /// File name (or glob) of the UI page, looked up in the working directory
    #[arg(long, env = "LOG_EXPLORER_HTML_FILE", default_value = DEFAULT_HTML_FILE)]
    html_file: String,

    /// NerdGraph endpoint that `/query` and `/account-name` forward to
    #[arg(long, env = "LOG_EXPLORER_NERDGRAPH_URL", default_value = NERDGRAPH_ENDPOINT)]
    nerdgraph_url: Url,

    /// Base URL of the Gemini API
    #[arg(long, env = "LOG_EXPLORER_GEMINI_URL", default_value = GEMINI_ENDPOINT)]
    gemini_url: Url,

    /// Gemini model used for insights
    #[arg(long, env = "LOG_EXPLORER_GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    gemini_model: String,

    /// How long to wait for NerdGraph, e.g. `60s` or `2m`
    #[arg(
        long,
        env = "LOG_EXPLORER_UPSTREAM_TIMEOUT",
        default_value = "60s",
        value_parser = humantime::parse_duration
    )]
    upstream_timeout: Duration,

    /// How long to wait for Gemini
    #[arg(
        long,
        env = "LOG_EXPLORER_AI_TIMEOUT",
        default_value = "120s",
        value_parser = humantime::parse_duration
    )]
    ai_timeout: Duration,
}

impl Serve {
    /// Resolves everything the handlers need, once
    pub fn resolve_config(
        &self,
        env_store: &ExplorerEnv,
        working_dir: &Utf8Path,
    ) -> Result<ProxyConfig> {
        let html_file = static_asset::find_html_file(working_dir, &self.html_file)?;
        let gemini_api_key = env_store.get(ExplorerEnvKey::GeminiApiKey)?;
        let config = ProxyConfig::builder()
            .and_html_file(html_file)
            .nerdgraph_url(self.nerdgraph_url.clone())
            .gemini_url(self.gemini_url.clone())
            .gemini_model(self.gemini_model.clone())
            .and_gemini_api_key(gemini_api_key)
            .upstream_timeout(self.upstream_timeout)
            .ai_timeout(self.ai_timeout)
            .build()?;
        tracing::debug!(?config);
        Ok(config)
    }

    pub async fn run(&self, env_store: &ExplorerEnv) -> Result<()> {
        let working_dir = Utf8PathBuf::try_from(env::current_dir()?)
            .context("The working directory is not valid UTF-8")?;
        let config = self.resolve_config(env_store, &working_dir)?;
        if config.gemini_api_key().is_none() {
            tracing::warn!(
                "{} is not set; /gemini-insights will answer 412 until it is",
                ExplorerEnvKey::GeminiApiKey
            );
        }

        let state = AppState::new(config).context("Could not build the HTTP client")?;
        let listener = TcpListener::bind((self.host, self.port))
            .await
            .with_context(|| format!("Could not listen on {}:{}", self.host, self.port))?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);

        server::serve(listener, state).await?;
        Ok(())
    }
}

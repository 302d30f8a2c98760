//! Locates and serves the single-page UI

use axum::response::{Html, IntoResponse};
use camino::{Utf8Path, Utf8PathBuf};
use globwalk::{FileType, GlobWalkerBuilder};
use http::StatusCode;

/// Served at `/` when no UI file was found at startup
pub const MISSING_PAGE: &str = "<h1>Error: log_explorer.html not found</h1>";

#[derive(thiserror::Error, Debug)]
pub enum StaticAssetError {
    #[error("\"{0}\" must name a file in the working directory, not a path")]
    NotAFileName(String),

    #[error("Could not search for \"{pattern}\": {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globwalk::GlobError,
    },
}

/// Looks for a file matching `pattern` directly inside `dir`; subdirectories are never searched.
///
/// When several files match, the first one in lexical order wins. Symlinks to files count as files.
pub fn find_html_file(
    dir: &Utf8Path,
    pattern: &str,
) -> Result<Option<Utf8PathBuf>, StaticAssetError> {
    if pattern.is_empty() || pattern.contains(['/', '\\']) || pattern.contains("..") {
        return Err(StaticAssetError::NotAFileName(pattern.to_string()));
    }

    let walker = GlobWalkerBuilder::from_patterns(dir, &[pattern])
        .max_depth(1)
        .follow_links(true)
        .file_type(FileType::FILE)
        .build()
        .map_err(|source| StaticAssetError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;

    let mut matches: Vec<Utf8PathBuf> = walker
        .filter_map(Result::ok)
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .collect();
    matches.sort();

    match matches.into_iter().next() {
        Some(found) => {
            tracing::info!("Found HTML file: {found}");
            Ok(Some(found))
        }
        None => {
            tracing::error!("ERROR: '{pattern}' not found in {dir}");
            Ok(None)
        }
    }
}

pub(crate) async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(MISSING_PAGE))
}

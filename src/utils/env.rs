use std::collections::HashMap;
use std::{env, fmt, io};

/// Reads the environment variables that are not command line flags.
/// Under `cfg(test)` it reads from an in-memory store instead, so tests can
/// run in parallel and never see the developer's real keys.
#[derive(Debug, Clone)]
pub struct ExplorerEnv {
    mock_store: Option<HashMap<String, String>>,
}

impl Default for ExplorerEnv {
    fn default() -> ExplorerEnv {
        ExplorerEnv::new()
    }
}

impl ExplorerEnv {
    /// creates a new environment variable store
    pub fn new() -> ExplorerEnv {
        let mock_store = if cfg!(test) {
            Some(HashMap::new())
        } else {
            None
        };

        ExplorerEnv { mock_store }
    }

    /// returns the value of the environment variable if it exists
    pub fn get(&self, key: ExplorerEnvKey) -> io::Result<Option<String>> {
        let key_str = key.to_string();
        tracing::trace!("Checking for ${}", &key_str);
        let result = match &self.mock_store {
            Some(mock_store) => Ok(mock_store.get(&key_str).map(|v| v.to_owned())),
            None => match env::var(&key_str) {
                Ok(data) => Ok(Some(data)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(env::VarError::NotUnicode(_)) => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "The value of the environment variable \"{}\" is not valid Unicode.",
                        &key_str
                    ),
                )),
            },
        }?;

        if let Some(result) = &result {
            tracing::debug!("read {}", self.get_debug_value(key, result));
        } else {
            tracing::trace!("could not find ${}", &key_str);
        }

        Ok(result)
    }

    fn get_debug_value(&self, key: ExplorerEnvKey, value: &str) -> String {
        let value = if key.is_secret() {
            mask_key(value)
        } else {
            value.to_string()
        };

        format!("environment variable ${} = {}", key, value)
    }

    /// sets a variable in the mock store
    #[cfg(test)]
    pub fn insert(&mut self, key: ExplorerEnvKey, value: &str) {
        tracing::debug!("writing {}", self.get_debug_value(key, value));
        if let Some(mock_store) = &mut self.mock_store {
            mock_store.insert(key.to_string(), value.into());
        }
    }
}

/// Keeps the first four characters of a secret and stars out the rest
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    let hidden = key.chars().count().saturating_sub(4);
    format!("{}{}", visible, "*".repeat(hidden))
}

/// ExplorerEnvKey defines the environment variables read outside of the
/// command line parser. Anything secret lives here so it never shows up
/// in `--help` output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExplorerEnvKey {
    GeminiApiKey,
}

impl ExplorerEnvKey {
    const fn is_secret(self) -> bool {
        matches!(self, ExplorerEnvKey::GeminiApiKey)
    }
}

impl fmt::Display for ExplorerEnvKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExplorerEnvKey::GeminiApiKey => fmt.write_str("GEMINI_API_KEY"),
        }
    }
}

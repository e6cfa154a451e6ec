use crate::{commands::EndpointArgs, error::CliError};
use connectors::solr::settings::SolrSettings;
use std::{collections::HashMap, fs, path::Path, time::Duration};

pub const SOLR_URL: &str = "SOLR_URL";
pub const SOLR_SELECT_PATH: &str = "SOLR_SELECT_PATH";
pub const SOLR_UPDATE_PATH: &str = "SOLR_UPDATE_PATH";
pub const SOLR_TIMEOUT_SECS: &str = "SOLR_TIMEOUT_SECS";

/// Environment variable manager that loads from the process and `.env` files.
///
/// Values from a loaded file override the process environment.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Builds connection settings, preferring explicit flags over the environment.
    pub fn solr_settings(
        &self,
        url: Option<&str>,
        endpoint: &EndpointArgs,
    ) -> Result<SolrSettings, CliError> {
        let url = url.or_else(|| self.get(SOLR_URL)).ok_or_else(|| {
            CliError::Config(format!("No collection URL given; pass --url or set {SOLR_URL}"))
        })?;
        let mut settings = SolrSettings::new(url);

        if let Some(path) = endpoint.select_path.as_deref().or(self.get(SOLR_SELECT_PATH)) {
            settings = settings.with_select_path(path);
        }
        if let Some(path) = endpoint.update_path.as_deref().or(self.get(SOLR_UPDATE_PATH)) {
            settings = settings.with_update_path(path);
        }

        let timeout = match endpoint.timeout_secs {
            Some(secs) => Some(secs),
            None => self
                .get(SOLR_TIMEOUT_SECS)
                .map(|raw| {
                    raw.parse::<u64>().map_err(|_| {
                        CliError::Config(format!(
                            "{SOLR_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                        ))
                    })
                })
                .transpose()?,
        };
        if let Some(secs) = timeout {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }

        Ok(settings)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim().trim_start_matches("export ").trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

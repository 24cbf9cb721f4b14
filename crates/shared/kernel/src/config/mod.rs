use config::{Config, Environment, File, Map};
use docfill_domain::constants::ENV_PREFIX;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file stem, resolved against the working directory.
const DEFAULT_CONFIG_PATH: &str = "server";

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: &[&str] = &["batch.excluded_columns"];

#[docfill_derive::docfill_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration by layering a file and `DOCFILL__*` environment overrides.
///
/// 1. **File**: `path` when given (must exist), otherwise `server.{toml,json,yaml}` in the
///    working directory if present. Without any file every value falls back to its default.
/// 2. **Environment**: variables prefixed with `DOCFILL__`; nested keys use double
///    underscores (`DOCFILL__BATCH__MAX_DOCUMENTS=50` maps to `batch.max_documents`).
///    `DOCFILL__BATCH__EXCLUDED_COLUMNS` is split on commas.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing or unreadable, or if the
/// merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use docfill_kernel::config::load_config;
/// use docfill_kernel::domain::config::ApiConfig;
///
/// let cfg: ApiConfig = load_config(None::<&str>).unwrap_or_default();
/// assert!(cfg.batch.max_documents > 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, None)
}

fn load_layered<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .source(env);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }

    let builder = Config::builder()
        .add_source(File::from(file_path.as_path()).required(required))
        .add_source(environment);

    info!(path = %file_path.display(), required, "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_domain::config::{ApiConfig, ReplaceScope};
    use std::fs;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect())
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("server.toml");
        fs::write(
            &path,
            "[server]\nport = 8081\n\n[batch]\nmax_documents = 5\nscope = \"all\"\n",
        )
        .expect("write config");

        let cfg: ApiConfig = load_layered(Some(&path), env(&[])).expect("config loads");
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.batch.max_documents, 5);
        assert_eq!(cfg.batch.scope, ReplaceScope::All);
        assert_eq!(cfg.batch.base_name, "document");
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("server.toml");
        fs::write(&path, "[server]\nport = 8081\n").expect("write config");

        let cfg: ApiConfig = load_layered(
            Some(&path),
            env(&[
                ("DOCFILL__SERVER__PORT", "9090"),
                ("DOCFILL__BATCH__BASE_NAME", "Cover Letter"),
                ("DOCFILL__BATCH__EXCLUDED_COLUMNS", "date,company"),
            ]),
        )
        .expect("config loads");

        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.batch.base_name, "Cover Letter");
        assert_eq!(cfg.batch.excluded_columns, vec!["date".to_owned(), "company".to_owned()]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result: Result<ApiConfig, _> =
            load_layered(Some(dir.path().join("absent.toml")), env(&[]));
        assert!(matches!(result, Err(ConfigError::Config { context: Some(_), .. })));
    }

    #[test]
    fn malformed_value_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("server.toml");
        fs::write(&path, "[server]\nport = \"not-a-port\"\n").expect("write config");

        let result: Result<ApiConfig, _> = load_layered(Some(&path), env(&[]));
        assert!(result.is_err());
    }
}

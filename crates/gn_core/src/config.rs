//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::enrich::EnrichPolicy;
use crate::{Error, Result};

const DEFAULT_QUERY: &str = "warm heart positive news about good people, good behavior, please provide detail individual story";
const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Reads a required value, rejecting empty values and `YOUR_...` placeholders.
pub fn ensure_env(var_name: &str, friendly_name: &str) -> Result<String> {
    match env::var(var_name) {
        Ok(value) if !value.is_empty() && !value.starts_with("YOUR_") => Ok(value),
        _ => Err(Error::Configuration(format!(
            "Missing {}. Set the {} environment variable or .env entry.",
            friendly_name, var_name
        ))),
    }
}

fn env_or(var_name: &str, default: &str) -> String {
    env::var(var_name).unwrap_or_else(|_| default.to_string())
}

fn env_path(var_name: &str) -> Option<PathBuf> {
    env::var(var_name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: FromStr>(var_name: &str, default: T) -> Result<T> {
    match env::var(var_name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} must be a whole number, got {:?}", var_name, raw))
        }),
        Err(_) => Ok(default),
    }
}

/// Substitutes `{dir}` in `template` and splits the result with shell quoting rules.
pub fn resolve_server_args(template: &str, server_dir: Option<&PathBuf>) -> Result<Vec<String>> {
    let dir = server_dir
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    let formatted = template.replace("{dir}", &dir);
    shlex::split(&formatted).ok_or_else(|| {
        Error::Configuration(format!("Unbalanced quotes in server arguments: {}", formatted))
    })
}

/// Resolves an IANA zone name, falling back to UTC for unknown names.
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown time zone {:?}, using UTC", name);
        Tz::UTC
    })
}

/// Current wall-clock time in `tz`.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// How to launch an external tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ServerCommand {
    fn from_env(name: &str, prefix: &str, default_args: &str) -> Result<Self> {
        let working_dir = env_path(&format!("{}_DIR", prefix));
        let template = env_or(&format!("{}_ARGS", prefix), default_args);
        Ok(Self {
            name: name.to_string(),
            command: env_or(&format!("{}_CMD", prefix), "uvx"),
            args: resolve_server_args(&template, working_dir.as_ref())?,
            working_dir,
        })
    }

    /// True when there is something to launch.
    pub fn is_runnable(&self) -> bool {
        !self.command.is_empty() && !self.args.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GoodNewsConfig {
    pub query: String,
    pub timezone: String,
    pub output_dir: PathBuf,
    pub model: String,
    pub search_server: ServerCommand,
    pub search_max_results: usize,
    pub fetch_server: ServerCommand,
    pub fetch_max_chars: usize,
    pub fetch_article_limit: usize,
}

impl GoodNewsConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            query: env_or("GOOD_NEWS_QUERY", DEFAULT_QUERY),
            timezone: env_or("GOOD_NEWS_TIMEZONE", DEFAULT_TIMEZONE),
            output_dir: env_path("GOOD_NEWS_OUTPUT_DIR")
                .unwrap_or_else(|| PathBuf::from("daily").join("good-news")),
            model: env_or("GOOD_NEWS_MODEL", "gpt-4o-mini"),
            search_server: ServerCommand::from_env("search", "DDG_MCP", "duckduckgo-mcp-server")?,
            search_max_results: env_parse("DDG_MCP_MAX_RESULTS", 10)?,
            fetch_server: ServerCommand::from_env("fetch", "FETCH_MCP", "mcp-server-fetch")?,
            fetch_max_chars: env_parse("FETCH_MCP_MAX_LENGTH", 4000)?,
            fetch_article_limit: env_parse("FETCH_MCP_ARTICLE_LIMIT", 3)?,
        })
    }

    pub fn tz(&self) -> Tz {
        resolve_timezone(&self.timezone)
    }

    pub fn enrich_policy(&self) -> EnrichPolicy {
        EnrichPolicy {
            max_length: self.fetch_max_chars,
            url_limit: self.fetch_article_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DevotionalConfig {
    pub timezone: String,
    pub output_dir: PathBuf,
    pub model: String,
}

impl DevotionalConfig {
    pub fn from_env() -> Self {
        Self {
            timezone: env_or("DEVOTIONAL_TIMEZONE", DEFAULT_TIMEZONE),
            output_dir: env_path("DEVOTIONAL_OUTPUT_DIR").unwrap_or_else(|| PathBuf::from("daily")),
            model: env_or("DEVOTIONAL_MODEL", "gpt-4o"),
        }
    }

    pub fn tz(&self) -> Tz {
        resolve_timezone(&self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_env_returns_existing_value() {
        env::set_var("GN_TEST_ENV_VALUE", "present");
        let result = ensure_env("GN_TEST_ENV_VALUE", "Test Value");
        env::remove_var("GN_TEST_ENV_VALUE");

        assert_eq!(result.unwrap(), "present");
    }

    #[test]
    fn test_ensure_env_rejects_missing_and_placeholder() {
        env::remove_var("GN_TEST_ENV_MISSING");
        let err = ensure_env("GN_TEST_ENV_MISSING", "Test Value").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Missing Test Value"));

        env::set_var("GN_TEST_ENV_PLACEHOLDER", "YOUR_OPENAI_API_KEY");
        let result = ensure_env("GN_TEST_ENV_PLACEHOLDER", "Test Value");
        env::remove_var("GN_TEST_ENV_PLACEHOLDER");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_server_args_handles_spaces_and_quotes() {
        let template = r#"--directory "{dir}" run "src/news_api_mcp/server.py" --flag"#;
        let args = resolve_server_args(template, Some(&PathBuf::from("/tmp/mcp path"))).unwrap();

        assert_eq!(
            args,
            vec!["--directory", "/tmp/mcp path", "run", "src/news_api_mcp/server.py", "--flag"]
        );
    }

    #[test]
    fn test_resolve_server_args_without_dir() {
        let args = resolve_server_args("mcp-server-fetch", None).unwrap();
        assert_eq!(args, vec!["mcp-server-fetch"]);

        assert!(resolve_server_args(r#"run "unterminated"#, None).is_err());
    }

    #[test]
    fn test_resolve_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("America/Los_Angeles"), Tz::America__Los_Angeles);
        assert_eq!(resolve_timezone("Mars/Olympus_Mons"), Tz::UTC);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        env::set_var("GN_TEST_PARSE", "many");
        let result: Result<usize> = env_parse("GN_TEST_PARSE", 3);
        env::remove_var("GN_TEST_PARSE");
        assert!(matches!(result, Err(Error::Configuration(_))));

        env::remove_var("GN_TEST_PARSE_UNSET");
        assert_eq!(env_parse("GN_TEST_PARSE_UNSET", 3usize).unwrap(), 3);
    }
}

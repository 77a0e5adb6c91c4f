use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
///
/// Must be called before the async runtime is built: mutating the
/// environment is only sound while the process is single-threaded.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        if let Some((key, value)) = parse_dotenv_line(line) {
            // Only set if not already set (env vars take precedence)
            if std::env::var(key).is_err() {
                // SAFETY: called from `main` before the runtime spawns any
                // worker threads
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

/// Split one .env line into a key/value pair. Comments, blank lines and
/// lines without '=' yield `None`; surrounding quotes are stripped.
fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    // Find the first '=' and split there
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let mut value = line[eq_pos + 1..].trim();

    // Remove surrounding quotes if present
    if (value.starts_with('"') && value.ends_with('"'))
        || (value.starts_with('\'') && value.ends_with('\''))
    {
        value = &value[1..value.len() - 1];
    }

    Some((key, value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub sweep: SweepConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// TCP port the JSON-RPC server listens on.
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Seconds between periodic status notifications for subscribed sensors.
    ///
    /// Must be kept strictly shorter than the controller's own staleness
    /// timeout; the gateway does not enforce this.
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seconds between simulated samples of the series sensors.
    pub sample_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig { port: 50800 },
            sweep: SweepConfig { interval_secs: 60 },
            board: BoardConfig {
                sample_interval_secs: 2,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("GATEWAY_PORT")
            && let Ok(p) = port.parse()
        {
            config.rpc.port = p;
        }
        if let Ok(interval) = std::env::var("STATUS_INTERVAL_SECS")
            && let Ok(i) = interval.parse()
        {
            config.sweep.interval_secs = i;
        }
        if let Ok(interval) = std::env::var("BOARD_SAMPLE_INTERVAL_SECS")
            && let Ok(i) = interval.parse()
        {
            config.board.sample_interval_secs = i;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_line_basic() {
        assert_eq!(parse_dotenv_line("KEY=value"), Some(("KEY", "value")));
        assert_eq!(
            parse_dotenv_line("  KEY = spaced value  "),
            Some(("KEY", "spaced value"))
        );
    }

    #[test]
    fn test_parse_dotenv_line_strips_quotes() {
        assert_eq!(parse_dotenv_line(r#"KEY="quoted""#), Some(("KEY", "quoted")));
        assert_eq!(parse_dotenv_line("KEY='quoted'"), Some(("KEY", "quoted")));
    }

    #[test]
    fn test_parse_dotenv_line_skips_comments_and_blanks() {
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line("   "), None);
        assert_eq!(parse_dotenv_line("no equals sign"), None);
    }

    #[test]
    fn test_parse_dotenv_line_splits_at_first_equals() {
        assert_eq!(parse_dotenv_line("KEY=a=b"), Some(("KEY", "a=b")));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rpc.port, 50800);
        assert_eq!(config.sweep.interval_secs, 60);
    }
}

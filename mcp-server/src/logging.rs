use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

fn default_level() -> String {
    "info".to_string()
}
fn default_use_stdout() -> bool {
    true
}

/// Loaded from `LOG_LEVEL`, `LOG_FORMAT` (plain|json) and `LOG_USE_STDOUT`.
/// `RUST_LOG`, when set, overrides `LOG_LEVEL`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// false: write to stderr (mandatory for the stdio transport)
    #[serde(default = "default_use_stdout")]
    pub use_stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            use_stdout: default_use_stdout(),
        }
    }
}

pub fn load_logging_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed("LOG_")
        .from_env::<LoggingConfig>()
        .map_err(|e| anyhow!("cannot load LOG_* env: {e}"))
}

pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&conf.level))
        .map_err(|e| anyhow!("invalid log level '{}': {e}", conf.level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match (conf.format, conf.use_stdout) {
        (LogFormat::Json, true) => builder.json().with_writer(std::io::stdout).try_init(),
        (LogFormat::Json, false) => builder.json().with_writer(std::io::stderr).try_init(),
        (LogFormat::Plain, true) => builder.with_writer(std::io::stdout).try_init(),
        (LogFormat::Plain, false) => builder
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    result.map_err(|e| anyhow!("tracing init error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let conf = LoggingConfig::default();
        assert_eq!(conf.level, "info");
        assert_eq!(conf.format, LogFormat::Plain);
        assert!(conf.use_stdout);
    }

    #[test]
    fn test_log_format_parse() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
    }
}

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the command line tool
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to include file and line number information
    pub include_file_info: bool,

    /// Whether to enable colored output
    pub enable_colors: bool,

    /// Log file path (optional, if None logs only to stderr)
    pub log_file: Option<String>,

    /// Module-specific log levels
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_levels = HashMap::new();
        module_levels.insert("rewrite_core".to_string(), "info".to_string());
        module_levels.insert("rewrite_cli".to_string(), "info".to_string());

        Self {
            level: "warn".to_string(),
            include_file_info: false,
            enable_colors: true,
            log_file: None,
            module_levels,
        }
    }
}

/// The part of the editor configuration file the logging setup reads
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    logging: LoggingConfig,
}

impl LoggingConfig {
    /// Read the `logging` section of a JSON configuration file.
    ///
    /// A missing path or a file without the section yields the defaults.
    pub fn from_config_file(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse logging section of {}", path.display()))?;
        Ok(file.logging)
    }

    /// Raise the crate log levels for `-v` (debug) and `-vv` (trace)
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "debug",
            _ => "trace",
        };
        for value in self.module_levels.values_mut() {
            *value = level.to_string();
        }
        self
    }

    fn filter(&self) -> anyhow::Result<EnvFilter> {
        let mut filter = EnvFilter::new(&self.level);
        for (module, level) in &self.module_levels {
            let directive = format!("{}={}", module, level);
            filter = filter.add_directive(
                directive
                    .parse()
                    .map_err(|e| anyhow!("Invalid log directive '{}': {}", directive, e))?,
            );
        }
        Ok(filter)
    }
}

/// Initialize logging based on the provided configuration.
///
/// `RUST_LOG` takes precedence over the configured levels. Calling this twice
/// is harmless.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    let file_layer = match &config.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(create_file_appender(path)?),
        ),
        None => None,
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(config.include_file_info)
                .with_line_number(config.include_file_info)
                .with_ansi(config.enable_colors)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init();

    match result {
        Ok(_) => tracing::debug!("Logging initialized with config level: {}", config.level),
        Err(_) => tracing::debug!("Logging already initialized, skipping"),
    }

    Ok(())
}

fn create_file_appender(log_file: &str) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    let log_path = Path::new(log_file);
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let filename = log_path
        .file_name()
        .ok_or_else(|| anyhow!("Invalid log file name: {}", log_file))?;

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    Ok(tracing_appender::rolling::never(directory, filename))
}

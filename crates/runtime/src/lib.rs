mod config;
pub mod logging;

pub use config::{
    CONFIG_FILE_NAME, ConfigError, DEFAULT_SKIP_PATTERNS, PROGRAM_CONFIG_ENV, PROGRAM_LOG_LEVEL,
    PROGRAM_NAME, ReportFormat, Settings, default_config_path, snapdiff_config_dir,
};

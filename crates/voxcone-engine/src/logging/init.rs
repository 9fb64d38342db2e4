use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "voxcone_engine=debug,wgpu_core=warn"). When it is `None`, `RUST_LOG` is
/// consulted, then `default_level` is used.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,

    /// Crates whose output is capped at `warn` unless `RUST_LOG` says otherwise.
    ///
    /// The GPU stack logs a lot at `info` during adapter and pipeline creation.
    pub quiet_crates: Vec<&'static str>,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            quiet_crates: vec!["wgpu_core", "wgpu_hal", "naga"],
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
            for krate in &config.quiet_crates {
                builder.filter_module(krate, log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}

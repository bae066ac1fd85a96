mod channels;
mod defaults;


pub use channels::*;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::AideError;
use defaults::*;

/// Top-level aide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aide: AideConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AideConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AideConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Memory config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Reminder dispatch loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// How far back a sweep looks for reminders a late sweep missed.
    #[serde(default = "default_grace_window")]
    pub grace_window_minutes: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval(),
            grace_window_minutes: default_grace_window(),
        }
    }
}

/// Daily digest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Owner-local hour (0-23) at which the digest goes out.
    #[serde(default = "default_digest_hour")]
    pub hour: u32,
    #[serde(default = "default_digest_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: default_digest_hour(),
            poll_interval_secs: default_digest_poll_interval(),
        }
    }
}

/// Entity resolution tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum similarity for a candidate to be kept.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Top-two score gap below which the user must choose.
    #[serde(default = "default_ambiguity_gap")]
    pub ambiguity_gap: f64,
    /// Candidates offered in a disambiguation prompt.
    #[serde(default = "default_max_options")]
    pub max_options: usize,
    #[serde(default = "default_disambiguation_ttl")]
    pub disambiguation_ttl_minutes: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            ambiguity_gap: default_ambiguity_gap(),
            max_options: default_max_options(),
            disambiguation_ttl_minutes: default_disambiguation_ttl(),
        }
    }
}

/// Defaults for owners that have not set their own timezone or language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            language: default_language(),
        }
    }
}

impl LocaleConfig {
    /// Parsed IANA timezone.
    pub fn tz(&self) -> Result<Tz, AideError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AideError::Config(format!("unknown timezone '{}'", self.timezone)))
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, AideError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AideError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str::<Config>(&content)
            .map_err(|e| AideError::Config(format!("failed to parse config: {}", e)))?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    if let Some(ref mut tg) = config.channel.telegram {
        if tg.bot_token.is_empty() {
            if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
                tg.bot_token = token;
            }
        }
    }

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject values that would make the loops or resolver misbehave.
    pub fn validate(&self) -> Result<(), AideError> {
        self.locale.tz()?;
        if self.digest.hour > 23 {
            return Err(AideError::Config(format!(
                "digest.hour must be 0-23, got {}",
                self.digest.hour
            )));
        }
        if !(0.0..=1.0).contains(&self.resolver.threshold) {
            return Err(AideError::Config(format!(
                "resolver.threshold must be within 0..1, got {}",
                self.resolver.threshold
            )));
        }
        if self.scheduler.poll_interval_secs == 0 || self.digest.poll_interval_secs == 0 {
            return Err(AideError::Config(
                "poll intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! marcaje configuration system.
//!
//! TOML file with serde field defaults, plus environment overrides for the
//! values that are secrets (flag SDK key, SMTP password) or that operators
//! flip per-invocation (debug mode, kill switch).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MarcajeError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarcajeConfig {
    #[serde(default)]
    pub flags: FlagsConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl MarcajeConfig {
    /// Load config from the default path (~/.marcaje/config.toml), falling
    /// back to defaults when the file does not exist, then apply env
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MarcajeError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| MarcajeError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".marcaje")
            .join("config.toml")
    }

    /// Overlay environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("MARCAJE_SDK_KEY") {
            self.flags.sdk_key = clean_secret(&key);
        }
        if let Ok(addr) = std::env::var("MARCAJE_EMAIL_ADDRESS") {
            self.email.address = clean_secret(&addr);
        }
        if let Ok(pass) = std::env::var("MARCAJE_EMAIL_PASS") {
            self.email.password = clean_secret(&pass);
        }
        if let Ok(debug) = std::env::var("MARCAJE_DEBUG_MODE") {
            self.dispatch.debug_mode = is_truthy(&debug);
        }
        if let Ok(active) = std::env::var("MARCAJE_CLOCK_IN_ACTIVE") {
            self.dispatch.clock_in_active = is_truthy(&active);
        }
    }

    /// Reject configs that cannot possibly complete a run. The only fatal
    /// error category: the process stops here, before any work begins.
    pub fn validate(&self) -> Result<()> {
        if self.flags.sdk_key.is_empty() {
            return Err(MarcajeError::Config(
                "flags.sdk_key is not set (or MARCAJE_SDK_KEY)".into(),
            ));
        }
        if self.email.address.is_empty() || self.email.password.is_empty() {
            return Err(MarcajeError::Config(
                "email credentials are not set (email.address/password or MARCAJE_EMAIL_*)".into(),
            ));
        }
        if self.dispatch.delay_min_minutes == 0
            || self.dispatch.delay_min_minutes > self.dispatch.delay_max_minutes
        {
            return Err(MarcajeError::Config(format!(
                "invalid delay range [{}, {}]",
                self.dispatch.delay_min_minutes, self.dispatch.delay_max_minutes
            )));
        }
        if self.dispatch.max_workers == 0 {
            return Err(MarcajeError::Config("dispatch.max_workers must be >= 1".into()));
        }
        Ok(())
    }
}

/// Secrets pasted into env files tend to arrive wrapped in quotes.
fn clean_secret(raw: &str) -> String {
    raw.trim().trim_matches('\'').trim_matches('"').to_string()
}

fn is_truthy(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Flag backend (enablement list) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagsConfig {
    /// Server-side SDK key. Secret; usually set via MARCAJE_SDK_KEY.
    #[serde(default)]
    pub sdk_key: String,
    #[serde(default = "default_flags_base_url")]
    pub base_url: String,
    /// Flag key that globally enables/disables the bot. Never treated as an
    /// identifier.
    #[serde(default = "default_kill_switch_key")]
    pub kill_switch_key: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_flags_base_url() -> String {
    "https://sdk.launchdarkly.com".into()
}
fn default_kill_switch_key() -> String {
    "CLOCK_IN_ACTIVE".into()
}
fn default_http_timeout() -> u64 {
    10
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            sdk_key: String::new(),
            base_url: default_flags_base_url(),
            kill_switch_key: default_kill_switch_key(),
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Holiday calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_url")]
    pub api_url: String,
    #[serde(default = "default_calendar_timeout")]
    pub timeout_secs: u64,
    /// When both the API and the local table are silent about today, run
    /// anyway (true) or skip the day (false).
    #[serde(default = "bool_true")]
    pub fail_open: bool,
}

fn default_calendar_url() -> String {
    "https://api.boostr.cl/holidays.json".into()
}
fn default_calendar_timeout() -> u64 {
    5
}
fn bool_true() -> bool {
    true
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_url: default_calendar_url(),
            timeout_secs: default_calendar_timeout(),
            fail_open: true,
        }
    }
}

/// Time-clock form configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_form_url")]
    pub form_url: String,
    /// WebDriver endpoint (chromedriver).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Civil-time offset of the target site, in hours from UTC.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    /// Hour-of-day window [start, end) that maps to clock-in; anything else
    /// is clock-out.
    #[serde(default = "default_clock_in_start")]
    pub clock_in_start_hour: u32,
    #[serde(default = "default_clock_in_end")]
    pub clock_in_end_hour: u32,
}

fn default_form_url() -> String {
    "https://app.ctrlit.cl/ctrl/dial/web/K1NBpBqyjf".into()
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_utc_offset() -> i32 {
    -4
}
fn default_clock_in_start() -> u32 {
    5
}
fn default_clock_in_end() -> u32 {
    12
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            form_url: default_form_url(),
            webdriver_url: default_webdriver_url(),
            utc_offset_hours: default_utc_offset(),
            clock_in_start_hour: default_clock_in_start(),
            clock_in_end_hour: default_clock_in_end(),
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Concurrent work-item executions.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_delay_min")]
    pub delay_min_minutes: u32,
    #[serde(default = "default_delay_max")]
    pub delay_max_minutes: u32,
    /// Redraw attempts before accepting a colliding delay value.
    #[serde(default = "default_collision_attempts")]
    pub collision_attempts: u32,
    /// Fast path: skip delays and simulate the form interaction. Fixed for
    /// the whole run; never mixed with the production path.
    #[serde(default)]
    pub debug_mode: bool,
    /// Global kill switch; false short-circuits the run.
    #[serde(default = "bool_true")]
    pub clock_in_active: bool,
    /// Exit with a non-zero code when any item fails.
    #[serde(default)]
    pub fail_on_partial: bool,
}

fn default_max_workers() -> usize {
    5
}
fn default_delay_min() -> u32 {
    1
}
fn default_delay_max() -> u32 {
    20
}
fn default_collision_attempts() -> u32 {
    10
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            delay_min_minutes: default_delay_min(),
            delay_max_minutes: default_delay_max(),
            collision_attempts: default_collision_attempts(),
            debug_mode: false,
            clock_in_active: true,
            fail_on_partial: false,
        }
    }
}

/// Outcome email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender account; also the default recipient.
    #[serde(default)]
    pub address: String,
    /// Secret; usually set via MARCAJE_EMAIL_PASS.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub to: Option<String>,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            address: String::new(),
            password: String::new(),
            to: None,
        }
    }
}

impl EmailConfig {
    /// Recipient, defaulting to the sender account.
    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarcajeConfig::default();
        assert_eq!(config.dispatch.max_workers, 5);
        assert_eq!(config.dispatch.delay_min_minutes, 1);
        assert_eq!(config.dispatch.delay_max_minutes, 20);
        assert_eq!(config.dispatch.collision_attempts, 10);
        assert!(config.dispatch.clock_in_active);
        assert!(!config.dispatch.fail_on_partial);
        assert!(config.calendar.fail_open);
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.clock.utc_offset_hours, -4);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [flags]
            sdk_key = "sdk-abc"

            [dispatch]
            max_workers = 3
            debug_mode = true

            [email]
            address = "bot@example.com"
            password = "hunter2"
            to = "ops@example.com"
        "#;

        let config: MarcajeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.flags.sdk_key, "sdk-abc");
        assert_eq!(config.dispatch.max_workers, 3);
        assert!(config.dispatch.debug_mode);
        assert_eq!(config.email.recipient(), "ops@example.com");
        // Untouched sections keep their defaults
        assert_eq!(config.dispatch.delay_max_minutes, 20);
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: MarcajeConfig = toml::from_str("").unwrap();
        assert_eq!(config.flags.base_url, "https://sdk.launchdarkly.com");
        assert_eq!(config.flags.kill_switch_key, "CLOCK_IN_ACTIVE");
        assert_eq!(config.calendar.api_url, "https://api.boostr.cl/holidays.json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dispatch]\nmax_workers = 2\n").unwrap();
        let config = MarcajeConfig::load_from(&path).unwrap();
        assert_eq!(config.dispatch.max_workers, 2);
    }

    #[test]
    fn test_load_from_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(matches!(
            MarcajeConfig::load_from(&path),
            Err(MarcajeError::Config(_))
        ));
    }

    #[test]
    fn test_validate_requires_secrets() {
        let mut config = MarcajeConfig::default();
        assert!(config.validate().is_err());

        config.flags.sdk_key = "sdk-abc".into();
        assert!(config.validate().is_err());

        config.email.address = "bot@example.com".into();
        config.email.password = "hunter2".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_delay_range() {
        let mut config = MarcajeConfig::default();
        config.flags.sdk_key = "sdk-abc".into();
        config.email.address = "bot@example.com".into();
        config.email.password = "hunter2".into();

        config.dispatch.delay_min_minutes = 10;
        config.dispatch.delay_max_minutes = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        // Only this test touches these variables.
        unsafe {
            std::env::set_var("MARCAJE_SDK_KEY", "'sdk-from-env'");
            std::env::set_var("MARCAJE_DEBUG_MODE", "TRUE");
            std::env::set_var("MARCAJE_CLOCK_IN_ACTIVE", "false");
        }

        let mut config = MarcajeConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.flags.sdk_key, "sdk-from-env");
        assert!(config.dispatch.debug_mode);
        assert!(!config.dispatch.clock_in_active);

        unsafe {
            std::env::remove_var("MARCAJE_SDK_KEY");
            std::env::remove_var("MARCAJE_DEBUG_MODE");
            std::env::remove_var("MARCAJE_CLOCK_IN_ACTIVE");
        }
    }

    #[test]
    fn test_clean_secret_strips_quotes() {
        assert_eq!(clean_secret("  'sdk-key-1' "), "sdk-key-1");
        assert_eq!(clean_secret("\"sdk-key-2\""), "sdk-key-2");
        assert_eq!(clean_secret("plain"), "plain");
    }
}

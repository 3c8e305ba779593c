//! Configuration file management for studyplan.
//!
//! Provides a TOML-based config file at `~/.config/studyplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use studyplan_core::plan::ValidationPolicy;

/// Bind address used when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub planner: PlannerSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// Reject requests with no subjects or with chapterless subjects.
    pub reject_empty: bool,
    /// Reject blank subject or chapter names. Off unless set.
    pub reject_blank_names: bool,
    /// Longest `timetable` span accepted, in days from today.
    pub max_timetable_days: u32,
    /// Pin "today" (quoted `YYYY-MM-DD`). Unset means the local date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
}

impl Default for PlannerSection {
    fn default() -> Self {
        let policy = ValidationPolicy::default();
        Self {
            reject_empty: policy.reject_empty,
            reject_blank_names: policy.reject_blank_names,
            max_timetable_days: policy.max_timetable_days,
            today: None,
        }
    }
}

impl PlannerSection {
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            reject_empty: self.reject_empty,
            reject_blank_names: self.reject_blank_names,
            max_timetable_days: self.max_timetable_days,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the studyplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/studyplan` or
/// `~/.config/studyplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("studyplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("studyplan")
}

/// Return the path to the studyplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns `Ok(None)` if it does not exist.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct StudyPlanConfig {
    pub bind: String,
    pub port: u16,
    pub policy: ValidationPolicy,
    pub today: Option<NaiveDate>,
}

impl StudyPlanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Bind: `cli_bind` > `STUDYPLAN_BIND` env > `server.bind` > [`DEFAULT_BIND`]
    /// - Port: `cli_port` > `STUDYPLAN_PORT` env > `server.port` > [`DEFAULT_PORT`]
    /// - Validation and pinned date come from `[planner]` only.
    pub fn resolve(cli_bind: Option<&str>, cli_port: Option<u16>) -> Result<Self> {
        let file_config = load_config()?.unwrap_or_default();

        let bind = if let Some(bind) = cli_bind {
            bind.to_string()
        } else if let Ok(bind) = std::env::var("STUDYPLAN_BIND") {
            bind
        } else {
            file_config.server.bind.clone()
        };

        let port = if let Some(port) = cli_port {
            port
        } else if let Ok(raw) = std::env::var("STUDYPLAN_PORT") {
            raw.parse()
                .with_context(|| format!("STUDYPLAN_PORT is not a valid port: {raw:?}"))?
        } else {
            file_config.server.port
        };

        Ok(Self {
            bind,
            port,
            policy: file_config.planner.validation_policy(),
            today: file_config.planner.today,
        })
    }

    /// The date plans are generated against: `override_today` if given,
    /// then the configured pinned date, then the local calendar date.
    pub fn today(&self, override_today: Option<NaiveDate>) -> NaiveDate {
        override_today
            .or(self.today)
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point the config directory at a fresh temp dir and clear env overrides.
    fn isolated_env() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::remove_var("STUDYPLAN_BIND") };
        unsafe { std::env::remove_var("STUDYPLAN_PORT") };
        tmp
    }

    fn write_config(contents: &str) {
        let dir = config_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(config_path(), contents).unwrap();
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let config = StudyPlanConfig::resolve(None, None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.policy, ValidationPolicy::default());
        assert_eq!(config.today, None);
    }

    #[test]
    fn resolve_reads_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        write_config(
            r#"
[server]
bind = "0.0.0.0"
port = 9100

[planner]
reject_empty = false
today = "2025-03-10"
"#,
        );

        let config = StudyPlanConfig::resolve(None, None).unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert!(!config.policy.reject_empty);
        assert!(!config.policy.reject_blank_names, "unset field keeps default");
        assert_eq!(config.policy.max_timetable_days, 366);
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2025, 3, 10));
    }

    #[test]
    fn resolve_reads_opt_in_planner_checks() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        write_config(
            r#"
[planner]
reject_blank_names = true
max_timetable_days = 30
"#,
        );

        let config = StudyPlanConfig::resolve(None, None).unwrap();
        assert!(config.policy.reject_empty, "unset field keeps default");
        assert!(config.policy.reject_blank_names);
        assert_eq!(config.policy.max_timetable_days, 30);
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        write_config("[server]\nbind = \"0.0.0.0\"\nport = 9100\n");

        unsafe { std::env::set_var("STUDYPLAN_BIND", "10.0.0.5") };
        unsafe { std::env::set_var("STUDYPLAN_PORT", "9200") };

        let config = StudyPlanConfig::resolve(None, None).unwrap();

        unsafe { std::env::remove_var("STUDYPLAN_BIND") };
        unsafe { std::env::remove_var("STUDYPLAN_PORT") };

        assert_eq!(config.bind, "10.0.0.5");
        assert_eq!(config.port, 9200);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        unsafe { std::env::set_var("STUDYPLAN_BIND", "10.0.0.5") };
        unsafe { std::env::set_var("STUDYPLAN_PORT", "9200") };

        let config = StudyPlanConfig::resolve(Some("::1"), Some(7000)).unwrap();

        unsafe { std::env::remove_var("STUDYPLAN_BIND") };
        unsafe { std::env::remove_var("STUDYPLAN_PORT") };

        assert_eq!(config.bind, "::1");
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn resolve_errors_on_invalid_env_port() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        unsafe { std::env::set_var("STUDYPLAN_PORT", "eighty") };
        let result = StudyPlanConfig::resolve(None, None);
        unsafe { std::env::remove_var("STUDYPLAN_PORT") };

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("STUDYPLAN_PORT"), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_errors_on_malformed_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        write_config("[server\nport = ");

        let msg = format!("{:#}", StudyPlanConfig::resolve(None, None).unwrap_err());
        assert!(msg.contains("failed to parse config file"), "unexpected error: {msg}");
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let original = ConfigFile {
            server: ServerSection {
                bind: "0.0.0.0".to_string(),
                port: 8123,
            },
            planner: PlannerSection {
                reject_empty: true,
                reject_blank_names: true,
                max_timetable_days: 90,
                today: None,
            },
        };
        save_config(&original).unwrap();

        let loaded = load_config().unwrap().expect("config should exist");
        assert_eq!(loaded.server.bind, "0.0.0.0");
        assert_eq!(loaded.server.port, 8123);
        assert!(loaded.planner.reject_blank_names);
        assert_eq!(loaded.planner.max_timetable_days, 90);
        assert_eq!(loaded.planner.today, None);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&ConfigFile::default()).unwrap();

        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn today_prefers_override_then_pinned_date() {
        let pinned = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let explicit = NaiveDate::from_ymd_opt(2030, 7, 4).unwrap();
        let config = StudyPlanConfig {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            policy: ValidationPolicy::default(),
            today: Some(pinned),
        };
        assert_eq!(config.today(Some(explicit)), explicit);
        assert_eq!(config.today(None), pinned);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("studyplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}

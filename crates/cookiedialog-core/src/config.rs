//! Caller-facing configuration.
//!
//! A [`ConsentConfig`] is defaulted and validated once, when the orchestrator
//! is constructed. Notification hooks live in [`crate::hooks::ConsentHooks`]
//! because closures are not serializable.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConsentError, ConsentResult};

/// Default storage key for the persisted record.
pub const DEFAULT_STORAGE_KEY: &str = "cookiedialog_consent";

/// Default region lookup endpoint.
pub const DEFAULT_LOCATION_ENDPOINT: &str = "https://ipapi.co/json/";

/// Schema version written into every record.
pub const CONSENT_SCHEMA_VERSION: &str = "1.0.0";

/// A cookie category the site declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDeclaration {
    /// Stable identifier stored in the consent record.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Required categories are always granted.
    #[serde(default)]
    pub required: bool,
}

impl CategoryDeclaration {
    pub fn new(id: impl Into<String>, name: impl Into<String>, required: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required,
        }
    }

    pub fn required(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, true)
    }

    pub fn optional(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, false)
    }
}

/// Consent engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentConfig {
    /// Key under which the record is stored.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Gate the prompt behind a region lookup.
    #[serde(default)]
    pub enable_location: bool,

    /// Always show the prompt, even with consent on file or a region exemption.
    #[serde(default)]
    pub force_show: bool,

    /// Days a record stays valid after it was written.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u32,

    /// Declared categories, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryDeclaration>,

    /// Region lookup endpoint override.
    #[serde(default)]
    pub location_endpoint: Option<String>,

    /// Region lookup timeout in seconds.
    #[serde(default = "default_location_timeout")]
    pub location_timeout_secs: u64,

    /// Schema version of records written by this configuration.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_expiry_days() -> u32 {
    365
}

fn default_location_timeout() -> u64 {
    5
}

fn default_schema_version() -> String {
    CONSENT_SCHEMA_VERSION.to_string()
}

/// The necessary / analytics / marketing set used when nothing is declared.
pub fn default_categories() -> Vec<CategoryDeclaration> {
    vec![
        CategoryDeclaration::required("necessary", "Necessary"),
        CategoryDeclaration::optional("analytics", "Analytics"),
        CategoryDeclaration::optional("marketing", "Marketing"),
    ]
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            enable_location: false,
            force_show: false,
            expiry_days: default_expiry_days(),
            categories: default_categories(),
            location_endpoint: None,
            location_timeout_secs: default_location_timeout(),
            schema_version: default_schema_version(),
        }
    }
}

impl ConsentConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `COOKIEDIALOG_STORAGE_KEY` | Storage key |
    /// | `COOKIEDIALOG_ENABLE_LOCATION` | Enable region gating (`1`/`true`) |
    /// | `COOKIEDIALOG_FORCE_SHOW` | Always show the prompt (`1`/`true`) |
    /// | `COOKIEDIALOG_EXPIRY_DAYS` | Record lifetime in days |
    /// | `COOKIEDIALOG_LOCATION_ENDPOINT` | Region lookup URL |
    /// | `COOKIEDIALOG_LOCATION_TIMEOUT` | Region lookup timeout in seconds |
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply `COOKIEDIALOG_*` overrides on top of this config.
    pub fn merge_env(mut self) -> Self {
        if let Ok(key) = std::env::var("COOKIEDIALOG_STORAGE_KEY") {
            if !key.is_empty() {
                self.storage_key = key;
            }
        }
        if let Some(flag) = env_flag("COOKIEDIALOG_ENABLE_LOCATION") {
            self.enable_location = flag;
        }
        if let Some(flag) = env_flag("COOKIEDIALOG_FORCE_SHOW") {
            self.force_show = flag;
        }
        if let Some(days) = env_parsed("COOKIEDIALOG_EXPIRY_DAYS") {
            self.expiry_days = days;
        }
        if let Ok(endpoint) = std::env::var("COOKIEDIALOG_LOCATION_ENDPOINT") {
            if !endpoint.is_empty() {
                self.location_endpoint = Some(endpoint);
            }
        }
        if let Some(secs) = env_parsed("COOKIEDIALOG_LOCATION_TIMEOUT") {
            self.location_timeout_secs = secs;
        }
        self
    }

    /// Load config from a YAML or JSON file (chosen by extension, YAML otherwise).
    pub fn from_file(path: &Path) -> ConsentResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConsentError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&text).map_err(|e| ConsentError::Config {
                message: format!("invalid JSON config {}: {}", path.display(), e),
            })
        } else {
            serde_yaml::from_str(&text).map_err(|e| ConsentError::Config {
                message: format!("invalid YAML config {}: {}", path.display(), e),
            })
        }
    }

    /// Check the option set once, before any component is built.
    pub fn validate(&self) -> ConsentResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(config_error("storage key must not be empty"));
        }
        if self.expiry_days == 0 {
            return Err(config_error("expiry days must be at least 1"));
        }
        if self.categories.is_empty() {
            return Err(config_error("at least one category must be declared"));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(config_error("category id must not be empty"));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(ConsentError::Config {
                    message: format!("duplicate category id: {}", category.id),
                });
            }
        }

        if let Some(endpoint) = &self.location_endpoint {
            let parsed = url::Url::parse(endpoint).map_err(|e| ConsentError::Config {
                message: format!("invalid location endpoint {}: {}", endpoint, e),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConsentError::Config {
                    message: format!("location endpoint must be http(s): {}", endpoint),
                });
            }
        }

        if self.location_timeout_secs == 0 {
            return Err(config_error("location timeout must be at least 1 second"));
        }

        Ok(())
    }

    /// Endpoint the region lookup will call.
    pub fn effective_location_endpoint(&self) -> &str {
        self.location_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_LOCATION_ENDPOINT)
    }

    /// Ids of categories declared as required.
    pub fn required_ids(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| c.required)
            .map(|c| c.id.clone())
            .collect()
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Enable or disable region gating.
    pub fn with_location(mut self, enabled: bool) -> Self {
        self.enable_location = enabled;
        self
    }

    /// Always show the prompt.
    pub fn with_force_show(mut self, force: bool) -> Self {
        self.force_show = force;
        self
    }

    /// Set the record lifetime.
    pub fn with_expiry_days(mut self, days: u32) -> Self {
        self.expiry_days = days;
        self
    }

    /// Replace the declared categories.
    pub fn with_categories(mut self, categories: Vec<CategoryDeclaration>) -> Self {
        self.categories = categories;
        self
    }

    /// Override the region lookup endpoint.
    pub fn with_location_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.location_endpoint = Some(endpoint.into());
        self
    }

    /// Set the schema version.
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }
}

fn config_error(message: &str) -> ConsentError {
    ConsentError::Config {
        message: message.to_string(),
    }
}

/// Parse a boolean flag: `true`/`false`, `yes`/`no`, `1`/`0`, `on`/`off`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str) -> Option<bool> {
    let raw = env_value(name)?;
    let flag = parse_flag(&raw);
    if flag.is_none() {
        warn!(var = name, value = %raw, "ignoring unrecognized boolean");
    }
    flag
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_value(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [
            "COOKIEDIALOG_STORAGE_KEY",
            "COOKIEDIALOG_ENABLE_LOCATION",
            "COOKIEDIALOG_FORCE_SHOW",
            "COOKIEDIALOG_EXPIRY_DAYS",
            "COOKIEDIALOG_LOCATION_ENDPOINT",
            "COOKIEDIALOG_LOCATION_TIMEOUT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ConsentConfig::default();
        assert_eq!(config.storage_key, "cookiedialog_consent");
        assert!(!config.enable_location);
        assert!(!config.force_show);
        assert_eq!(config.expiry_days, 365);
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.required_ids(), vec!["necessary".to_string()]);
        assert_eq!(config.effective_location_endpoint(), "https://ipapi.co/json/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ConsentConfig::default()
            .with_storage_key("site_consent")
            .with_location(true)
            .with_force_show(true)
            .with_expiry_days(30)
            .with_location_endpoint("https://geo.example.com/lookup");

        assert_eq!(config.storage_key, "site_consent");
        assert!(config.enable_location);
        assert!(config.force_show);
        assert_eq!(config.expiry_days, 30);
        assert_eq!(
            config.effective_location_endpoint(),
            "https://geo.example.com/lookup"
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let config = ConsentConfig::default().with_categories(vec![
            CategoryDeclaration::required("necessary", "Necessary"),
            CategoryDeclaration::optional("necessary", "Again"),
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate category id"));
    }

    #[test]
    fn test_validate_rejects_zero_expiry_and_empty_categories() {
        assert!(ConsentConfig::default()
            .with_expiry_days(0)
            .validate()
            .is_err());
        assert!(ConsentConfig::default()
            .with_categories(vec![])
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = ConsentConfig::default().with_location_endpoint("not a url");
        assert!(matches!(config.validate(), Err(ConsentError::Config { .. })));

        let config = ConsentConfig::default().with_location_endpoint("ftp://geo.example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_flag() {
        for raw in ["1", "true", "TRUE", "yes", "on", " On "] {
            assert_eq!(parse_flag(raw), Some(true), "{raw:?}");
        }
        for raw in ["0", "false", "no", "off"] {
            assert_eq!(parse_flag(raw), Some(false), "{raw:?}");
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    #[serial]
    fn test_from_env_accepts_boolish_flags() {
        clear_env();
        std::env::set_var("COOKIEDIALOG_ENABLE_LOCATION", "yes");
        std::env::set_var("COOKIEDIALOG_FORCE_SHOW", "on");

        let config = ConsentConfig::from_env();
        assert!(config.enable_location);
        assert!(config.force_show);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparseable_values() {
        clear_env();
        std::env::set_var("COOKIEDIALOG_ENABLE_LOCATION", "sometimes");
        std::env::set_var("COOKIEDIALOG_EXPIRY_DAYS", "a year");
        std::env::set_var("COOKIEDIALOG_LOCATION_TIMEOUT", "-3");

        let config = ConsentConfig::default().with_location(true).merge_env();
        assert!(config.enable_location);
        assert_eq!(config.expiry_days, 365);
        assert_eq!(config.location_timeout_secs, 5);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = ConsentConfig::from_env();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(!config.enable_location);
        assert!(config.location_endpoint.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("COOKIEDIALOG_ENABLE_LOCATION", "true");
        std::env::set_var("COOKIEDIALOG_EXPIRY_DAYS", "90");
        std::env::set_var("COOKIEDIALOG_LOCATION_ENDPOINT", "https://geo.example.com/");

        let config = ConsentConfig::from_env();
        assert!(config.enable_location);
        assert_eq!(config.expiry_days, 90);
        assert_eq!(
            config.location_endpoint.as_deref(),
            Some("https://geo.example.com/")
        );
        clear_env();
    }

    #[test]
    fn test_from_yaml_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "enableLocation: true\nexpiryDays: 30\ncategories:\n  - id: necessary\n    name: Necessary\n    required: true\n  - id: analytics\n"
        )
        .unwrap();

        let config = ConsentConfig::from_file(&path).unwrap();
        assert!(config.enable_location);
        assert_eq!(config.expiry_days, 30);
        assert_eq!(config.categories.len(), 2);
        assert!(!config.categories[1].required);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.schema_version, CONSENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent.json");
        std::fs::write(&path, r#"{"forceShow": true, "storageKey": "k"}"#).unwrap();

        let config = ConsentConfig::from_file(&path).unwrap();
        assert!(config.force_show);
        assert_eq!(config.storage_key, "k");
        assert_eq!(config.categories, default_categories());
    }

    #[test]
    fn test_from_file_missing() {
        let err = ConsentConfig::from_file(Path::new("/nonexistent/consent.yaml")).unwrap_err();
        assert!(matches!(err, ConsentError::Config { .. }));
    }
}

//! Profile management
//!
//! Profiles are named references to a file-hosting endpoint, including
//! the API key, the API version it speaks and an optional origin.

use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;
use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::version::ApiVersion;

/// Timeout configuration for a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    120_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            request_ms: default_request_timeout(),
        }
    }
}

/// A profile represents a named file-hosting endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Base endpoint URL of the API
    pub endpoint: String,

    /// API key sent with every request
    pub api_key: String,

    /// Origin header value, for services that allow-list origins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// API version spoken by the endpoint
    #[serde(default)]
    pub api_version: ApiVersion,

    /// Timeout configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,
}

impl Profile {
    /// Create a new profile with required fields
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            origin: None,
            api_version: ApiVersion::default(),
            timeout: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default()
    }

    /// Build the client configuration for this profile
    pub fn client_config(&self, max_concurrency: usize) -> Result<ClientConfig> {
        let config = ClientConfig::new(&self.api_key, &self.endpoint, self.api_version)?
            .with_max_concurrency(max_concurrency);
        Ok(match &self.origin {
            Some(origin) => config.with_origin(origin),
            None => config,
        })
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        let config = self.config_manager.load()?;
        config
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or update a profile
    ///
    /// The endpoint is validated before anything is written.
    pub fn set(&self, profile: Profile) -> Result<()> {
        profile.client_config(1)?;

        let mut config = self.config_manager.load()?;
        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let profile_manager = ProfileManager::with_config_manager(config_manager);
        (profile_manager, temp_dir)
    }

    #[test]
    fn test_profile_new() {
        let profile = Profile::new("test", "https://api.example.com", "key");
        assert_eq!(profile.name, "test");
        assert_eq!(profile.endpoint, "https://api.example.com");
        assert_eq!(profile.api_version, ApiVersion::V2);
        assert!(profile.origin.is_none());
        assert_eq!(profile.timeout_config(), TimeoutConfig::default());
    }

    #[test]
    fn test_profile_client_config() {
        let profile = Profile::new("test", "https://api.example.com/v1", "key")
            .with_origin("https://app.example.com")
            .with_api_version(ApiVersion::V1);

        let config = profile.client_config(4).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.origin.as_deref(), Some("https://app.example.com"));
        assert_eq!(config.version, ApiVersion::V1);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.base_endpoint.as_str(), "https://api.example.com/v1");
    }

    #[test]
    fn test_profile_manager_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager
            .set(Profile::new("work", "https://files.example.com", "k1"))
            .unwrap();

        let retrieved = manager.get("work").unwrap();
        assert_eq!(retrieved.name, "work");
        assert_eq!(retrieved.endpoint, "https://files.example.com");
        assert_eq!(retrieved.api_key, "k1");
    }

    #[test]
    fn test_profile_manager_rejects_invalid_endpoint() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.set(Profile::new("bad", "files.example.com", "k"));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert!(!manager.exists("bad").unwrap());
    }

    #[test]
    fn test_profile_manager_list() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("a", "https://a.example.com", "a")).unwrap();
        manager.set(Profile::new("b", "https://b.example.com", "b")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 2);
    }

    #[test]
    fn test_profile_manager_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager
            .set(Profile::new("test", "https://api.example.com", "k"))
            .unwrap();
        assert!(manager.exists("test").unwrap());

        manager.remove("test").unwrap();
        assert!(!manager.exists("test").unwrap());
    }

    #[test]
    fn test_profile_manager_remove_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.remove("nonexistent");
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn test_profile_manager_get_not_found() {
        let (manager, _temp_dir) = temp_profile_manager();

        let result = manager.get("nonexistent");
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn test_profile_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager
            .set(Profile::new("test", "https://old.example.com", "a"))
            .unwrap();
        manager
            .set(Profile::new("test", "https://new.example.com", "b"))
            .unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].endpoint, "https://new.example.com");
    }
}

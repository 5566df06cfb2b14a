use std::fmt;

use todo_core::{require_option, RepositoryOptions, StorageError};

/// Connection settings for a Cloudant or CouchDB server.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudantConfig {
    /// Server URL; `https://` is assumed when no scheme is given
    pub host: String,
    pub username: String,
    pub password: String,
    /// Database holding the items, created on first init if missing
    pub db_name: String,
}

impl CloudantConfig {
    pub const HOST_OPTION: &'static str = "cloudant_host";
    pub const USERNAME_OPTION: &'static str = "cloudant_username";
    pub const PASSWORD_OPTION: &'static str = "cloudant_password";
    pub const DB_NAME_OPTION: &'static str = "cloudant_db_name";

    /// Build the configuration from a flat option map.
    pub fn from_options(options: &RepositoryOptions) -> Result<Self, StorageError> {
        Ok(Self {
            host: require_option(options, Self::HOST_OPTION)?,
            username: require_option(options, Self::USERNAME_OPTION)?,
            password: require_option(options, Self::PASSWORD_OPTION)?,
            db_name: require_option(options, Self::DB_NAME_OPTION)?,
        })
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

impl fmt::Debug for CloudantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudantConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RepositoryOptions {
        [
            ("cloudant_host", "account.cloudant.com/"),
            ("cloudant_username", "user"),
            ("cloudant_password", "secret"),
            ("cloudant_db_name", "todos"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_from_options() {
        let config = CloudantConfig::from_options(&options()).unwrap();
        assert_eq!(config.db_name, "todos");
        assert_eq!(config.base_url(), "https://account.cloudant.com");
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let mut options = options();
        options.insert(
            "cloudant_host".to_string(),
            "http://localhost:5984".to_string(),
        );
        let config = CloudantConfig::from_options(&options).unwrap();
        assert_eq!(config.base_url(), "http://localhost:5984");
    }

    #[test]
    fn test_missing_option() {
        let mut options = options();
        options.remove("cloudant_password");
        assert!(matches!(
            CloudantConfig::from_options(&options),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = CloudantConfig::from_options(&options()).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}

use todo_core::{optional_option, require_option, RepositoryOptions, StorageError};

/// Configuration for the DynamoDB repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoConfig {
    /// Table holding the items
    pub table_name: String,
    /// Endpoint override (e.g. DynamoDB Local)
    pub endpoint_url: Option<String>,
    /// Region override; the default AWS provider chain is used otherwise
    pub region: Option<String>,
}

impl DynamoConfig {
    pub const TABLE_OPTION: &'static str = "dynamodb_table";
    pub const ENDPOINT_OPTION: &'static str = "dynamodb_endpoint";
    pub const REGION_OPTION: &'static str = "dynamodb_region";

    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            endpoint_url: None,
            region: None,
        }
    }

    /// Build the configuration from a flat option map.
    pub fn from_options(options: &RepositoryOptions) -> Result<Self, StorageError> {
        Ok(Self {
            table_name: require_option(options, Self::TABLE_OPTION)?,
            endpoint_url: optional_option(options, Self::ENDPOINT_OPTION),
            region: optional_option(options, Self::REGION_OPTION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options() {
        let mut options = RepositoryOptions::new();
        options.insert("dynamodb_table".to_string(), "todos".to_string());
        options.insert("dynamodb_region".to_string(), "eu-central-1".to_string());

        let config = DynamoConfig::from_options(&options).unwrap();
        assert_eq!(config.table_name, "todos");
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.endpoint_url, None);
    }

    #[test]
    fn test_table_is_required() {
        let options = RepositoryOptions::new();
        assert!(matches!(
            DynamoConfig::from_options(&options),
            Err(StorageError::Validation(_))
        ));
    }
}

use std::time::Duration;

use clap::Parser;
use todo_core::RepositoryOptions;
use todo_storage_cloudant::CloudantConfig;
use todo_storage_dynamodb::DynamoConfig;

use crate::backend::Backend;

/// Configuration for the todo-api server.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-api")]
#[command(about = "HTTP ToDo service over DynamoDB, Cloudant or in-memory storage")]
pub struct Config {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "TODO_HOST")]
    pub host: String,

    /// Port to bind to
    #[arg(long, default_value = "8080", env = "TODO_PORT")]
    pub port: u16,

    /// Storage backend
    #[arg(long, default_value = "memory", env = "TODO_BACKEND")]
    pub backend: Backend,

    /// Deadline for a single request, in seconds
    #[arg(long, default_value = "30", env = "TODO_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// DynamoDB table name
    #[arg(long, env = "DYNAMODB_TABLE")]
    pub dynamodb_table: Option<String>,

    /// DynamoDB endpoint override (e.g. http://localhost:8000)
    #[arg(long, env = "DYNAMODB_ENDPOINT")]
    pub dynamodb_endpoint: Option<String>,

    /// DynamoDB region override
    #[arg(long, env = "DYNAMODB_REGION")]
    pub dynamodb_region: Option<String>,

    /// Cloudant/CouchDB server URL
    #[arg(long, env = "CLOUDANT_HOST")]
    pub cloudant_host: Option<String>,

    /// Cloudant/CouchDB username
    #[arg(long, env = "CLOUDANT_USERNAME")]
    pub cloudant_username: Option<String>,

    /// Cloudant/CouchDB password
    #[arg(long, env = "CLOUDANT_PASSWORD", hide_env_values = true)]
    pub cloudant_password: Option<String>,

    /// Cloudant/CouchDB database name
    #[arg(long, env = "CLOUDANT_DB_NAME")]
    pub cloudant_db_name: Option<String>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Flatten the backend settings into the repository option map.
    pub fn repository_options(&self) -> RepositoryOptions {
        [
            (DynamoConfig::TABLE_OPTION, &self.dynamodb_table),
            (DynamoConfig::ENDPOINT_OPTION, &self.dynamodb_endpoint),
            (DynamoConfig::REGION_OPTION, &self.dynamodb_region),
            (CloudantConfig::HOST_OPTION, &self.cloudant_host),
            (CloudantConfig::USERNAME_OPTION, &self.cloudant_username),
            (CloudantConfig::PASSWORD_OPTION, &self.cloudant_password),
            (CloudantConfig::DB_NAME_OPTION, &self.cloudant_db_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
        .collect()
    }
}

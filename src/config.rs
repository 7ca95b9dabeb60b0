use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub aws_region: String,
    pub dynamodb_table: String,
    pub environment: String,
    /// Local DynamoDB endpoint override; unset in real deployments, where the
    /// SDK's default provider chain supplies region and credentials.
    pub dynamodb_endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
            dynamodb_table: std::env::var("DYNAMODB_TABLE")
                .unwrap_or_else(|_| "kbju_meals".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            dynamodb_endpoint: std::env::var("DYNAMODB_ENDPOINT").ok(),
        })
    }
}

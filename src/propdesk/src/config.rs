use clap::{Parser, ValueEnum};
use entity_core::{
    ItemStore,
    store::{DynamoStore, MemoryStore},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum StoreBackend {
    /// In-process table; data is lost on exit.
    #[default]
    Memory,
    /// DynamoDB, credentials from the default AWS provider chain.
    Dynamo,
}

/// Property-management work-order service
#[derive(Parser, Debug)]
#[command(name = "propdesk")]
#[command(about = "Work orders, properties and tenants on a single DynamoDB table")]
pub struct Config {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "PROPDESK_LISTEN")]
    pub listen: SocketAddr,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreBackend::Memory, env = "PROPDESK_STORE")]
    pub store: StoreBackend,

    /// DynamoDB table name
    #[arg(long, default_value = "propdesk", env = "PROPDESK_TABLE")]
    pub table: String,

    /// DynamoDB endpoint override (e.g. http://localhost:8000 for DynamoDB Local)
    #[arg(long, env = "PROPDESK_DYNAMO_ENDPOINT")]
    pub dynamo_endpoint: Option<String>,

    /// AWS region; falls back to the provider chain
    #[arg(long, env = "PROPDESK_REGION")]
    pub region: Option<String>,

    /// Page size for every list operation (defaults per access pattern)
    #[arg(long, env = "PROPDESK_PAGE_SIZE")]
    pub page_size: Option<u16>,

    /// Create the table and its indexes at start-up if missing
    #[arg(long, env = "PROPDESK_ENSURE_TABLE")]
    pub ensure_table: bool,
}

impl Config {
    pub async fn build_store(&self) -> anyhow::Result<Arc<dyn ItemStore>> {
        match self.store {
            StoreBackend::Memory => {
                info!("using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Dynamo => {
                let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
                if let Some(region) = &self.region {
                    loader = loader.region(aws_config::Region::new(region.clone()));
                }
                if let Some(endpoint) = &self.dynamo_endpoint {
                    loader = loader.endpoint_url(endpoint);
                }
                let sdk_config = loader.load().await;

                let store = DynamoStore::new(
                    aws_sdk_dynamodb::Client::new(&sdk_config),
                    self.table.clone(),
                );
                if self.ensure_table {
                    store.ensure_table().await?;
                }
                info!(
                    table = %store.table_name(),
                    endpoint = self.dynamo_endpoint.as_deref().unwrap_or("default"),
                    "using dynamodb store"
                );

                Ok(Arc::new(store))
            }
        }
    }
}

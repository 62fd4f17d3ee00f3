// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured blocking HTTP client.
pub fn create_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

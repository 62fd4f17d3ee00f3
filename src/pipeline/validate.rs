// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;

/// Validate configuration and keyword compilation, logging the effective values.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    match config.validate().and_then(|()| config.check_patterns()) {
        Ok(()) => {
            log::info!("Configuration is valid");
            log::info!("  User agent: {}", config.crawler.user_agent);
            log::info!("  Timeout: {}s", config.crawler.timeout_secs);
            log::info!(
                "  Limits: {} pages, depth {}, {}ms delay",
                config.crawler.max_pages,
                config.crawler.max_depth,
                config.crawler.delay_ms
            );
            log::info!("  Keywords: {}", config.matcher.keywords.len());
            log::info!("  Exclusions: {}", config.matcher.exclude.len());
            Ok(())
        }
        Err(e) => {
            log::error!("Validation failed: {}", e);
            Err(e)
        }
    }
}

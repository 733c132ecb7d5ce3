use std::{path::PathBuf, time::Duration};

use crate::{model::ids::SessionKey, service::api::rotation_repository::DEFAULT_BASE_URL};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Everything the application needs to start, assembled from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub session_key: SessionKey,
    pub request_timeout: Duration,
    pub initial_query: String,
    pub print_only: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_key: SessionKey::random(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            initial_query: String::new(),
            print_only: false,
            log_file: None,
        }
    }
}

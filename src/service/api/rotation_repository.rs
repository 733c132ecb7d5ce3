use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::Config,
    model::{champion::ChampionRotation, ids::SessionKey},
};

use super::http_client::{Headers, HttpClient, HttpClientError, HttpTransport, ReqwestTransport};

pub const DEFAULT_BASE_URL: &str = "https://lol-champion-rotation.fly.dev";
pub const SESSION_KEY_HEADER: &str = "X-Session-Key";
const CURRENT_ROTATION_PATH: &str = "rotation/current";

/// The only failure callers of the repository ever see. Network errors,
/// non-2xx statuses and malformed payloads all end up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CurrentRotationError {
    #[error("The champion rotation is currently unavailable")]
    Unavailable,
}

#[async_trait]
pub trait RotationSource: Send + Sync {
    async fn current_rotation(&self) -> Result<ChampionRotation, CurrentRotationError>;
}

pub struct RotationRepository<T> {
    client: HttpClient<T>,
    url: String,
    session_key: SessionKey,
}

impl<T: HttpTransport> RotationRepository<T> {
    pub fn new(transport: T, base_url: &str, session_key: SessionKey) -> Self {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), CURRENT_ROTATION_PATH);
        Self {
            client: HttpClient::new(transport),
            url,
            session_key,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

impl RotationRepository<ReqwestTransport> {
    pub fn from_config(config: &Config) -> Result<Self, HttpClientError> {
        let transport = ReqwestTransport::with_timeout(config.request_timeout)?;
        Ok(Self::new(transport, &config.base_url, config.session_key.clone()))
    }
}

#[async_trait]
impl<T: HttpTransport> RotationSource for RotationRepository<T> {
    async fn current_rotation(&self) -> Result<ChampionRotation, CurrentRotationError> {
        let headers = Headers::from([(
            SESSION_KEY_HEADER.to_string(),
            self.session_key.as_str().to_string(),
        )]);

        debug!(url = %self.url, "requesting current rotation");
        self.client
            .get::<ChampionRotation>(&self.url, &headers)
            .await
            .map_err(|error| {
                warn!(url = %self.url, %error, "current rotation request failed");
                CurrentRotationError::Unavailable
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{model::champion::Champion, service::api::testing::ScriptedTransport};

    fn repository(transport: &ScriptedTransport) -> RotationRepository<ScriptedTransport> {
        RotationRepository::new(
            transport.clone(),
            "https://rotation.test/",
            SessionKey::from("session-1".to_string()),
        )
    }

    #[tokio::test]
    async fn returns_decoded_rotation() {
        let transport = ScriptedTransport::new();
        transport.respond(
            200,
            json!({
                "beginnerMaxLevel": 10,
                "beginnerChampions": [{ "id": "1", "name": "Annie", "imageUrl": "u1" }],
                "regularChampions": [{ "id": "2", "name": "Ashe", "imageUrl": "u2" }]
            }),
        );

        let rotation = repository(&transport).current_rotation().await.unwrap();

        assert_eq!(
            rotation,
            ChampionRotation {
                beginner_max_level: 10,
                beginner_champions: vec![Champion::new("1", "Annie", "u1")],
                regular_champions: vec![Champion::new("2", "Ashe", "u2")],
            }
        );
    }

    #[tokio::test]
    async fn sends_session_key_to_fixed_endpoint() {
        let transport = ScriptedTransport::new();
        transport.respond(
            200,
            json!({ "beginnerMaxLevel": 10, "beginnerChampions": [], "regularChampions": [] }),
        );

        repository(&transport).current_rotation().await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url.as_str(), "https://rotation.test/rotation/current");
        assert_eq!(
            request.headers.get(SESSION_KEY_HEADER).map(String::as_str),
            Some("session-1")
        );
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let transport = ScriptedTransport::new();
        transport.respond_raw(500, "internal error");

        let result = repository(&transport).current_rotation().await;

        assert_eq!(result, Err(CurrentRotationError::Unavailable));
    }

    #[tokio::test]
    async fn missing_tier_is_unavailable() {
        let transport = ScriptedTransport::new();
        transport.respond(200, json!({ "beginnerMaxLevel": 10, "beginnerChampions": [] }));

        let result = repository(&transport).current_rotation().await;

        assert_eq!(result, Err(CurrentRotationError::Unavailable));
    }

    #[tokio::test]
    async fn network_failure_is_unavailable() {
        let transport = ScriptedTransport::new();
        transport.fail("dns lookup failed");

        let result = repository(&transport).current_rotation().await;

        assert_eq!(result, Err(CurrentRotationError::Unavailable));
    }

    #[tokio::test]
    async fn never_retries_on_its_own() {
        let transport = ScriptedTransport::new();
        transport.respond_raw(503, "busy");

        let _ = repository(&transport).current_rotation().await;

        assert_eq!(transport.request_count(), 1);
    }
}

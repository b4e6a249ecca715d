/// Repository-dispatch client
///
/// Sends a submitted artwork to GitHub as an `artwork-submission` event. A
/// workflow in the repository appends it to `data.json` and commits; that
/// side is not handled here, only the shape of the outbound event.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;

use crate::config::PortfolioConfig;
use crate::error::DispatchError;
use crate::state::data::Artwork;

pub const EVENT_TYPE: &str = "artwork-submission";

/// Anything that can forward a new artwork to the remote tier
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, artwork: &Artwork) -> Result<(), DispatchError>;
}

/// Request body: `{ event_type, client_payload: { artwork } }`
#[derive(Serialize)]
pub struct DispatchEvent<'a> {
    event_type: &'static str,
    client_payload: ClientPayload<'a>,
}

#[derive(Serialize)]
struct ClientPayload<'a> {
    artwork: &'a Artwork,
}

impl<'a> DispatchEvent<'a> {
    pub fn new(artwork: &'a Artwork) -> Self {
        Self {
            event_type: EVENT_TYPE,
            client_payload: ClientPayload { artwork },
        }
    }
}

/// Dispatches to `POST /repos/{owner}/{repo}/dispatches`
pub struct GitHubDispatcher {
    client: reqwest::Client,
    endpoint: String,
    repository: String,
    token: Option<String>,
}

impl GitHubDispatcher {
    pub fn new(config: &PortfolioConfig) -> Self {
        // No request timeout beyond the transport defaults
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: config.dispatch_url(),
            repository: config.repository(),
            token: config.github_token.clone(),
        }
    }
}

#[async_trait]
impl Dispatcher for GitHubDispatcher {
    async fn dispatch(&self, artwork: &Artwork) -> Result<(), DispatchError> {
        // Checked before any request is built: a missing token never hits the network
        let authorization = authorization_header(self.token.as_deref())?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/vnd.github+json")
            .json(&DispatchEvent::new(artwork))
            .send()
            .await
            .map_err(|e| DispatchError::Transient(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), artwork = %artwork.id, "dispatch response");
        classify_status(status, &self.repository)
    }
}

/// Build the bearer header, rejecting absent or unusable tokens
pub fn authorization_header(token: Option<&str>) -> Result<HeaderValue, DispatchError> {
    let token = token.ok_or(DispatchError::CredentialMissing)?;
    if token.is_empty() {
        return Err(DispatchError::CredentialMissing);
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(DispatchError::CredentialMalformed);
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| DispatchError::CredentialMalformed)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Map a dispatch response status onto the error taxonomy. Only 204 succeeds.
pub fn classify_status(status: StatusCode, repository: &str) -> Result<(), DispatchError> {
    match status {
        StatusCode::NO_CONTENT => Ok(()),
        StatusCode::UNAUTHORIZED => Err(DispatchError::AuthenticationRejected),
        StatusCode::FORBIDDEN => Err(DispatchError::AuthorizationInsufficient),
        StatusCode::NOT_FOUND => Err(DispatchError::RemoteNotFound {
            repository: repository.to_string(),
        }),
        other => Err(DispatchError::Transient(format!("unexpected status {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::artwork;

    #[test]
    fn test_event_body_shape() {
        let artwork = artwork("Dispatched");
        let body = serde_json::to_value(DispatchEvent::new(&artwork)).unwrap();

        assert_eq!(body["event_type"], "artwork-submission");
        assert_eq!(body["client_payload"]["artwork"]["title"], "Dispatched");
        assert_eq!(body["client_payload"]["artwork"]["id"], artwork.id.as_str());
        assert!(body["client_payload"]["artwork"]["dateCreated"].is_string());
    }

    #[test]
    fn test_status_taxonomy() {
        let repo = "owner/repo";
        assert_eq!(classify_status(StatusCode::NO_CONTENT, repo), Ok(()));
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, repo),
            Err(DispatchError::AuthenticationRejected)
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, repo),
            Err(DispatchError::AuthorizationInsufficient)
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, repo),
            Err(DispatchError::RemoteNotFound {
                repository: repo.to_string()
            })
        );
        // 200 is not the documented success response
        for status in [StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY, StatusCode::BAD_GATEWAY] {
            assert!(matches!(
                classify_status(status, repo),
                Err(DispatchError::Transient(_))
            ));
        }
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(authorization_header(None), Err(DispatchError::CredentialMissing));
        assert_eq!(authorization_header(Some("")), Err(DispatchError::CredentialMissing));
        assert_eq!(
            authorization_header(Some("ghp_abc def")),
            Err(DispatchError::CredentialMalformed)
        );
        assert_eq!(
            authorization_header(Some("ghp_abc\n")),
            Err(DispatchError::CredentialMalformed)
        );

        let header = authorization_header(Some("ghp_abc123")).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer ghp_abc123");
        assert!(header.is_sensitive());
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_network() {
        let config = PortfolioConfig::from_lookup(|name| match name {
            "PORTFOLIO_DATA_DIR" => Some("/tmp/portfolio-dispatch-test".to_string()),
            // A real request here would fail as Transient, not CredentialMissing
            "PORTFOLIO_GITHUB_API" => Some("http://127.0.0.1:9".to_string()),
            _ => None,
        })
        .unwrap();
        let dispatcher = GitHubDispatcher::new(&config);

        let result = dispatcher.dispatch(&artwork("Offline")).await;

        assert_eq!(result, Err(DispatchError::CredentialMissing));
    }
}

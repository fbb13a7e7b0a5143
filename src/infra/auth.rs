use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::common::constants::{OAUTH_AUTHORIZE_PATH, OAUTH_CALLBACK_PATH, OAUTH_TOKEN_PATH};
use crate::common::error::{BrandingError, Result};
use crate::infra::http_client::DracoonClient;

/// OAuth grant used to log in to the target instance.
#[derive(Debug, Clone)]
pub enum Grant {
    Password { username: String, password: String },
    AuthorizationCode { code: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth app registered on the target instance.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: Option<String>,
}

impl OAuthClient {
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.filter(|s| !s.is_empty()),
        }
    }

    /// The authorization code grant needs a client secret; without one we fall back to the password grant.
    pub fn uses_authorization_code(&self, requested: bool) -> bool {
        requested && self.client_secret.is_some()
    }

    fn redirect_uri(base_url: &str) -> String {
        format!("{}{}", base_url, OAUTH_CALLBACK_PATH)
    }

    /// Url the user opens in a browser to obtain an authorization code.
    pub fn authorization_url(&self, base_url: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}{}", base_url, OAUTH_AUTHORIZE_PATH),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", Self::redirect_uri(base_url).as_str()),
                ("scope", "all"),
            ],
        )
        .map_err(|e| BrandingError::Config(format!("invalid authorization url: {}", e)))?;
        Ok(url.to_string())
    }

    /// Exchanges the grant for an access token and returns the authenticated session.
    pub async fn authenticate(&self, client: DracoonClient, grant: Grant) -> Result<DracoonClient> {
        let redirect_uri = Self::redirect_uri(client.base_url());
        let form: Vec<(&str, String)> = match grant {
            Grant::Password { username, password } => vec![
                ("grant_type", "password".to_string()),
                ("username", username),
                ("password", password),
            ],
            Grant::AuthorizationCode { code } => vec![
                ("grant_type", "authorization_code".to_string()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ],
        };

        let builder = client
            .http()
            .post(format!("{}{}", client.base_url(), OAUTH_TOKEN_PATH))
            .basic_auth(&self.client_id, Some(self.client_secret.clone().unwrap_or_default()))
            .form(&form);

        let resp = match DracoonClient::send_checked(builder).await {
            Ok(resp) => resp,
            Err(BrandingError::Remote { status, .. }) if status == 400 || status == 401 => {
                return Err(BrandingError::Authentication(format!(
                    "wrong credentials or client ({})",
                    status
                )));
            }
            Err(e) => return Err(e),
        };
        let token: TokenResponse = DracoonClient::read_json(resp).await?;
        info!("Authenticated against {}", client.base_url());
        Ok(client.with_access_token(token.access_token))
    }
}

//! Google OAuth Client
//!
//! Authorization-code exchange and authenticated profile fetch against
//! Google's OAuth 2.0 endpoints. Configuration is injected at
//! construction; nothing here is process-wide.

use std::collections::HashMap;

use serde::Deserialize;

use crate::application::config::GoogleOAuthConfig;
use crate::application::resolve_identity::GoogleProfile;
use crate::error::{IdentityError, IdentityResult};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email \
                      https://www.googleapis.com/auth/userinfo.profile";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for Google's OAuth endpoints
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// URL of the consent page, carrying the CSRF `state`
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = reqwest::Url::parse(AUTH_URL).expect("valid google auth url");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .append_pair("access_type", "offline");
        url.to_string()
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> IdentityResult<String> {
        let mut params = HashMap::new();
        params.insert("code", code.to_string());
        params.insert("client_id", self.config.client_id.clone());
        params.insert("client_secret", self.config.client_secret.clone());
        params.insert("redirect_uri", self.config.redirect_url.clone());
        params.insert("grant_type", "authorization_code".to_string());

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::OAuthExchange(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::OAuthExchange(format!(
                "token request returned status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            IdentityError::OAuthExchange(format!("invalid token response: {}", e))
        })?;

        Ok(token.access_token)
    }

    /// Fetch the verified profile for an access token
    pub async fn fetch_profile(&self, access_token: &str) -> IdentityResult<GoogleProfile> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::OAuthExchange(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::OAuthExchange(format!(
                "userinfo returned status {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            IdentityError::OAuthExchange(format!("invalid userinfo response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_state_and_redirect() {
        let client = GoogleOAuthClient::new(GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "http://localhost:8080/api/identity/google/callback".to_string(),
        });

        let url = client.authorize_url("state-xyz");
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=state-xyz"));
        assert!(url.contains("response_type=code"));
        // The secret must never appear in the consent URL
        assert!(!url.contains("secret"));
    }
}

use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::env;
use url::Url;

use crate::models::google_auth::GoogleUserInfo;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug)]
pub enum GoogleAuthError {
    Exchange(String),
    UserInfo(String),
}

impl std::fmt::Display for GoogleAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleAuthError::Exchange(message) => write!(f, "code exchange failed: {}", message),
            GoogleAuthError::UserInfo(message) => write!(f, "userinfo fetch failed: {}", message),
        }
    }
}

/// Google sign-in over the authorization-code flow. Built per request from
/// environment configuration; Google tokens are used once for the userinfo
/// lookup and never stored.
pub struct GoogleAuth {
    oauth: BasicClient,
    http: reqwest::Client,
}

impl GoogleAuth {
    pub fn from_env() -> Self {
        let client_id =
            env::var("GOOGLE_CLIENT_ID").expect("Missing GOOGLE_CLIENT_ID environment variable");
        let client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .expect("Missing GOOGLE_CLIENT_SECRET environment variable");
        let redirect_url = env::var("GOOGLE_REDIRECT_URI")
            .expect("Missing GOOGLE_REDIRECT_URI environment variable");

        let oauth = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(AUTH_ENDPOINT.to_string()).expect("Invalid authorization endpoint URL"),
            Some(TokenUrl::new(TOKEN_ENDPOINT.to_string()).expect("Invalid token endpoint URL")),
        )
        .set_redirect_uri(RedirectUrl::new(redirect_url).expect("Invalid redirect URL"));

        GoogleAuth {
            oauth,
            http: reqwest::Client::new(),
        }
    }

    /// Where to send the browser, plus the state value riding along.
    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        self.oauth
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url()
    }

    pub async fn exchange_code(&self, code: AuthorizationCode) -> Result<String, GoogleAuthError> {
        self.oauth
            .exchange_code(code)
            .request_async(async_http_client)
            .await
            .map(|token| token.access_token().secret().clone())
            .map_err(|e| GoogleAuthError::Exchange(e.to_string()))
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<GoogleUserInfo, GoogleAuthError> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleAuthError::UserInfo(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::UserInfo(format!(
                "Google answered {}",
                response.status()
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| GoogleAuthError::UserInfo(e.to_string()))
    }
}

use serde::{Deserialize, Serialize};

/// Query parameters Google appends to the OAuth redirect back to us.
#[derive(Debug, Deserialize)]
pub struct GoogleAuthCallbackParams {
    pub code: String,
    pub state: String,
    pub error: Option<String>,
}

/// Subset of the Google userinfo payload the signup/signin path needs.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    pub verified_email: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

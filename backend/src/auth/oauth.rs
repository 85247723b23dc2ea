//! Parsing of the implicit-grant redirect fragment.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::errors::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFragment {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Parses `#access_token=..&state=..`; accepts a full redirect URL as well.
pub fn parse_fragment(input: &str) -> Result<OAuthFragment, AuthError> {
    let fragment = input.split_once('#').map_or(input, |(_, fragment)| fragment);

    let mut token = None;
    let mut parsed = OAuthFragment {
        token: String::new(),
        state: None,
        token_type: None,
        expires_in: None,
        scope: None,
    };

    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "access_token" => token = Some(value),
            "state" => parsed.state = Some(value),
            "token_type" => parsed.token_type = Some(value),
            "expires_in" => parsed.expires_in = Some(value),
            "scope" => parsed.scope = Some(value),
            "error" => return Err(AuthError::Denied(value)),
            _ => {}
        }
    }

    parsed.token = token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAccessToken)?;
    Ok(parsed)
}

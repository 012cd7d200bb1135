use serde::{Deserialize, Serialize};

/// Request body for an invitation. Defaults let an absent field fall through
/// to validation instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: String,
}

/// Request body for registration, paired with the bearer invite token.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response for a successful invitation. The token is echoed to the caller,
/// but delivery failure is authoritative: on a 500 the token must be treated
/// as unsent.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub message: String,
    pub invite_token: String,
}

/// Response returned after login. The same tokens also travel as cookies.
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Generic acknowledgment body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_to_empty_strings() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(req.username, "alice");
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn token_pair_serializes_both_tokens() {
        let json = serde_json::to_string(&TokenPairResponse {
            access_token: "aaa".into(),
            refresh_token: "rrr".into(),
        })
        .unwrap();
        assert!(json.contains("\"access_token\":\"aaa\""));
        assert!(json.contains("\"refresh_token\":\"rrr\""));
    }
}

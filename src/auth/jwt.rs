use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles whose bearers may manage the catalog.
pub const STAFF_ROLES: [&str; 2] = ["ADMIN", "SUPER_ADMIN"];

/// JWT claims issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account identifier.
    pub sub: String,
    /// Account role, e.g. `"USER"`, `"ADMIN"` or `"SUPER_ADMIN"`.
    pub role: String,
    /// Token type. Tokens without one are treated as access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Unique JWT identifier.
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Whether the role grants catalog management.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        STAFF_ROLES.contains(&self.role.as_str())
    }
}

/// Sign an access token for `subject` with the given role and lifetime.
///
/// The service itself never hands these out; the identity service does, with the
/// same shared secret.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_access_token(
    subject: &str,
    role: &str,
    ttl_secs: i64,
    secret: &str,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        token_type: Some("access".to_string()),
        exp: now + ttl_secs,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not an access token.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid access token: {e}"))?;

    if token_data
        .claims
        .token_type
        .as_deref()
        .is_some_and(|t| t != "access")
    {
        return Err(anyhow::anyhow!("Token is not an access token"));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    #[test]
    fn test_round_trip_keeps_role() {
        let token = generate_access_token("acct-1", "ADMIN", 900, SECRET).unwrap_or_default();
        let claims = validate_access_token(&token, SECRET).ok();
        assert_eq!(claims.as_ref().map(|c| c.sub.as_str()), Some("acct-1"));
        assert!(claims.is_some_and(|c| c.is_staff()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_access_token("acct-1", "ADMIN", 900, SECRET).unwrap_or_default();
        assert!(validate_access_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_rejected() {
        let token = generate_access_token("acct-1", "ADMIN", -3600, SECRET).unwrap_or_default();
        assert!(validate_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_staff_roles() {
        let mut claims = Claims {
            sub: String::new(),
            role: "SUPER_ADMIN".to_string(),
            token_type: None,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(claims.is_staff());
        claims.role = "USER".to_string();
        assert!(!claims.is_staff());
        claims.role = "admin".to_string();
        assert!(!claims.is_staff());
    }
}

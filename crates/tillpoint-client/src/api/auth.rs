//! # Authentication API Client
//!
//! REST client for the authentication endpoints, behind the [`AuthBackend`]
//! seam the session manager depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientResult;
use crate::http::Http;
use crate::session::Credential;

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeTokenRequest<'a> {
    refresh_token: &'a str,
}

/// Credential fields as issued by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    user_id: String,
    tenant_id: String,
    role: String,
    email: String,
}

impl From<AuthResponse> for Credential {
    fn from(r: AuthResponse) -> Self {
        Credential {
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            user_id: r.user_id,
            tenant_id: r.tenant_id,
            role: r.role,
            email: r.email,
        }
    }
}

// =============================================================================
// AuthBackend Seam
// =============================================================================

/// The authentication collaborator consumed by the session manager.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges credentials for a token pair.
    async fn login(&self, email: &str, password: &str) -> ClientResult<Credential>;

    /// Creates an account and returns its first token pair.
    async fn register(&self, request: &RegisterRequest) -> ClientResult<Credential>;

    /// Exchanges a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<Credential>;

    /// Invalidates a refresh token server-side.
    async fn revoke(&self, refresh_token: &str) -> ClientResult<()>;
}

// =============================================================================
// REST Implementation
// =============================================================================

/// REST authentication client.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: Http,
}

impl AuthApi {
    pub fn new(http: Http) -> Self {
        AuthApi { http }
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn login(&self, email: &str, password: &str) -> ClientResult<Credential> {
        debug!(email = %email, "Logging in");
        let response: AuthResponse = self
            .http
            .post("auth/login", None, &LoginRequest { email, password })
            .await?;
        Ok(response.into())
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<Credential> {
        debug!(email = %request.email, "Registering account");
        let response: AuthResponse = self.http.post("auth/register", None, request).await?;
        Ok(response.into())
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<Credential> {
        let response: AuthResponse = self
            .http
            .post("auth/refresh", None, &RefreshTokenRequest { refresh_token })
            .await?;
        Ok(response.into())
    }

    async fn revoke(&self, refresh_token: &str) -> ClientResult<()> {
        // The server answers an empty object on success
        let _: serde_json::Value = self
            .http
            .post("auth/revoke", None, &RevokeTokenRequest { refresh_token })
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_into_credential() {
        let response: AuthResponse = serde_json::from_str(
            r#"{
                "accessToken": "a.b.c",
                "refreshToken": "r-1",
                "userId": "u1",
                "tenantId": "t1",
                "role": "cashier",
                "email": "maria@example.com"
            }"#,
        )
        .unwrap();

        let credential: Credential = response.into();
        assert_eq!(credential.access_token, "a.b.c");
        assert_eq!(credential.refresh_token, "r-1");
        assert_eq!(credential.role, "cashier");
    }

    #[test]
    fn test_login_request_wire_shape() {
        let json = serde_json::to_value(LoginRequest {
            email: "maria@example.com",
            password: "secret",
        })
        .unwrap();
        assert_eq!(json["email"], "maria@example.com");
        assert_eq!(json["password"], "secret");
    }
}

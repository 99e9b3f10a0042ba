//! Caller identity.
//!
//! Authentication happens upstream: the identity gateway verifies the
//! session and forwards the subject and profile claims as request headers.
//! This module turns those headers into an [`AuthContext`], creating the
//! local user record the first time a subject is seen.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use proctor_shared::Role;
use proctor_store::{StoreError, User, UserRepository};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const EMAIL_HEADER: &str = "x-user-email";
pub const FIRST_NAME_HEADER: &str = "x-user-first-name";
pub const LAST_NAME_HEADER: &str = "x-user-last-name";
pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

/// Identity claims forwarded by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityClaims {
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl IdentityClaims {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let external_id = header(headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthenticated("Authentication required".into()))?;

        Ok(Self {
            external_id: external_id.to_string(),
            email: header(headers, EMAIL_HEADER).map(str::to_string),
            first_name: header(headers, FIRST_NAME_HEADER).map(str::to_string),
            last_name: header(headers, LAST_NAME_HEADER).map(str::to_string),
        })
    }
}

/// Reject the request unless it carries the configured gateway secret.
pub fn verify_gateway_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let presented = header(headers, GATEWAY_SECRET_HEADER).unwrap_or("");

    // Constant-time comparison to avoid leaking the secret through timing.
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() || presented.ct_eq(expected).unwrap_u8() != 1 {
        return Err(ApiError::Unauthenticated("Invalid gateway credentials".into()));
    }
    Ok(())
}

/// Find the local user for `claims`, registering one on first contact.
pub fn resolve_identity<S: UserRepository>(
    store: &S,
    claims: &IdentityClaims,
    config: &ServerConfig,
) -> Result<User, ApiError> {
    if let Some(user) = store.find_user_by_external_id(&claims.external_id)? {
        return Ok(user);
    }

    let Some(email) = claims.email.as_deref() else {
        return Err(ApiError::Unauthenticated(
            "Unknown user; an email claim is required to register".into(),
        ));
    };

    let role = if config.is_bootstrap_admin(email) {
        Role::Admin
    } else {
        Role::Student
    };
    let user = User::new(
        claims.external_id.clone(),
        email,
        claims.first_name.clone().unwrap_or_default(),
        claims.last_name.clone().unwrap_or_default(),
        role,
    );

    match store.insert_user(&user) {
        Ok(()) => {
            tracing::info!(user_id = %user.id, role = %user.role, "registered user on first contact");
            Ok(user)
        }
        Err(StoreError::Conflict(message)) => {
            // a concurrent first request may have created the row already
            match store.find_user_by_external_id(&claims.external_id)? {
                Some(existing) => Ok(existing),
                None => Err(ApiError::Conflict(message)),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// The resolved caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }

    /// Users may act on their own records; admins on anyone's.
    pub fn ensure_self_or_admin(&self, user: &User) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id == user.id {
            Ok(())
        } else {
            Err(ApiError::forbidden("You may only access your own records"))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify_gateway_secret(&parts.headers, state.config.gateway_secret.as_deref())?;
        let claims = IdentityClaims::from_headers(&parts.headers)?;

        let db = state.db.lock().await;
        let user = resolve_identity(&*db, &claims, &state.config)?;

        Ok(AuthContext {
            user_id: user.id,
            role: user.role,
        })
    }
}

/// An admin caller. Rejects non-admins before the request body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminContext(pub AuthContext);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        auth.require_admin()?;
        Ok(Self(auth))
    }
}

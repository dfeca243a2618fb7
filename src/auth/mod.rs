//! Authentication context for request handlers.
//!
//! Identity and role resolution live outside this service; requests arrive
//! with a signed JWT carrying the already-resolved account id and role tag.
//! This module decodes that token into an [`AuthContext`] that every service
//! operation takes explicitly. Nothing reads ambient session state.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::entity::prelude::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ServiceError, AppState};

/// Closed set of role tags the identity provider can resolve to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "office_supervisor")]
    OfficeSupervisor,
    #[sea_orm(string_value = "office_staff")]
    OfficeStaff,
    #[sea_orm(string_value = "field_supervisor")]
    FieldSupervisor,
    #[sea_orm(string_value = "field_staff")]
    FieldStaff,
    #[sea_orm(string_value = "inventory_staff")]
    InventoryStaff,
    #[sea_orm(string_value = "accounting_staff")]
    AccountingStaff,
    #[sea_orm(string_value = "user")]
    User,
}

/// Roles that receive every notification regardless of the declared target set.
pub const MANAGER_EQUIVALENT: [Role; 2] = [Role::Admin, Role::Manager];

impl Role {
    /// Admin-equivalent roles may drive any lifecycle transition and the
    /// admin-only custody/price operations.
    pub fn is_admin_equivalent(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Anything above the base `user` role. Tools are only handed out to
    /// base-role accounts.
    pub fn is_privileged(self) -> bool {
        !matches!(self, Role::User)
    }
}

/// JWT claims issued by the identity collaborator.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    /// Resolved role tag
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Resolved actor passed into every service operation.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub account_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(account_id: Uuid, role: Role) -> Self {
        Self { account_id, role }
    }

    /// Errors with `Forbidden` unless the actor is admin-equivalent.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.role.is_admin_equivalent() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "this operation requires an administrator role".into(),
            ))
        }
    }
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            account_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Decode and validate a bearer token into its claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))
}

/// Issue a token for the given account. Used by tests and tooling; real
/// tokens come from the identity service.
pub fn issue_token(
    account_id: Uuid,
    role: Role,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, ServiceError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: account_id,
        role,
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {}", e)))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("no authenticated actor".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("malformed authorization header".into()))?;

        let claims = decode_token(token, &state.config.jwt_secret)?;
        Ok(AuthContext::from(&claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_actor() {
        let account = Uuid::new_v4();
        let token = issue_token(account, Role::FieldStaff, "test-secret", 3600).unwrap();
        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, account);
        assert_eq!(claims.role, Role::FieldStaff);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_token(Uuid::new_v4(), Role::User, "secret-a", 3600).unwrap();
        let err = decode_token(&token, "secret-b").unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn privilege_tiers() {
        assert!(Role::Admin.is_admin_equivalent());
        assert!(Role::Manager.is_admin_equivalent());
        assert!(!Role::FieldSupervisor.is_admin_equivalent());
        assert!(Role::FieldStaff.is_privileged());
        assert!(!Role::User.is_privileged());
    }
}

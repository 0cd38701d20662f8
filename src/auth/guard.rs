//! Request admission predicates.
//!
//! Each guard takes the verified claims (if any token verified) plus route
//! context and either admits the request, handing back the claims, or
//! rejects it with [`Unauthorized`]. Guards have no side effects, so the
//! HTTP layer can mount them as route middleware and tests can call them
//! directly.

use thiserror::Error;

use super::AuthorizationClaims;

/// The single rejection outcome of every guard. Missing, invalid, expired
/// and insufficient credentials are deliberately indistinguishable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unauthorized")]
pub struct Unauthorized;

pub fn require_authenticated(claims: Option<&AuthorizationClaims>) -> Result<&AuthorizationClaims, Unauthorized> {
    claims.ok_or(Unauthorized)
}

pub fn require_admin(claims: Option<&AuthorizationClaims>) -> Result<&AuthorizationClaims, Unauthorized> {
    let claims = require_authenticated(claims)?;
    if claims.is_admin {
        Ok(claims)
    } else {
        Err(Unauthorized)
    }
}

pub fn require_self_or_admin<'a>(
    claims: Option<&'a AuthorizationClaims>,
    route_username: &str,
) -> Result<&'a AuthorizationClaims, Unauthorized> {
    let claims = require_authenticated(claims)?;
    if claims.is_admin || claims.username == route_username {
        Ok(claims)
    } else {
        Err(Unauthorized)
    }
}

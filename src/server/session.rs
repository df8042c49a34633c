use super::state::ServerState;
use crate::authorization::Identity;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims carried by the access tokens this server accepts. Tokens are
/// issued elsewhere, the `id` claim is the caller's identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub exp: u64,
}

pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(Identity::new(token_data.claims.id))
    }
}

#[derive(Debug)]
pub struct Session {
    pub identity: Identity,
}

#[derive(Debug)]
pub enum SessionExtractionError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        let message = match self {
            SessionExtractionError::MissingToken => "Missing authentication",
            SessionExtractionError::InvalidToken => "Invalid access token",
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts).ok_or_else(|| {
            debug!("No bearer token in headers.");
            SessionExtractionError::MissingToken
        })?;

        let identity = ctx.token_verifier.verify(token).map_err(|err| {
            debug!("Rejected access token: {}", err);
            SessionExtractionError::InvalidToken
        })?;

        Ok(Session { identity })
    }
}

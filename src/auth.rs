use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, DecodingKey};
use serde_derive::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::{errors::ServerError, AppState};

/// Claims of the bearer token issued by the identity gateway. This service
/// only verifies tokens, it never issues them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

/// The verified requesting identity, extracted from the Authorization
/// header of every protected route.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
}

impl FromRequest for AuthedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authed_user_from_request(req))
    }
}

fn authed_user_from_request(req: &HttpRequest) -> Result<AuthedUser, ServerError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(ServerError::EnvironmentError)?;

    let token = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").trim())
        .filter(|s| !s.is_empty())
        .ok_or(ServerError::InvalidCredentials)?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.secret.as_bytes()),
        &state.jwt_validation,
    )?;

    Ok(AuthedUser {
        id: data.claims.sub,
        username: data.claims.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header, Validation};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn token_for(sub: &str, username: &str, secret: &str, exp_offset_secs: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            exp: (now + exp_offset_secs) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_claims_round_trip() {
        let token = token_for("u_1", "alice", "test-secret", 3600);
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "u_1");
        assert_eq!(data.claims.username, "alice");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = token_for("u_1", "alice", "test-secret", -3600);
        let res = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = token_for("u_1", "alice", "test-secret", 3600);
        let res = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(res.is_err());
    }
}

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Source of "now" for token issue and expiry checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Token generation failed: {0}")]
    Signing(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Issues and verifies HS256 bearer tokens. Verification never touches the store.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        // Expiry is checked against the injected clock, not the library's wall clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Returns the subject of a token with a valid signature that has not expired.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::InvalidToken("token has expired".to_string()));
        }

        Ok(data.claims.sub)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::minutes(30)).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let tokens = service("secret-a");
        let token = tokens.issue("mistborn@cosmere.com").unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), "mistborn@cosmere.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let clock = Arc::new(ManualClock(Mutex::new(Utc::now())));
        let tokens = service("secret-a").with_clock(clock.clone());
        let token = tokens.issue("user@example.com").unwrap();

        clock.advance(Duration::minutes(29));
        assert!(tokens.verify(&token).is_ok());

        clock.advance(Duration::minutes(1));
        assert!(matches!(tokens.verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let token = service("secret-a").issue("user@example.com").unwrap();

        assert!(matches!(
            service("secret-b").verify(&token),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let tokens = service("secret-a");
        for garbage in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(matches!(tokens.verify(garbage), Err(TokenError::InvalidToken(_))));
        }
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service("secret-a");
        let token = tokens.issue("user@example.com").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = service("secret-a").issue("admin@example.com").unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;

        assert!(tokens.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            TokenService::new("", Duration::minutes(30)),
            Err(TokenError::MissingSecret)
        ));
    }
}

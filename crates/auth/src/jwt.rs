//! Bearer-token verification and issuance (HMAC-signed JWTs).

use core::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use fixit_core::UserId;

use crate::{AuthError, Claims, ConfigError, Role, TokenClaims};

/// Algorithm used when none is configured.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Process-wide key material, loaded once at startup.
#[derive(Clone)]
pub struct SigningConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl SigningConfig {
    /// Build signing configuration.
    ///
    /// An empty secret is a fatal configuration error. Only the HMAC family
    /// is accepted since the key is a shared secret.
    pub fn new(secret: impl Into<Vec<u8>>, algorithm: Option<&str>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let algorithm = match algorithm.map(str::trim).filter(|a| !a.is_empty()) {
            None => DEFAULT_ALGORITHM,
            Some(name) => match Algorithm::from_str(name) {
                Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
                _ => return Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
            },
        };

        Ok(Self { secret, algorithm })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl core::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// First stage of the guard chain: raw token in, verified claims out.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, raw_token: &str) -> Result<Claims, AuthError>;
}

/// Verifies HMAC-signed JWTs against the process-wide secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &SigningConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        // Expiry is compared against the wall clock exactly.
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(&config.secret),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, raw_token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<TokenClaims>(raw_token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedOrInvalidSignature,
            })?;

        let claims = data.claims;
        let subject_id = claims
            .subject()
            .map(str::to_string)
            .ok_or(AuthError::MissingSubject)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::MalformedOrInvalidSignature)?;

        Ok(Claims {
            subject_id,
            role: claims.role,
            expires_at,
        })
    }
}

/// Mints tokens at login, using the same key material as [`JwtVerifier`].
pub struct JwtIssuer {
    key: EncodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(config: &SigningConfig, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(&config.secret),
            algorithm: config.algorithm,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = TokenClaims {
            id: Some(user_id.to_string()),
            role: Some(role.as_str().to_string()),
            exp: (now + self.ttl).timestamp(),
            iat: Some(now.timestamp()),
            ..TokenClaims::default()
        };
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> SigningConfig {
        SigningConfig::new(secret, None).unwrap()
    }

    fn sign(secret: &str, claims: &serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp()
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert_eq!(SigningConfig::new("", None).unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn algorithm_defaults_to_hs256_and_rejects_asymmetric() {
        assert_eq!(config("s").algorithm(), Algorithm::HS256);
        assert_eq!(
            SigningConfig::new("s", Some("HS512")).unwrap().algorithm(),
            Algorithm::HS512
        );
        assert_eq!(
            SigningConfig::new("s", Some("RS256")).unwrap_err(),
            ConfigError::UnsupportedAlgorithm("RS256".to_string())
        );
    }

    #[test]
    fn issued_tokens_verify_with_subject_and_role() {
        let cfg = config("test-secret");
        let user_id = UserId::new();
        let token = JwtIssuer::new(&cfg, Duration::days(60))
            .issue(user_id, Role::Authorities, Utc::now())
            .unwrap();

        let claims = JwtVerifier::new(&cfg).verify(&token).unwrap();
        assert_eq!(claims.subject_id, user_id.to_string());
        assert_eq!(claims.role.as_deref(), Some("authorities"));
        assert!(claims.expires_at > Utc::now() + Duration::days(59));
    }

    #[test]
    fn sub_is_accepted_as_subject_alias() {
        let token = sign("k", &serde_json::json!({ "sub": "abc", "exp": in_an_hour() }));
        let claims = JwtVerifier::new(&config("k")).verify(&token).unwrap();
        assert_eq!(claims.subject_id, "abc");
        assert_eq!(claims.role, None);
    }

    #[test]
    fn token_carrying_both_id_and_sub_verifies() {
        let token = sign(
            "k",
            &serde_json::json!({ "id": "abc", "sub": "abc", "exp": in_an_hour() }),
        );
        let claims = JwtVerifier::new(&config("k")).verify(&token).unwrap();
        assert_eq!(claims.subject_id, "abc");
    }

    #[test]
    fn non_string_role_claim_is_ignored_not_fatal() {
        let token = sign(
            "k",
            &serde_json::json!({ "id": "abc", "role": ["authorities"], "exp": in_an_hour() }),
        );
        let claims = JwtVerifier::new(&config("k")).verify(&token).unwrap();
        assert_eq!(claims.subject_id, "abc");
        assert_eq!(claims.role, None);
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = sign("other", &serde_json::json!({ "id": "abc", "exp": in_an_hour() }));
        assert_eq!(
            JwtVerifier::new(&config("k")).verify(&token),
            Err(AuthError::MalformedOrInvalidSignature)
        );
    }

    #[test]
    fn wrong_secret_wins_over_expiry() {
        let past = (Utc::now() - Duration::hours(1)).timestamp();
        let token = sign("other", &serde_json::json!({ "id": "abc", "exp": past }));
        assert_eq!(
            JwtVerifier::new(&config("k")).verify(&token),
            Err(AuthError::MalformedOrInvalidSignature)
        );
    }

    #[test]
    fn past_expiry_is_expired() {
        let past = (Utc::now() - Duration::seconds(5)).timestamp();
        let token = sign("k", &serde_json::json!({ "id": "abc", "role": "user", "exp": past }));
        assert_eq!(
            JwtVerifier::new(&config("k")).verify(&token),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn missing_or_blank_subject_is_rejected() {
        let verifier = JwtVerifier::new(&config("k"));
        let no_id = sign("k", &serde_json::json!({ "role": "user", "exp": in_an_hour() }));
        let blank = sign("k", &serde_json::json!({ "id": "  ", "exp": in_an_hour() }));
        assert_eq!(verifier.verify(&no_id), Err(AuthError::MissingSubject));
        assert_eq!(verifier.verify(&blank), Err(AuthError::MissingSubject));
    }

    #[test]
    fn garbage_and_missing_exp_are_malformed() {
        let verifier = JwtVerifier::new(&config("k"));
        assert_eq!(verifier.verify("not.a.jwt"), Err(AuthError::MalformedOrInvalidSignature));
        let no_exp = sign("k", &serde_json::json!({ "id": "abc" }));
        assert_eq!(verifier.verify(&no_exp), Err(AuthError::MalformedOrInvalidSignature));
    }

    #[test]
    fn algorithm_mismatch_is_rejected() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &serde_json::json!({ "id": "abc", "exp": in_an_hour() }),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        assert_eq!(
            JwtVerifier::new(&config("k")).verify(&token),
            Err(AuthError::MalformedOrInvalidSignature)
        );
    }
}

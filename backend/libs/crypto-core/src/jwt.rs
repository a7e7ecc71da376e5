/// JWT validation shared by blog services
///
/// Tokens are signed with RS256 by the external identity provider. Services
/// only hold the public key; the private-key half exists for tests and local
/// tooling that need to mint tokens.
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// let public_key = jwt::load_validation_key()?;
/// jwt::initialize_jwt_validation_only(&public_key)?;
///
/// let data = jwt::validate_token(token)?;
/// let user_id = data.claims.user_id()?;
/// ```
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

/// Only RS256 is accepted; symmetric algorithms are never configured.
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Username at the time the token was issued
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, must be "access" for API requests
    pub token_type: String,
}

impl Claims {
    /// Parse the subject as a user ID.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize both signing and validation keys from PEM strings.
///
/// Can only succeed once per process.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;

    initialize_jwt_validation_only(public_key_pem)
}

/// Initialize the validation key only. Services that never mint tokens use this.
pub fn initialize_jwt_validation_only(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

/// Whether a validation key has been installed.
pub fn is_initialized() -> bool {
    JWT_DECODING_KEY.get().is_some()
}

/// Read the public key PEM from `JWT_PUBLIC_KEY_PEM`, or from the file named by
/// `JWT_PUBLIC_KEY_FILE`.
pub fn load_validation_key() -> Result<String> {
    if let Ok(pem) = std::env::var("JWT_PUBLIC_KEY_PEM") {
        if !pem.trim().is_empty() {
            return Ok(pem);
        }
    }

    match std::env::var("JWT_PUBLIC_KEY_FILE") {
        Ok(path) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read JWT public key file {path}: {e}")),
        Err(_) => bail!("JWT_PUBLIC_KEY_PEM or JWT_PUBLIC_KEY_FILE must be set"),
    }
}

fn get_encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT signing key not initialized. Call initialize_jwt_keys()."))
}

fn get_decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY.get().ok_or_else(|| {
        anyhow!("JWT keys not initialized. Call initialize_jwt_validation_only() during startup.")
    })
}

/// Mint an access token for `user_id`.
pub fn generate_access_token(user_id: Uuid, username: &str) -> Result<String> {
    generate_token_with_ttl(user_id, username, Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS))
}

/// Mint an access token with an explicit lifetime. A negative `ttl` produces an
/// already-expired token.
pub fn generate_token_with_ttl(user_id: Uuid, username: &str, ttl: Duration) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, get_encoding_key()?)
        .map_err(|e| anyhow!("Failed to generate access token: {e}"))
}

/// Validate signature, expiry and token type.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, get_decoding_key()?, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        bail!("Unexpected token type: {}", data.claims.token_type);
    }

    Ok(data)
}

use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::common::ApiResponse;
use crate::config::Config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 会话凭证载荷。无状态，服务端不保存会话表，
/// 凭证只能因过期或客户端丢弃而失效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

pub fn generate_token(
    user_id: &str,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

/// 校验凭证并返回载荷。过期的凭证即使签名有效也会被拒绝。
/// HMAC签名比较由 jsonwebtoken/ring 以常数时间完成
pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const NOT_FOUND: i32 = 1004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const STORAGE_ERROR: i32 = 5001;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/wordverse_test".into(),
            jwt_secret: "test-signing-secret".into(),
            jwt_expiration_secs: 24 * 3600,
            server_host: "127.0.0.1".into(),
            server_port: 0,
        }
    }

    #[test]
    fn token_roundtrip_preserves_subject() {
        let config = test_config();
        let (token, exp) = generate_token("user-1", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".into(),
            exp: now - 3600,
            iat: now - 7200,
        };
        // 用正确密钥签名，只有exp在过去
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token, &config).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let config = test_config();
        let (token, _) = generate_token("user-1", &config).unwrap();

        // 翻转签名段第一个字符对应的比特
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);
        let sig = parts[2].remove(0);
        let flipped = if sig == 'A' { 'B' } else { 'A' };
        parts[2].insert(0, flipped);
        let tampered = parts.join(".");
        assert_ne!(tampered, token);

        assert!(verify_token(&tampered, &config).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let config = test_config();
        assert!(verify_token("not-a-token", &config).is_err());
        assert!(verify_token("a.b.c", &config).is_err());
        assert!(verify_token("", &config).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "another-secret".into();

        let (token, _) = generate_token("user-1", &config).unwrap();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hashed = hash_password("hunter2secret").unwrap();
        assert!(verify_password("hunter2secret", &hashed).unwrap());
        assert!(!verify_password("wrong-password", &hashed).unwrap());
    }
}

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    database::UserOperation,
    error::AppError,
    utils::{generate_token, hash_password, success_to_api_response, verify_password},
};

use super::model::{AuthResponse, SigninRequest, SignupRequest};

/// 注册请求的字段校验，错误带字段名返回
fn validate_signup(req: &SignupRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() || req.name.len() > 64 {
        return Err(AppError::Validation {
            field: "name",
            message: "用户名长度必须在1到64个字符之间".to_string(),
        });
    }
    if !req.email.contains('@') || req.email.len() < 3 || req.email.len() > 254 {
        return Err(AppError::Validation {
            field: "email",
            message: "邮箱格式无效".to_string(),
        });
    }
    // bcrypt只处理前72个字节
    if req.password.len() < 6 || req.password.len() > 72 {
        return Err(AppError::Validation {
            field: "password",
            message: "密码长度必须在6到72个字符之间".to_string(),
        });
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_signup(&req)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let users = UserOperation::new(state.pool.clone());
    let user = match users.create(&req.name, &req.email, &password_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::UserExists);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Created user {}", user.user_id);

    let (credential, _) = generate_token(&user.user_id.to_string(), &state.config)
        .map_err(|e| AppError::Internal(format!("Failed to generate credential: {}", e)))?;

    Ok((
        StatusCode::OK,
        success_to_api_response(AuthResponse {
            user_id: user.user_id,
            credential,
        }),
    ))
}

#[axum::debug_handler]
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, AppError> {
    let users = UserOperation::new(state.pool.clone());

    // 用户不存在和密码错误对客户端不作区分
    let user = users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::SigninFailed)?;

    let password_ok = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
    if !password_ok {
        return Err(AppError::SigninFailed);
    }

    let (credential, _) = generate_token(&user.user_id.to_string(), &state.config)
        .map_err(|e| AppError::Internal(format!("Failed to generate credential: {}", e)))?;

    Ok((
        StatusCode::OK,
        success_to_api_response(AuthResponse {
            user_id: user.user_id,
            credential,
        }),
    ))
}

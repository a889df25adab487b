use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug)]
pub enum AppError {
    /// 凭证缺失、无效或已过期
    Unauthenticated,
    /// 凭证损坏，对客户端与Unauthenticated不作区分
    MalformedCredential,
    PostNotFound,
    /// 存储后端暂时不可用，可以重试
    StorageUnavailable,
    UserExists,
    SigninFailed,
    Validation {
        field: &'static str,
        message: String,
    },
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Storage backend error: {:?}", e);
        AppError::StorageUnavailable
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::Unauthenticated | AppError::MalformedCredential => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            AppError::PostNotFound => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                "文章不存在".to_string(),
            ),
            AppError::StorageUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::STORAGE_ERROR,
                "存储服务暂时不可用，请稍后重试".to_string(),
            ),
            AppError::UserExists => (
                StatusCode::CONFLICT,
                error_codes::USER_EXISTS,
                "该邮箱已被注册".to_string(),
            ),
            AppError::SigninFailed => (
                StatusCode::FORBIDDEN,
                error_codes::AUTH_FAILED,
                "邮箱或密码错误".to_string(),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                format!("{}: {}", field, message),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
        };

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}

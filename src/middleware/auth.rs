use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::errors::ErrorKind;

use crate::{AppState, error::AppError, utils::verify_token};

/// 认证中间件。
/// 校验Authorization头中的凭证，把解析出的Claims写入请求扩展，
/// 校验失败时在进入业务逻辑之前直接返回401，不触碰存储
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthenticated)?;

    let claims = verify_token(bearer.token(), &state.config).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthenticated,
        // 损坏的凭证对客户端同样表现为401
        _ => AppError::MalformedCredential,
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

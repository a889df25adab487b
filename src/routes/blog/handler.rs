use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    common::VoteDirection,
    database::{PostOperation, VoteOperation},
    error::AppError,
    utils::{Claims, success_to_api_response},
};

use super::model::{PostView, PublishRequest, PublishResponse, VoteRequest, VoteResponse};
use super::vote::VoteToggleService;

#[axum::debug_handler]
pub async fn publish_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.title.trim().is_empty() || req.title.len() > 200 {
        return Err(AppError::Validation {
            field: "title",
            message: "标题长度必须在1到200个字符之间".to_string(),
        });
    }
    if req.content.trim().is_empty() {
        return Err(AppError::Validation {
            field: "content",
            message: "内容不能为空".to_string(),
        });
    }

    let author_id = subject_user_id(&claims)?;
    let posts = PostOperation::new(state.pool.clone());
    let post = posts.create(author_id, &req.title, &req.content).await?;

    tracing::info!("User {} published post {}", author_id, post.post_id);

    Ok((
        StatusCode::OK,
        success_to_api_response(PublishResponse { id: post.post_id }),
    ))
}

#[axum::debug_handler]
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = PostOperation::new(state.pool.clone()).list().await?;
    let views = posts.into_iter().map(PostView::from).collect::<Vec<_>>();
    Ok((StatusCode::OK, success_to_api_response(views)))
}

#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = PostOperation::new(state.pool.clone())
        .find_by_id(post_id)
        .await?
        .ok_or(AppError::PostNotFound)?;

    Ok((StatusCode::OK, success_to_api_response(PostView::from(post))))
}

#[axum::debug_handler]
pub async fn toggle_vote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = subject_user_id(&claims)?;
    let requested = req.direction.as_deref().and_then(VoteDirection::from_client);

    let service = VoteToggleService::new(VoteOperation::new(state.pool.clone()));
    let (direction, count) = service.toggle(user_id, req.post_id, requested).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(VoteResponse { direction, count }),
    ))
}

/// 凭证由本服务签发，sub必然是UUID，解析失败按未认证处理
fn subject_user_id(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::VoteDirection;
use crate::database::PostWithAuthor;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    /// 客户端猜测的目标方向，仅作诊断，服务端始终相对持久化状态翻转
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub direction: VoteDirection,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub upvotes: i64,
}

/// 与前端约定的文章结构
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorView,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: CountView,
}

impl From<PostWithAuthor> for PostView {
    fn from(post: PostWithAuthor) -> Self {
        PostView {
            id: post.post_id,
            title: post.title,
            content: post.content,
            author: AuthorView {
                name: post.author_name,
            },
            created_at: post.created_at,
            count: CountView {
                upvotes: post.upvotes,
            },
        }
    }
}

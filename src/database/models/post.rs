use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PostEntity {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// 带作者名和点赞数的文章视图，点赞数每次从投票行重新聚合
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PostWithAuthor {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i64,
}

// 文章存储库
// 包含文章相关的数据库操作

use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::database::models::post::{PostEntity, PostWithAuthor};

/// 列表查询的上限
const LIST_LIMIT: i64 = 50;

pub struct PostOperation {
    db: PgPool,
}

impl PostOperation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<PostEntity, SqlxError> {
        let post_id = Uuid::new_v4();

        let post = sqlx::query_as::<_, PostEntity>(
            r#"
            INSERT INTO posts (post_id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING post_id, author_id, title, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    pub async fn find_by_id(&self, post_id: Uuid) -> Result<Option<PostWithAuthor>, SqlxError> {
        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT
                p.post_id,
                p.author_id,
                u.name AS author_name,
                p.title,
                p.content,
                p.created_at,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.post_id = p.post_id AND v.direction = 'up') AS upvotes
            FROM posts p
            JOIN users u ON u.user_id = p.author_id
            WHERE p.post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, SqlxError> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT
                p.post_id,
                p.author_id,
                u.name AS author_name,
                p.title,
                p.content,
                p.created_at,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.post_id = p.post_id AND v.direction = 'up') AS upvotes
            FROM posts p
            JOIN users u ON u.user_id = p.author_id
            ORDER BY p.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(LIST_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(posts)
    }
}

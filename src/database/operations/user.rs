// 用户存储库
// 包含用户相关的数据库操作

use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::database::models::user::UserEntity;

pub struct UserOperation {
    db: PgPool,
}

impl UserOperation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建用户，邮箱唯一约束冲突时返回数据库错误
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserEntity, SqlxError> {
        let user_id = Uuid::new_v4();

        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (user_id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, email, password_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, SqlxError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT user_id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

// 投票存储库
// 投票行与聚合计数的唯一事实来源，计数不做任何缓存

use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::common::VoteDirection;

/// 投票状态的数据访问接口。
///
/// `toggle_vote` 是唯一的写入口：在一个事务里对 (user_id, post_id)
/// 行做翻转式upsert并重新统计聚合计数。upsert持有的行锁把同一对上的
/// 并发翻转串行化，写入的方向在同一条原子语句里由当前行算出，
/// 读-改-写不可能交错。要么全部提交要么什么都不发生
#[allow(async_fn_in_trait)]
pub trait VoteStore {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool, SqlxError>;

    /// 查询当前持久化的投票方向，没有行时返回 `none`，不视为错误
    async fn get_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<VoteDirection, SqlxError>;

    /// 原子翻转并返回权威的 (新方向, 新聚合计数)
    async fn toggle_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<(VoteDirection, i64), SqlxError>;
}

#[derive(Clone)]
pub struct VoteOperation {
    db: PgPool,
}

impl VoteOperation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn direction_from_row(value: &str) -> Result<VoteDirection, SqlxError> {
    VoteDirection::from_db(value)
        .ok_or_else(|| SqlxError::Protocol(format!("invalid vote direction in storage: {}", value)))
}

impl VoteStore for VoteOperation {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool, SqlxError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE post_id = $1)",
        )
        .bind(post_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn get_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<VoteDirection, SqlxError> {
        let direction = sqlx::query_scalar::<_, String>(
            r#"
            SELECT direction FROM votes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.db)
        .await?;

        match direction {
            Some(value) => direction_from_row(&value),
            None => Ok(VoteDirection::None),
        }
    }

    async fn toggle_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<(VoteDirection, i64), SqlxError> {
        let mut tx = self.db.begin().await?;

        // 首次投票插入up，已有行时相对持久化状态翻转。
        // ON CONFLICT 的行锁串行化同一对上的并发请求
        let direction = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO votes (user_id, post_id, direction)
            VALUES ($1, $2, 'up')
            ON CONFLICT (user_id, post_id) DO UPDATE
            SET direction = CASE WHEN votes.direction = 'up' THEN 'none' ELSE 'up' END,
                updated_at = NOW()
            RETURNING direction
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        // 同一事务内重新聚合，包含本次写入
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes WHERE post_id = $1 AND direction = 'up'",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((direction_from_row(&direction)?, count))
    }
}

use uuid::Uuid;

use crate::common::VoteDirection;
use crate::database::VoteStore;
use crate::error::AppError;

/// 每个 (用户, 文章) 对的投票状态机，只有 none/up 两个状态。
///
/// toggle 不是幂等的：重复调用在两个状态之间交替。
/// 客户端上报的期望方向只作诊断，绝不作为写入依据，
/// 否则两个标签页的乐观猜测会让客户端与服务端状态发散
pub struct VoteToggleService<S> {
    store: S,
}

impl<S: VoteStore> VoteToggleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 相对持久化状态翻转投票，返回权威的 (新方向, 新聚合计数)。
    /// 未知文章返回 PostNotFound，不会创建任何投票行
    pub async fn toggle(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        requested: Option<VoteDirection>,
    ) -> Result<(VoteDirection, i64), AppError> {
        if !self.store.post_exists(post_id).await? {
            return Err(AppError::PostNotFound);
        }

        let current = self.store.get_vote(user_id, post_id).await?;
        if let Some(requested) = requested {
            if requested != current.flipped() {
                tracing::debug!(
                    user_id = %user_id,
                    post_id = %post_id,
                    requested = requested.as_str(),
                    current = current.as_str(),
                    "client requested direction out of sync with persisted state, flipping anyway"
                );
            }
        }

        let (direction, count) = self.store.toggle_vote(user_id, post_id).await?;
        Ok((direction, count))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// 内存版投票存储，单把锁模拟存储层的原子翻转
    #[derive(Clone, Default)]
    struct MemStore {
        inner: Arc<MemInner>,
    }

    #[derive(Default)]
    struct MemInner {
        posts: Mutex<HashSet<Uuid>>,
        votes: Mutex<HashMap<(Uuid, Uuid), VoteDirection>>,
        toggle_calls: AtomicUsize,
    }

    impl MemStore {
        fn with_post(post_id: Uuid) -> Self {
            let store = MemStore::default();
            store.inner.posts.lock().unwrap().insert(post_id);
            store
        }

        fn seed_vote(&self, user_id: Uuid, post_id: Uuid) {
            self.inner
                .votes
                .lock()
                .unwrap()
                .insert((user_id, post_id), VoteDirection::Up);
        }

        fn vote_rows(&self) -> usize {
            self.inner.votes.lock().unwrap().len()
        }

        fn toggle_calls(&self) -> usize {
            self.inner.toggle_calls.load(Ordering::SeqCst)
        }
    }

    impl VoteStore for MemStore {
        async fn post_exists(&self, post_id: Uuid) -> Result<bool, sqlx::Error> {
            Ok(self.inner.posts.lock().unwrap().contains(&post_id))
        }

        async fn get_vote(
            &self,
            user_id: Uuid,
            post_id: Uuid,
        ) -> Result<VoteDirection, sqlx::Error> {
            Ok(self
                .inner
                .votes
                .lock()
                .unwrap()
                .get(&(user_id, post_id))
                .copied()
                .unwrap_or(VoteDirection::None))
        }

        async fn toggle_vote(
            &self,
            user_id: Uuid,
            post_id: Uuid,
        ) -> Result<(VoteDirection, i64), sqlx::Error> {
            self.inner.toggle_calls.fetch_add(1, Ordering::SeqCst);
            let mut votes = self.inner.votes.lock().unwrap();
            let entry = votes
                .entry((user_id, post_id))
                .or_insert(VoteDirection::None);
            *entry = entry.flipped();
            let direction = *entry;
            let count = votes
                .iter()
                .filter(|((_, p), d)| *p == post_id && **d == VoteDirection::Up)
                .count() as i64;
            Ok((direction, count))
        }
    }

    fn seeded(baseline: i64) -> (MemStore, Uuid) {
        let post_id = Uuid::new_v4();
        let store = MemStore::with_post(post_id);
        for _ in 0..baseline {
            store.seed_vote(Uuid::new_v4(), post_id);
        }
        (store, post_id)
    }

    #[tokio::test]
    async fn first_toggle_upvotes_second_removes() {
        // 基线计数5：点赞后6，再点回到5
        let (store, post_id) = seeded(5);
        let user_id = Uuid::new_v4();
        let service = VoteToggleService::new(store);

        let (direction, count) = service.toggle(user_id, post_id, None).await.unwrap();
        assert_eq!(direction, VoteDirection::Up);
        assert_eq!(count, 6);

        let (direction, count) = service.toggle(user_id, post_id, None).await.unwrap();
        assert_eq!(direction, VoteDirection::None);
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn even_number_of_toggles_restores_baseline() {
        let (store, post_id) = seeded(3);
        let user_id = Uuid::new_v4();
        let service = VoteToggleService::new(store.clone());

        for _ in 0..4 {
            service.toggle(user_id, post_id, None).await.unwrap();
        }

        assert_eq!(
            service.store.get_vote(user_id, post_id).await.unwrap(),
            VoteDirection::None
        );
        let (_, count) = service
            .toggle(Uuid::new_v4(), post_id, None)
            .await
            .unwrap();
        // 另一个用户点赞后应为基线+1，证明四次翻转没有漂移
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn odd_number_of_toggles_adds_exactly_one() {
        let (store, post_id) = seeded(2);
        let user_id = Uuid::new_v4();
        let service = VoteToggleService::new(store);

        let mut last = (VoteDirection::None, 0);
        for _ in 0..3 {
            last = service.toggle(user_id, post_id, None).await.unwrap();
        }

        assert_eq!(last.0, VoteDirection::Up);
        assert_eq!(last.1, 3);
    }

    #[tokio::test]
    async fn toggle_ignores_client_requested_direction() {
        let (store, post_id) = seeded(0);
        let user_id = Uuid::new_v4();
        let service = VoteToggleService::new(store);

        // 客户端声称要取消，但持久化状态是none，仍然翻转为up
        let (direction, count) = service
            .toggle(user_id, post_id, Some(VoteDirection::None))
            .await
            .unwrap();
        assert_eq!(direction, VoteDirection::Up);
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn unknown_post_is_rejected_without_creating_rows() {
        let store = MemStore::default();
        let service = VoteToggleService::new(store.clone());

        let result = service
            .toggle(Uuid::new_v4(), Uuid::new_v4(), None)
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound)));
        assert_eq!(store.vote_rows(), 0);
        assert_eq!(store.toggle_calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_toggles_on_same_pair_do_not_drift() {
        let (store, post_id) = seeded(7);
        let user_id = Uuid::new_v4();

        let a = {
            let service = VoteToggleService::new(store.clone());
            tokio::spawn(async move { service.toggle(user_id, post_id, None).await })
        };
        let b = {
            let service = VoteToggleService::new(store.clone());
            tokio::spawn(async move { service.toggle(user_id, post_id, None).await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        // 两次翻转被串行化：一次落在 (up, 8)，另一次落在 (none, 7)
        let mut outcomes = [first, second];
        outcomes.sort_by_key(|(_, count)| *count);
        assert_eq!(outcomes[0], (VoteDirection::None, 7));
        assert_eq!(outcomes[1], (VoteDirection::Up, 8));

        // 偶数次翻转后回到基线，没有丢失更新也没有重复计数
        let service = VoteToggleService::new(store.clone());
        assert_eq!(
            service.store.get_vote(user_id, post_id).await.unwrap(),
            VoteDirection::None
        );
        assert_eq!(store.toggle_calls(), 2);
    }

    #[tokio::test]
    async fn toggles_on_different_pairs_are_independent() {
        let post_a = Uuid::new_v4();
        let post_b = Uuid::new_v4();
        let store = MemStore::with_post(post_a);
        store.inner.posts.lock().unwrap().insert(post_b);
        let user_id = Uuid::new_v4();
        let service = VoteToggleService::new(store);

        let (direction_a, count_a) = service.toggle(user_id, post_a, None).await.unwrap();
        let (direction_b, count_b) = service.toggle(user_id, post_b, None).await.unwrap();

        assert_eq!((direction_a, count_a), (VoteDirection::Up, 1));
        assert_eq!((direction_b, count_b), (VoteDirection::Up, 1));
    }
}

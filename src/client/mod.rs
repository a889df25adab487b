// 客户端层
// 前端投票按钮背后的乐观更新逻辑与HTTP传输，
// 也作为集成测试驱动后端API的参考客户端

mod api;
mod vote;

pub use api::{ApiClient, ClientError};
pub use vote::{ClickOutcome, VoteController, VoteView};

use uuid::Uuid;

/// 把一次点击完整走完：乐观翻转、请求、对账或回滚。
/// 已有请求在途时忽略本次点击
pub async fn submit_toggle(
    controller: &mut VoteController,
    api: &mut ApiClient,
    post_id: Uuid,
) -> Result<(), ClientError> {
    let dispatch = match controller.click(post_id) {
        ClickOutcome::Dispatch { seq, requested } => (seq, requested),
        ClickOutcome::Ignored | ClickOutcome::NotDisplayed => return Ok(()),
    };
    let (seq, requested) = dispatch;

    match api.toggle_vote(post_id, requested).await {
        Ok((direction, count)) => {
            controller.settle(post_id, seq, direction, count);
            Ok(())
        }
        Err(e) => {
            controller.fail(post_id, seq);
            if matches!(e, ClientError::Unauthenticated) {
                // 登录后回到当初想点赞的文章
                api.remember_destination(format!("/blog?id={}", post_id));
            }
            Err(e)
        }
    }
}

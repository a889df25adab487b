use std::collections::HashMap;

use uuid::Uuid;

use crate::common::VoteDirection;

/// 浏览器侧的投票状态控制器，单线程、事件驱动。
///
/// 点击立即翻转本地显示（乐观更新），响应返回后以服务端值对账；
/// 每篇文章同一时刻至多一个在途请求，期间的点击被忽略，
/// 避免双击导致的二次翻转。迟到的响应通过序号和展示状态过滤
#[derive(Debug, Default)]
pub struct VoteController {
    posts: HashMap<Uuid, PostVoteState>,
    next_seq: u64,
}

#[derive(Debug)]
struct PostVoteState {
    direction: VoteDirection,
    count: i64,
    in_flight: Option<InFlight>,
    error: bool,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    /// 点击前的状态，失败时回滚
    rollback: (VoteDirection, i64),
}

/// 点击的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 需要向服务端发起翻转请求
    Dispatch {
        seq: u64,
        /// 乐观猜测的目标方向，随请求上报作诊断
        requested: VoteDirection,
    },
    /// 已有请求在途，本次点击被忽略
    Ignored,
    /// 文章未在展示，点击无效
    NotDisplayed,
}

/// 渲染层读取的视图状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteView {
    pub direction: VoteDirection,
    pub count: i64,
    pub pending: bool,
    pub error: bool,
}

impl VoteController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文章进入视图，direction/count 为服务端已知的基线
    pub fn display(&mut self, post_id: Uuid, direction: VoteDirection, count: i64) {
        self.posts.insert(
            post_id,
            PostVoteState {
                direction,
                count,
                in_flight: None,
                error: false,
            },
        );
    }

    /// 文章离开视图，之后到达的响应一律作废
    pub fn dismiss(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
    }

    pub fn view(&self, post_id: Uuid) -> Option<VoteView> {
        self.posts.get(&post_id).map(|state| VoteView {
            direction: state.direction,
            count: state.count,
            pending: state.in_flight.is_some(),
            error: state.error,
        })
    }

    /// 用户点击投票按钮。乐观翻转本地状态并返回待发送的请求；
    /// 已有请求在途时忽略（必须，防止快速双击产生二次翻转）
    pub fn click(&mut self, post_id: Uuid) -> ClickOutcome {
        let Some(state) = self.posts.get_mut(&post_id) else {
            return ClickOutcome::NotDisplayed;
        };
        if state.in_flight.is_some() {
            return ClickOutcome::Ignored;
        }

        let rollback = (state.direction, state.count);
        state.direction = state.direction.flipped();
        state.count += match state.direction {
            VoteDirection::Up => 1,
            VoteDirection::None => -1,
        };
        state.error = false;

        let seq = self.next_seq;
        self.next_seq += 1;
        state.in_flight = Some(InFlight { seq, rollback });

        ClickOutcome::Dispatch {
            seq,
            requested: state.direction,
        }
    }

    /// 服务端响应到达。过期响应（序号不符或文章已离开视图）不做任何事；
    /// 本地乐观值与服务端不一致时以服务端为准
    pub fn settle(&mut self, post_id: Uuid, seq: u64, direction: VoteDirection, count: i64) {
        let Some(state) = self.posts.get_mut(&post_id) else {
            return;
        };
        if state.in_flight.as_ref().map(|f| f.seq) != Some(seq) {
            return;
        }

        state.direction = direction;
        state.count = count;
        state.in_flight = None;
    }

    /// 请求失败，回滚到点击前的状态并标记错误
    pub fn fail(&mut self, post_id: Uuid, seq: u64) {
        let Some(state) = self.posts.get_mut(&post_id) else {
            return;
        };
        let Some(in_flight) = state.in_flight.take_if(|f| f.seq == seq) else {
            return;
        };

        let (direction, count) = in_flight.rollback;
        state.direction = direction;
        state.count = count;
        state.error = true;
    }
}

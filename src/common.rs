// 公共数据结构

use serde::{Deserialize, Serialize};

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码，0表示成功，非0表示失败
    pub code: i32,
    /// 错误消息，成功时为"success"
    pub msg: String,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// 投票方向，每个 (用户, 文章) 对的持久化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    None,
}

impl VoteDirection {
    /// 相对当前状态翻转
    pub fn flipped(self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::None,
            VoteDirection::None => VoteDirection::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::None => "none",
        }
    }

    /// 数据库列值转换，列上有CHECK约束，未知值视为损坏
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "up" => Some(VoteDirection::Up),
            "none" => Some(VoteDirection::None),
            _ => None,
        }
    }

    /// 客户端上报的期望方向，仅用于诊断。
    /// 旧版前端发送 upvote/downvote 而不是 up/none
    pub fn from_client(value: &str) -> Option<Self> {
        match value {
            "up" | "upvote" => Some(VoteDirection::Up),
            "none" | "downvote" => Some(VoteDirection::None),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_alternates_between_states() {
        assert_eq!(VoteDirection::None.flipped(), VoteDirection::Up);
        assert_eq!(VoteDirection::Up.flipped(), VoteDirection::None);
        assert_eq!(VoteDirection::None.flipped().flipped(), VoteDirection::None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VoteDirection::Up).unwrap(), r#""up""#);
        assert_eq!(
            serde_json::to_string(&VoteDirection::None).unwrap(),
            r#""none""#
        );
    }

    #[test]
    fn accepts_legacy_client_spellings() {
        assert_eq!(VoteDirection::from_client("upvote"), Some(VoteDirection::Up));
        assert_eq!(
            VoteDirection::from_client("downvote"),
            Some(VoteDirection::None)
        );
        assert_eq!(VoteDirection::from_client("sideways"), None);
    }
}

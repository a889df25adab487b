// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod models;
pub mod operations;

pub use models::post::{PostEntity, PostWithAuthor};
pub use models::user::UserEntity;
pub use operations::post::PostOperation;
pub use operations::user::UserOperation;
pub use operations::vote::{VoteOperation, VoteStore};

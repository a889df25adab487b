mod handler;
mod model;
mod vote;

pub use handler::{get_post, list_posts, publish_post, toggle_vote};
pub use vote::VoteToggleService;

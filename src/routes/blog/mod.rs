mod handler;
mod model;

pub use handler::{clear_post_cache, get_post, list_posts, list_tags, record_view};

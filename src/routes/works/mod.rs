mod handler;
mod model;

pub use handler::{get_work, like_work, list_works, unlike_work};

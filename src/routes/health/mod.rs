mod handler;

pub use handler::{api_info, health, not_found};

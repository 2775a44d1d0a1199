mod handler;
mod model;

pub use handler::{clear_stats_cache, get_github_stats, get_summary, get_wakatime_stats};

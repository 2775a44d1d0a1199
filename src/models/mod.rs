pub mod blog;
pub mod stats;
pub mod works;

pub use blog::{BlogPost, PostPage, PostQuery, PostStatus, StatusFilter};
pub use stats::{GitHubStats, LanguageShare, TimeShare, WakaTimeStats};
pub use works::{Work, WorksCatalog};

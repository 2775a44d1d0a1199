/// 速率限制键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

const BLOG_POST_PREFIX: &str = "blog_post:";

const STATS_PREFIX: &str = "stats:";

const PROJECT_LIKE_PREFIX: &str = "project_like:";

const CONTACT_SUBMISSION_PREFIX: &str = "contact_submission:";

/// Resources whose views are counted once per client per dedupe window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewResource {
    Blog,
    Work,
}

impl ViewResource {
    fn prefix(self) -> &'static str {
        match self {
            ViewResource::Blog => "blog",
            ViewResource::Work => "work",
        }
    }
}

pub fn rate_limit_key(ip: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, ip)
}

pub fn blog_post_key(slug: &str) -> String {
    format!("{}{}", BLOG_POST_PREFIX, slug)
}

/// `source` is `github` or `wakatime`.
pub fn stats_key(source: &str) -> String {
    format!("{}{}", STATS_PREFIX, source)
}

/// Dedupe key: `{resource}_view:{id}:{ip}`.
pub fn view_dedupe_key(resource: ViewResource, id: &str, ip: &str) -> String {
    format!("{}_view:{}:{}", resource.prefix(), id, ip)
}

pub fn project_like_key(project_id: &str, ip: &str) -> String {
    format!("{}{}:{}", PROJECT_LIKE_PREFIX, project_id, ip)
}

pub fn contact_submission_key(ip: &str) -> String {
    format!("{}{}", CONTACT_SUBMISSION_PREFIX, ip)
}

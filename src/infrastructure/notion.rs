use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::BlogSource;
use crate::config::NotionConfig;
use crate::error::UpstreamError;
use crate::models::{BlogPost, PostPage, PostQuery, PostStatus, StatusFilter};

const SERVICE: &str = "notion";
const MAX_PAGE_SIZE: u32 = 100;

pub struct NotionClient {
    http: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, config: NotionConfig) -> Self {
        Self { http, config }
    }

    async fn query_database(&self, body: Value) -> Result<Value, UpstreamError> {
        let url = format!(
            "{}/databases/{}/query",
            self.config.base_url, self.config.database_id
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::http(SERVICE))?;
        read_json(response).await
    }

    /// Follows `next_cursor` until the database is exhausted.
    async fn query_all(&self, filter: Option<Value>) -> Result<Vec<Value>, UpstreamError> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = json!({
                "sorts": [{ "property": "Published", "direction": "descending" }],
                "page_size": MAX_PAGE_SIZE,
            });
            if let Some(filter) = &filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self.query_database(body).await?;
            if let Some(results) = response["results"].as_array() {
                pages.extend(results.iter().cloned());
            }
            match (
                response["has_more"].as_bool(),
                response["next_cursor"].as_str(),
            ) {
                (Some(true), Some(next)) => cursor = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(pages)
    }

    async fn page_markdown(&self, page_id: &str) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/blocks/{}/children?page_size={}",
            self.config.base_url, page_id, MAX_PAGE_SIZE
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", &self.config.api_version)
            .send()
            .await
            .map_err(UpstreamError::http(SERVICE))?;
        let body = read_json(response).await?;
        let blocks = body["results"].as_array().cloned().unwrap_or_default();
        Ok(blocks_to_markdown(&blocks))
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service: SERVICE,
            status: status.as_u16(),
        });
    }
    response.json().await.map_err(UpstreamError::http(SERVICE))
}

fn list_filter(query: &PostQuery) -> Option<Value> {
    let mut conditions = Vec::new();
    if let Some(status) = query.status.as_notion_value() {
        conditions.push(json!({ "property": "Status", "select": { "equals": status } }));
    }
    if let Some(tag) = &query.tag {
        conditions.push(json!({ "property": "Tags", "multi_select": { "contains": tag } }));
    }
    if conditions.is_empty() {
        None
    } else {
        Some(json!({ "and": conditions }))
    }
}

fn rich_text(value: &Value) -> String {
    value
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["plain_text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn tag_names(properties: &Value) -> Vec<String> {
    properties["Tags"]["multi_select"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn page_to_post(page: &Value) -> BlogPost {
    let properties = &page["properties"];
    let status = match properties["Status"]["select"]["name"].as_str() {
        Some("published") => PostStatus::Published,
        _ => PostStatus::Draft,
    };
    BlogPost {
        id: page["id"].as_str().unwrap_or_default().to_string(),
        slug: rich_text(&properties["Slug"]["rich_text"]),
        title: rich_text(&properties["Title"]["title"]),
        description: rich_text(&properties["Description"]["rich_text"]),
        published_at: properties["Published"]["date"]["start"]
            .as_str()
            .map(String::from),
        updated_at: page["last_edited_time"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        status,
        tags: tag_names(properties),
        content: None,
        view_count: None,
    }
}

pub(crate) fn blocks_to_markdown(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            let kind = block["type"].as_str()?;
            let text = rich_text(&block[kind]["rich_text"]);
            let line = match kind {
                "paragraph" => text,
                "heading_1" => format!("# {}", text),
                "heading_2" => format!("## {}", text),
                "heading_3" => format!("### {}", text),
                "bulleted_list_item" => format!("- {}", text),
                "numbered_list_item" => format!("1. {}", text),
                "quote" => format!("> {}", text),
                "code" => {
                    let language = block["code"]["language"].as_str().unwrap_or_default();
                    format!("```{}\n{}\n```", language, text)
                }
                _ => return None,
            };
            (!line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl BlogSource for NotionClient {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, UpstreamError> {
        // Notion has no offset paging, so fetch the whole filtered set and slice it
        let pages = self.query_all(list_filter(query)).await?;
        let total = pages.len() as u64;
        let skip = (query.page.saturating_sub(1) as usize).saturating_mul(query.limit as usize);
        let posts = pages
            .iter()
            .skip(skip)
            .take(query.limit as usize)
            .map(page_to_post)
            .collect();
        Ok(PostPage { posts, total })
    }

    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, UpstreamError> {
        let body = json!({
            "filter": { "property": "Slug", "rich_text": { "equals": slug } },
            "page_size": 1,
        });
        let response = self.query_database(body).await?;
        let Some(page) = response["results"].as_array().and_then(|r| r.first()) else {
            return Ok(None);
        };

        let mut post = page_to_post(page);
        let content = match page["id"].as_str() {
            Some(page_id) => match self.page_markdown(page_id).await {
                Ok(markdown) => markdown,
                Err(e) => {
                    tracing::error!("Failed to fetch page content for {}: {}", slug, e);
                    String::new()
                }
            },
            None => String::new(),
        };
        post.content = Some(content);
        Ok(Some(post))
    }

    async fn all_tags(&self) -> Result<Vec<String>, UpstreamError> {
        let filter = json!({ "property": "Status", "select": { "equals": "published" } });
        let pages = self.query_all(Some(filter)).await?;
        let tags: BTreeSet<String> = pages
            .iter()
            .flat_map(|page| tag_names(&page["properties"]))
            .collect();
        Ok(tags.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Value {
        json!({
            "id": "page-1",
            "last_edited_time": "2024-02-01T10:00:00.000Z",
            "properties": {
                "Title": { "title": [{ "plain_text": "Hello " }, { "plain_text": "World" }] },
                "Slug": { "rich_text": [{ "plain_text": "hello-world" }] },
                "Status": { "select": { "name": "published" } },
                "Published": { "date": { "start": "2024-01-31" } },
                "Tags": { "multi_select": [{ "name": "rust" }, { "name": "web" }] },
                "Description": { "rich_text": [] }
            }
        })
    }

    #[test]
    fn maps_page_properties() {
        let post = page_to_post(&sample_page());
        assert_eq!(post.id, "page-1");
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.description, "");
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at.as_deref(), Some("2024-01-31"));
        assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    }

    #[test]
    fn missing_status_is_draft() {
        let post = page_to_post(&json!({ "id": "x", "properties": {} }));
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());
    }

    #[test]
    fn converts_blocks_to_markdown() {
        let blocks = vec![
            json!({ "type": "heading_1", "heading_1": { "rich_text": [{ "plain_text": "Title" }] } }),
            json!({ "type": "paragraph", "paragraph": { "rich_text": [{ "plain_text": "Body" }] } }),
            json!({ "type": "image", "image": {} }),
            json!({ "type": "code", "code": { "language": "rust", "rich_text": [{ "plain_text": "fn main() {}" }] } }),
            json!({ "type": "bulleted_list_item", "bulleted_list_item": { "rich_text": [{ "plain_text": "item" }] } }),
        ];
        assert_eq!(
            blocks_to_markdown(&blocks),
            "# Title\n\nBody\n\n```rust\nfn main() {}\n```\n\n- item"
        );
    }

    #[test]
    fn list_filter_combines_status_and_tag() {
        let query = PostQuery {
            page: 1,
            limit: 10,
            status: StatusFilter::All,
            tag: None,
        };
        assert!(list_filter(&query).is_none());

        let query = PostQuery {
            status: StatusFilter::Published,
            tag: Some("rust".into()),
            ..query
        };
        let filter = list_filter(&query).unwrap();
        assert_eq!(filter["and"].as_array().unwrap().len(), 2);
        assert_eq!(filter["and"][1]["multi_select"]["contains"], "rust");
    }
}

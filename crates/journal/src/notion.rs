use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use sessiondesk_core::config::JournalConfig;
use sessiondesk_core::journal::entity::{JournalEntry, JournalReceipt};
use sessiondesk_core::journal::error::JournalError;
use sessiondesk_core::journal::port::JournalGateway;

/// # Summary
/// A journal implementation that writes entries as pages of a Notion database.
///
/// # Invariants
/// * `secret` must be an integration token with access to the database.
/// * `database_id` must identify a database whose columns match [`build_properties`].
pub struct NotionJournal {
    /// API root, e.g. `https://api.notion.com`.
    api_base: String,
    /// Value of the `Notion-Version` header.
    api_version: String,
    secret: String,
    database_id: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload structure for the `POST /v1/pages` API.
#[derive(Serialize)]
struct CreatePageRequest<'a> {
    parent: Parent<'a>,
    properties: Map<String, Value>,
}

#[derive(Serialize)]
struct Parent<'a> {
    database_id: &'a str,
}

/// The subset of the page object returned on success.
#[derive(Deserialize)]
struct PageResponse {
    id: String,
    url: Option<String>,
}

impl NotionJournal {
    /// # Summary
    /// Creates a new `NotionJournal` from configuration.
    ///
    /// # Logic
    /// Rejects empty credentials, then builds the HTTP client.
    ///
    /// # Returns
    /// * `Err(JournalError::Config)` if the secret or database id is missing, or the client cannot be built.
    pub fn new(config: &JournalConfig) -> Result<Self, JournalError> {
        if config.secret.trim().is_empty() {
            return Err(JournalError::Config("journal.secret is not set".into()));
        }
        if config.database_id.trim().is_empty() {
            return Err(JournalError::Config("journal.database_id is not set".into()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| JournalError::Config(e.to_string()))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            secret: config.secret.clone(),
            database_id: config.database_id.trim().to_string(),
            client,
        })
    }
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// # Summary
/// Maps a journal entry onto the database's property schema.
///
/// # Logic
/// 1. `Title` is the page title.
/// 2. Free text columns are `rich_text`, prices are `number`.
/// 3. `Files & media` is only present when a chart url was supplied.
pub fn build_properties(entry: &JournalEntry) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "Title".into(),
        json!({ "title": [{ "text": { "content": entry.title } }] }),
    );
    properties.insert("Symbol".into(), rich_text(&entry.symbol));
    properties.insert("Session".into(), rich_text(&entry.session));
    properties.insert("HTF Bias".into(), rich_text(&entry.htf_bias));
    properties.insert("Entry Type".into(), rich_text(&entry.entry_type));
    properties.insert("Entry Price".into(), json!({ "number": entry.entry_price }));
    properties.insert("Stop Loss".into(), json!({ "number": entry.stop_loss }));
    properties.insert("Target Price".into(), json!({ "number": entry.target_price }));
    properties.insert("Order Type".into(), rich_text(&entry.order_type));
    properties.insert("Note".into(), rich_text(&entry.note));
    properties.insert("Checklist".into(), rich_text(&entry.checklist));
    properties.insert("News & Events".into(), rich_text(&entry.news_events));

    if let Some(url) = entry.chart_url() {
        properties.insert("Files & media".into(), json!({ "url": url }));
    }

    properties
}

#[async_trait]
impl JournalGateway for NotionJournal {
    /// # Summary
    /// Creates one page in the configured database.
    ///
    /// # Logic
    /// 1. Builds the property map from the entry.
    /// 2. Sends `POST {api_base}/v1/pages` with bearer auth and version header.
    /// 3. Checks the response status and extracts the page id.
    ///
    /// # Returns
    /// * `Ok(JournalReceipt)` with the new page id.
    /// * `Err(JournalError)` if a network error occurs or the API returns a non-success status.
    async fn create_entry(&self, entry: &JournalEntry) -> Result<JournalReceipt, JournalError> {
        if entry.title.trim().is_empty() {
            return Err(JournalError::InvalidEntry("title must not be empty".into()));
        }

        let url = format!("{}/v1/pages", self.api_base);
        let payload = CreatePageRequest {
            parent: Parent {
                database_id: &self.database_id,
            },
            properties: build_properties(entry),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .header("Notion-Version", &self.api_version)
            .json(&payload)
            .send()
            .await
            .map_err(|e| JournalError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(JournalError::Platform {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| JournalError::Parse(e.to_string()))?;

        info!("Journal entry '{}' written as page {}", entry.title, page.id);
        Ok(JournalReceipt {
            page_id: page.id,
            url: page.url,
        })
    }
}

//! Discovery Engine (Vertex AI Search) REST client.
//!
//! One `:search` call per query with summary settings, plus paginated
//! `documents` listing for the inventory sidebar.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ensure_query, normalize_listing, DocumentListing, DocumentSearch};
use crate::auth::TokenProvider;
use crate::config::AppConfig;
use crate::error::{ConfigError, SearchError};
use crate::rag::canonical_filename;
use crate::templates::InstructionTemplate;
use crate::types::{SearchResponse, SearchResult};

const API_VERSION: &str = "v1beta";
const MAX_LIST_PAGES: usize = 50;
pub const SUMMARY_UNAVAILABLE: &str = "Search failed: the service returned no summary.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    page_size: u32,
    content_search_spec: ContentSearchSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentSearchSpec {
    summary_spec: SummarySpec,
    extractive_content_spec: ExtractiveContentSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarySpec {
    summary_result_count: u32,
    include_citations: bool,
    ignore_adversarial_query: bool,
    model_prompt_spec: ModelPromptSpec,
}

#[derive(Debug, Serialize)]
struct ModelPromptSpec {
    preamble: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractiveContentSpec {
    max_extractive_answer_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponseBody {
    #[serde(default)]
    results: Vec<ResultEntry>,
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    summary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    id: Option<String>,
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    id: Option<String>,
    derived_struct_data: Option<Value>,
    content: Option<DocumentContent>,
}

#[derive(Debug, Deserialize)]
struct DocumentContent {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsBody {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct DiscoveryEngineClient {
    config: AppConfig,
    template: InstructionTemplate,
    document_count: RwLock<Option<usize>>,
    tokens: TokenProvider,
    http: Client,
}

impl DiscoveryEngineClient {
    pub fn new(config: AppConfig, template: InstructionTemplate) -> Result<Self, ConfigError> {
        let credentials = config
            .credentials
            .clone()
            .ok_or(ConfigError::Missing("credentials"))?;

        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(300))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "http_client",
                reason: e.to_string(),
            })?;

        tracing::info!(
            data_store = %config.data_store_path(),
            endpoint = %config.endpoint(),
            template = %template.version(),
            "Creating DiscoveryEngineClient"
        );

        Ok(Self {
            tokens: TokenProvider::new(credentials, http.clone()),
            config,
            template,
            document_count: RwLock::new(None),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.config.endpoint(), API_VERSION, path)
    }

    fn build_request<'a>(&self, query: &'a str) -> SearchRequest<'a> {
        let preamble = self.template.render(*self.document_count.read());
        SearchRequest {
            query,
            page_size: self.config.search.summary_result_count,
            content_search_spec: ContentSearchSpec {
                summary_spec: SummarySpec {
                    summary_result_count: self.config.search.summary_result_count,
                    include_citations: self.config.search.include_citations,
                    ignore_adversarial_query: true,
                    model_prompt_spec: ModelPromptSpec { preamble },
                },
                extractive_content_spec: ExtractiveContentSpec {
                    max_extractive_answer_count: 1,
                },
            },
        }
    }

    /// Read a response body, mapping non-2xx statuses and bad JSON onto
    /// [`SearchError`].
    async fn parse_json_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, SearchError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("failed to read body from {}: {}", endpoint, e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| body.chars().take(300).collect());
            return Err(SearchError::from_status(status.as_u16(), message));
        }

        let trimmed = body.trim_start();
        if trimmed.starts_with('<') {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(SearchError::Decode(format!(
                "{} returned HTML instead of JSON: {}",
                endpoint, preview
            )));
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            SearchError::Decode(format!("{} ({}): {}", endpoint, e, preview))
        })
    }

    async fn fetch_documents(&self) -> Result<Vec<Document>, SearchError> {
        let url = self.url(&format!("{}/documents", self.config.branch_path()));
        let page_size = self.config.search.page_size.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_LIST_PAGES {
            let token = self.tokens.access_token().await?;
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(token)
                .header("x-goog-user-project", &self.config.project_id)
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(t) = &page_token {
                request = request.query(&[("pageToken", t.as_str())]);
            }

            let response = request.send().await?;
            let body: ListDocumentsBody = Self::parse_json_response(response, &url).await?;
            tracing::debug!(page, documents = body.documents.len(), "Listed document page");
            documents.extend(body.documents);

            match body.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => return Ok(documents),
            }
        }

        tracing::warn!(pages = MAX_LIST_PAGES, "Document listing truncated at page limit");
        Ok(documents)
    }
}

#[async_trait]
impl DocumentSearch for DiscoveryEngineClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let query = ensure_query(query)?;
        let url = self.url(&format!("{}:search", self.config.serving_config_path()));
        let body = self.build_request(query);
        let token = self.tokens.access_token().await?;

        tracing::info!(query_len = query.chars().count(), "Sending search request");
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("x-goog-user-project", &self.config.project_id)
            .json(&body)
            .send()
            .await?;

        let parsed: SearchResponseBody = Self::parse_json_response(response, &url).await?;
        let response = into_search_response(parsed);

        tracing::info!(
            results = response.results.len(),
            summary_len = response.summary_text.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(response)
    }

    async fn list_documents(&self) -> Result<Vec<String>, SearchError> {
        let documents = self.fetch_documents().await?;
        Ok(normalize_listing(documents.iter().map(document_filename)))
    }

    /// Document count quoted in the instruction preamble.
    fn set_document_count(&self, count: Option<usize>) {
        *self.document_count.write() = count;
    }

    async fn inventory(&self) -> Result<DocumentListing, SearchError> {
        let documents = self.fetch_documents().await?;
        Ok(DocumentListing {
            count: documents.len(),
            files: normalize_listing(documents.iter().map(document_filename)),
        })
    }
}

fn into_search_response(body: SearchResponseBody) -> SearchResponse {
    let summary_text = match body.summary.and_then(|s| s.summary_text) {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::warn!("Search response carried no summary");
            SUMMARY_UNAVAILABLE.to_string()
        }
    };

    let results = body
        .results
        .into_iter()
        .filter_map(|entry| {
            let document = entry.document?;
            let data = document.derived_struct_data.unwrap_or(Value::Null);
            let text = |key: &str| {
                data.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let pages = page_numbers(&data);
            Some(SearchResult {
                title: text("title"),
                link: text("link"),
                page_numbers: (!pages.is_empty()).then_some(pages),
                document_id: document.id.or(entry.id),
            })
        })
        .collect();

    SearchResponse {
        summary_text,
        results,
    }
}

/// Page labels from extractive answers and segments, first occurrence order.
fn page_numbers(data: &Value) -> Vec<String> {
    let mut pages: Vec<String> = Vec::new();
    for key in ["extractive_answers", "extractive_segments"] {
        let Some(items) = data.get(key).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            let page = match item.get("pageNumber") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            if !pages.contains(&page) {
                pages.push(page);
            }
        }
    }
    pages
}

fn document_filename(document: &Document) -> String {
    let uri = document
        .content
        .as_ref()
        .and_then(|c| c.uri.as_deref())
        .unwrap_or_default();
    let name = canonical_filename(uri);
    if name.is_empty() {
        format!("System_ID: {}", document.id.as_deref().unwrap_or("unknown"))
    } else {
        name.to_string()
    }
}

//! Notion APIクライアント
//!
//! - データベースの全件取得（カーソルで全ページを辿る）
//! - リレーションプロパティの更新
//!
//! 429/5xx は `Retry-After`（無ければ指数バックオフ）で再試行する。

use super::types::{ErrorBody, Page, QueryResponse};
use super::DatabaseReader;
use crate::config::Config;
use crate::error::{RoomMatchError, Result};
use crate::relation::RelationWriter;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::future::Future;
use std::time::Duration;

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const USER_AGENT: &str = concat!("notion-room-match/", env!("CARGO_PKG_VERSION"));
/// 1リクエストあたりの取得件数（APIの上限）
const PAGE_SIZE: u32 = 100;
const BACKOFF_BASE_MS: u64 = 500;

pub struct NotionClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
    notion_version: String,
    relation_property: String,
    max_retries: u32,
}

impl NotionClient {
    pub fn new(token: String, config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RoomMatchError::Api(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: NOTION_API_URL.to_string(),
            token,
            notion_version: config.notion_version.clone(),
            relation_property: config.relation_property.clone(),
            max_retries: config.max_retries,
        })
    }

    /// APIのベースURLを差し替える（プロキシ等）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn query_page(&self, database_id: &str, cursor: Option<String>) -> Result<QueryResponse> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let mut body = serde_json::json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = serde_json::Value::String(cursor);
        }

        let response = self
            .send(Method::POST, &url, &body)
            .await
            .map_err(|message| RoomMatchError::Fetch {
                database_id: database_id.to_string(),
                message,
            })?;

        response.json().await.map_err(|e| RoomMatchError::Fetch {
            database_id: database_id.to_string(),
            message: format!("レスポンスの解析に失敗: {}", e),
        })
    }

    /// リクエスト送信（再試行付き）
    ///
    /// 失敗時はログ・エラー表示用のメッセージを返す。
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<reqwest::Response, String> {
        let mut attempt = 0;

        loop {
            tracing::debug!(method = %method, url = %url, attempt, "Notion API request");

            let result = self
                .http_client
                .request(method.clone(), url)
                .bearer_auth(&self.token)
                .header("Notion-Version", &self.notion_version)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if is_retryable(status) && attempt < self.max_retries {
                        let wait = retry_after(&response).unwrap_or_else(|| backoff(attempt));
                        tracing::warn!(status = status.as_u16(), wait_ms = wait.as_millis() as u64, "Retrying Notion API request");
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }

                    let text = response.text().await.unwrap_or_default();
                    return Err(format!("HTTP {}: {}", status.as_u16(), error_message(&text)));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    let wait = backoff(attempt);
                    tracing::warn!(error = %e, wait_ms = wait.as_millis() as u64, "Retrying Notion API request");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.to_string()),
            }
        }
    }
}

#[async_trait]
impl DatabaseReader for NotionClient {
    async fn fetch_all(&self, database_id: &str) -> Result<Vec<Page>> {
        let pages = paginate(database_id, |cursor| self.query_page(database_id, cursor)).await?;
        tracing::info!(database_id = %database_id, pages = pages.len(), "Fetched database");
        Ok(pages)
    }
}

#[async_trait]
impl RelationWriter for NotionClient {
    async fn set_relation(&self, item_id: &str, related_id: &str) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, item_id);
        let body = relation_body(&self.relation_property, related_id);

        self.send(Method::PATCH, &url, &body)
            .await
            .map(|_| ())
            .map_err(|message| RoomMatchError::RelationWrite {
                page_id: item_id.to_string(),
                message,
            })
    }
}

/// カーソルを辿って全ページを集める
///
/// `has_more` が false になるまで続ける。途中で打ち切らない。
pub async fn paginate<F, Fut>(database_id: &str, mut fetch_page: F) -> Result<Vec<Page>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<QueryResponse>>,
{
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let response = fetch_page(cursor.clone()).await?;
        pages.extend(response.results);

        if !response.has_more {
            break;
        }

        match response.next_cursor {
            Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            Some(_) => {
                return Err(RoomMatchError::Fetch {
                    database_id: database_id.to_string(),
                    message: "同じカーソルが繰り返し返されました".into(),
                })
            }
            None => {
                return Err(RoomMatchError::Fetch {
                    database_id: database_id.to_string(),
                    message: "has_more が true ですが next_cursor がありません".into(),
                })
            }
        }
    }

    Ok(pages)
}

/// リレーション更新のリクエストボディ
pub fn relation_body(relation_property: &str, related_id: &str) -> serde_json::Value {
    serde_json::json!({
        "properties": {
            relation_property: {
                "relation": [{ "id": related_id }]
            }
        }
    })
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(1 << attempt.min(6)))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) if !err.message.is_empty() => format!("{} ({})", err.message, err.code),
        _ => body.chars().take(200).collect(),
    }
}

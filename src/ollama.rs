//! Ollama埋め込みプロバイダ
//!
//! `POST /api/embed` でまとめて埋め込む。モデルが未取得なら
//! `ensure_model` で `/api/pull` する。

use crate::config::EmbeddingConfig;
use async_trait::async_trait;
use room_match_common::{EmbeddingProvider, MatchError};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
/// モデル取得は時間がかかる
const PULL_TIMEOUT_SECS: u64 = 1800;

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingConfig,
}

impl OllamaEmbedder {
    pub fn new(config: EmbeddingConfig) -> room_match_common::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MatchError::Embedding(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// モデルが使える状態にする
    ///
    /// 未取得の場合、`auto_pull` が有効なら取得する。
    pub async fn ensure_model(&self) -> room_match_common::Result<()> {
        let response = self
            .http_client
            .post(self.url("/api/show"))
            .json(&serde_json::json!({ "model": self.config.model }))
            .send()
            .await
            .map_err(|e| MatchError::Embedding(format!("Ollamaに接続できません: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(MatchError::Embedding(format!(
                "モデル情報の取得に失敗: HTTP {}",
                response.status().as_u16()
            )));
        }

        if !self.config.auto_pull {
            return Err(MatchError::Embedding(format!(
                "モデル {} がありません（`ollama pull {}` で取得してください）",
                self.config.model, self.config.model
            )));
        }

        tracing::info!(model = %self.config.model, "Pulling embedding model");

        let response = self
            .http_client
            .post(self.url("/api/pull"))
            .timeout(Duration::from_secs(PULL_TIMEOUT_SECS))
            .json(&serde_json::json!({ "model": self.config.model, "stream": false }))
            .send()
            .await
            .map_err(|e| MatchError::Embedding(format!("モデル取得に失敗: {}", e)))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MatchError::Embedding(format!("モデル取得に失敗: {}", text.trim())));
        }

        Ok(())
    }

    async fn embed_batch(&self, texts: &[String]) -> room_match_common::Result<Vec<Vec<f32>>> {
        let response = self
            .http_client
            .post(self.url("/api/embed"))
            .json(&serde_json::json!({ "model": self.config.model, "input": texts }))
            .send()
            .await
            .map_err(|e| MatchError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MatchError::Embedding(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| MatchError::Embedding(format!("レスポンスの解析に失敗: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(MatchError::Embedding(format!(
                "ベクトル数が一致しません（入力{}件、出力{}件）",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> room_match_common::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for (batch_idx, batch) in texts.chunks(self.config.batch_size.max(1)).enumerate() {
            tracing::debug!(batch = batch_idx + 1, size = batch.len(), "Embedding batch");
            vectors.extend(self.embed_batch(batch).await?);
        }

        Ok(vectors)
    }
}

//! リレーション書き込み
//!
//! マッチした結果1件ごとに対象ページへ参照ページを紐付ける。
//! 1件の失敗で残りを止めない。失敗してもレポート上はマッチのまま。

use crate::error::Result;
use async_trait::async_trait;
use indicatif::ProgressBar;
use room_match_common::{MatchReport, MatchResult};

/// リレーションの書き込み先
#[async_trait]
pub trait RelationWriter: Send + Sync {
    /// `item_id` のリレーションを `related_id` に設定する
    async fn set_relation(&self, item_id: &str, related_id: &str) -> Result<()>;
}

/// 書き込み失敗1件
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub query_name: String,
    pub page_id: String,
    pub message: String,
}

/// 書き込み結果
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    pub written: usize,
    pub failures: Vec<WriteFailure>,
}

impl WriteSummary {
    pub fn attempted(&self) -> usize {
        self.written + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// マッチした結果のリレーションを順に書き込む
pub async fn write_relations(
    writer: &dyn RelationWriter,
    report: &MatchReport,
    progress: &ProgressBar,
) -> WriteSummary {
    let mut summary = WriteSummary::default();

    for result in &report.accepted {
        progress.set_message(result.query_name.clone());

        match writer.set_relation(&result.query_id, &result.matched_id).await {
            Ok(()) => summary.written += 1,
            Err(e) => {
                tracing::warn!(
                    query = %result.query_name,
                    page_id = %result.query_id,
                    error = %e,
                    "Relation write failed"
                );
                summary.failures.push(failure(result, &e.to_string()));
            }
        }

        progress.inc(1);
    }

    summary
}

fn failure(result: &MatchResult, message: &str) -> WriteFailure {
    WriteFailure {
        query_name: result.query_name.clone(),
        page_id: result.query_id.clone(),
        message: message.to_string(),
    }
}

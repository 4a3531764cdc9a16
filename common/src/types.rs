//! マッチングの型定義
//!
//! - LabeledItem: DBから取り出した室名とページID
//! - MatchResult: 1件の照合結果
//! - MatchReport: マッチ/保留に振り分けた照合結果一式

use serde::{Deserialize, Serialize};

/// 室名とページIDの組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledItem {
    /// 室名（タイトルプロパティの文字列）
    pub name: String,
    /// NotionページID
    pub id: String,
}

impl LabeledItem {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// 照合ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    /// しきい値以上（自動マッチ）
    Accepted,
    /// しきい値未満（保留）
    Pending,
}

impl MatchStatus {
    /// スコアとしきい値から判定（しきい値ちょうどはマッチ）
    pub fn from_score(score: u8, threshold: u8) -> Self {
        if score >= threshold {
            MatchStatus::Accepted
        } else {
            MatchStatus::Pending
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Accepted => "マッチ",
            MatchStatus::Pending => "保留",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 1件の照合結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub query_name: String,
    pub matched_name: String,
    /// 類似度 (0-100)
    pub score: u8,
    pub query_id: String,
    pub matched_id: String,
    pub status: MatchStatus,
}

impl MatchResult {
    pub fn is_accepted(&self) -> bool {
        self.status == MatchStatus::Accepted
    }
}

/// 照合結果一式
///
/// どちらのリストも入力された室名の順序を保つ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub threshold: u8,
    pub accepted: Vec<MatchResult>,
    pub pending: Vec<MatchResult>,
}

/// 集計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub pending: usize,
}

impl MatchSummary {
    pub fn all_accepted(&self) -> bool {
        self.pending == 0
    }
}

impl MatchReport {
    /// 照合順の結果列をマッチ/保留に振り分ける
    pub fn partition(results: Vec<MatchResult>, threshold: u8) -> Self {
        let (accepted, pending) = results.into_iter().partition(MatchResult::is_accepted);
        Self {
            threshold,
            accepted,
            pending,
        }
    }

    /// マッチ→保留の順で全件を返す（CSV出力順）
    pub fn results(&self) -> impl Iterator<Item = &MatchResult> {
        self.accepted.iter().chain(self.pending.iter())
    }

    /// 照合した室名の順に並べ直す
    ///
    /// 両リストとも入力順を保っているので、`queries` に沿って先頭から取り出す。
    pub fn in_query_order<'a>(&'a self, queries: &[LabeledItem]) -> Vec<&'a MatchResult> {
        let mut accepted = self.accepted.iter().peekable();
        let mut pending = self.pending.iter().peekable();
        let mut ordered = Vec::with_capacity(self.len());

        for query in queries {
            let is_query = |r: &&MatchResult| r.query_id == query.id && r.query_name == query.name;
            if let Some(r) = accepted.next_if(is_query) {
                ordered.push(r);
            } else if let Some(r) = pending.next_if(is_query) {
                ordered.push(r);
            }
        }

        ordered
    }

    pub fn len(&self) -> usize {
        self.accepted.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            total: self.len(),
            accepted: self.accepted.len(),
            pending: self.pending.len(),
        }
    }
}

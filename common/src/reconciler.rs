//! 照合の一括実行
//!
//! 参照DBの室名一覧から候補リストとID索引を一度だけ作り、
//! 対象DBの室名をすべて照合してマッチ/保留に振り分ける。
//! Notionへの書き込みなどの副作用は持たない。

use crate::error::{MatchError, Result};
use crate::matcher::classify;
use crate::scorer::Scorer;
use crate::types::{LabeledItem, MatchReport, MatchResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 参照DBに同じ室名が複数ある場合のID採用方針
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// 後に出てきたIDを採用
    #[default]
    Last,
    /// 最初に出てきたIDを採用
    First,
    /// 重複があればエラー
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last" => Ok(DuplicatePolicy::Last),
            "first" => Ok(DuplicatePolicy::First),
            "reject" => Ok(DuplicatePolicy::Reject),
            _ => Err(format!("Unknown duplicate policy: {}. Use last, first, or reject", s)),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Last => write!(f, "last"),
            DuplicatePolicy::First => write!(f, "first"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// 照合オプション
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// この値以上をマッチとする (0-100)
    pub threshold: u8,
    pub duplicate_policy: DuplicatePolicy,
    /// 室名ごとの照合を並列実行する（出力順は変わらない）
    pub parallel: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 70,
            duplicate_policy: DuplicatePolicy::default(),
            parallel: true,
        }
    }
}

/// 候補リストとID索引
#[derive(Debug, Clone, Default)]
pub struct PoolIndex {
    /// DB順の室名（重複もそのまま残す）
    pub names: Vec<String>,
    /// 室名→ページID
    pub ids: HashMap<String, String>,
}

impl PoolIndex {
    pub fn build(pool: &[LabeledItem], policy: DuplicatePolicy) -> Result<Self> {
        let mut names = Vec::with_capacity(pool.len());
        let mut ids: HashMap<String, String> = HashMap::with_capacity(pool.len());

        for item in pool {
            names.push(item.name.clone());

            if ids.contains_key(&item.name) {
                match policy {
                    DuplicatePolicy::Last => {
                        tracing::debug!(name = %item.name, id = %item.id, "Duplicate label, using later id");
                        ids.insert(item.name.clone(), item.id.clone());
                    }
                    DuplicatePolicy::First => {
                        tracing::debug!(name = %item.name, id = %item.id, "Duplicate label, keeping earlier id");
                    }
                    DuplicatePolicy::Reject => {
                        return Err(MatchError::DuplicateLabel(item.name.clone()));
                    }
                }
            } else {
                ids.insert(item.name.clone(), item.id.clone());
            }
        }

        Ok(Self { names, ids })
    }
}

/// 照合の実行役
pub struct Reconciler<'a> {
    scorer: &'a dyn Scorer,
    options: MatchOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(scorer: &'a dyn Scorer, options: MatchOptions) -> Result<Self> {
        if options.threshold > 100 {
            return Err(MatchError::InvalidThreshold(options.threshold as u16));
        }
        Ok(Self { scorer, options })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// 対象の室名をすべて照合する
    ///
    /// 結果は入力順を保ったままマッチ/保留に振り分けられる。
    pub fn reconcile(&self, queries: &[LabeledItem], pool: &[LabeledItem]) -> Result<MatchReport> {
        let threshold = self.options.threshold;

        if queries.is_empty() {
            return Ok(MatchReport::partition(Vec::new(), threshold));
        }
        if pool.is_empty() {
            return Err(MatchError::EmptyPool);
        }

        let index = PoolIndex::build(pool, self.options.duplicate_policy)?;

        tracing::info!(
            queries = queries.len(),
            pool = index.names.len(),
            unique_pool = index.ids.len(),
            scorer = self.scorer.name(),
            threshold,
            "Reconciling"
        );

        let classify_one =
            |query: &LabeledItem| classify(self.scorer, query, &index.names, &index.ids, threshold);

        let results: Vec<MatchResult> = if self.options.parallel {
            queries.par_iter().map(classify_one).collect::<Result<_>>()?
        } else {
            queries.iter().map(classify_one).collect::<Result<_>>()?
        };

        Ok(MatchReport::partition(results, threshold))
    }
}

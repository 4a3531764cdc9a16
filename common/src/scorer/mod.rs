//! 類似度スコアラー
//!
//! 字句（編集距離）と意味（埋め込みのコサイン類似度）の2方式を
//! 同じ `Scorer` トレイトで扱う。Matcher/Reconciler は具象型を知らない。

pub mod lexical;
pub mod semantic;

pub use lexical::LexicalScorer;
pub use semantic::{cosine_similarity, EmbeddingProvider, SemanticScorer};

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// 候補1件のスコア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    pub candidate: String,
    /// 類似度 (0-100)
    pub score: u8,
}

impl Scored {
    pub fn new(candidate: impl Into<String>, score: u8) -> Self {
        Self {
            candidate: candidate.into(),
            score,
        }
    }
}

/// 類似度スコアラー
pub trait Scorer: Send + Sync {
    /// 方式名（ログ用）
    fn name(&self) -> &'static str;

    /// プールの全候補を採点する（プール順を保つ）
    fn score_all(&self, query: &str, pool: &[String]) -> Result<Vec<Scored>>;

    /// 最高スコアの候補を返す
    ///
    /// 同点の場合はプール内で先に現れた候補。
    fn best_of(&self, query: &str, pool: &[String]) -> Result<Scored> {
        if pool.is_empty() {
            return Err(MatchError::EmptyPool);
        }
        select_best(self.score_all(query, pool)?)
    }
}

/// 最大スコアの候補を選ぶ（同点は先勝ち）
pub fn select_best(scored: Vec<Scored>) -> Result<Scored> {
    let mut best: Option<Scored> = None;
    for s in scored {
        match &best {
            Some(b) if s.score <= b.score => {}
            _ => best = Some(s),
        }
    }
    best.ok_or(MatchError::EmptyPool)
}

/// スコア方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// 編集距離ベース
    #[default]
    Lexical,
    /// 埋め込みベクトルのコサイン類似度
    Semantic,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "fuzzy" => Ok(Strategy::Lexical),
            "semantic" | "embedding" => Ok(Strategy::Semantic),
            _ => Err(format!("Unknown strategy: {}. Use lexical or semantic", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Lexical => write!(f, "lexical"),
            Strategy::Semantic => write!(f, "semantic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 文字列長の一致度を返すだけのテスト用スコアラー
    struct LengthScorer;

    impl Scorer for LengthScorer {
        fn name(&self) -> &'static str {
            "length"
        }

        fn score_all(&self, query: &str, pool: &[String]) -> Result<Vec<Scored>> {
            Ok(pool
                .iter()
                .map(|c| {
                    let diff = query.len().abs_diff(c.len()).min(100);
                    Scored::new(c.clone(), (100 - diff) as u8)
                })
                .collect())
        }
    }

    #[test]
    fn test_select_best_first_wins_on_tie() {
        let scored = vec![Scored::new("a", 50), Scored::new("b", 80), Scored::new("c", 80)];
        assert_eq!(select_best(scored).unwrap(), Scored::new("b", 80));
    }

    #[test]
    fn test_select_best_empty() {
        assert_eq!(select_best(vec![]), Err(MatchError::EmptyPool));
    }

    #[test]
    fn test_best_of_empty_pool() {
        let result = LengthScorer.best_of("room", &[]);
        assert_eq!(result, Err(MatchError::EmptyPool));
    }

    #[test]
    fn test_best_of_default_method() {
        let pool = vec!["ab".to_string(), "abcd".to_string(), "wxyz".to_string()];
        let best = LengthScorer.best_of("1234", &pool).unwrap();
        assert_eq!(best, Scored::new("abcd", 100));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lexical".parse::<Strategy>().unwrap(), Strategy::Lexical);
        assert_eq!("Semantic".parse::<Strategy>().unwrap(), Strategy::Semantic);
        assert!("bm25".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default().to_string(), "lexical");
    }
}

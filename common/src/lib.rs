//! Room Match Common Library
//!
//! 室名照合のコア。Notion・ファイル入出力には依存しない。

pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod reconciler;
pub mod scorer;
pub mod types;

pub use error::{MatchError, Result};
pub use matcher::classify;
pub use reconciler::{DuplicatePolicy, MatchOptions, PoolIndex, Reconciler};
pub use scorer::{
    cosine_similarity, EmbeddingProvider, LexicalScorer, Scored, Scorer, SemanticScorer, Strategy,
};
pub use types::{LabeledItem, MatchReport, MatchResult, MatchStatus, MatchSummary};

//! 意味スコア（埋め込みベクトルのコサイン類似度）
//!
//! 参照プールと照合する室名を `prepare` で一度だけ埋め込み、
//! 以降の採点はキャッシュしたベクトル同士の計算のみ行う。

use super::{Scored, Scorer};
use crate::error::{MatchError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// 埋め込みベクトルの提供元
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// 入力と同じ順序・同じ件数のベクトルを返す
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// 埋め込みベースのスコアラー
#[derive(Debug, Clone, Default)]
pub struct SemanticScorer {
    vectors: HashMap<String, Vec<f32>>,
}

impl SemanticScorer {
    /// プールと照合元の室名をまとめて埋め込む
    ///
    /// 同じ文字列は1回だけ埋め込む。空文字列は埋め込まず、類似度0として扱う。
    pub async fn prepare(
        provider: &dyn EmbeddingProvider,
        pool: &[String],
        queries: &[String],
    ) -> Result<Self> {
        let mut unique: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for text in pool.iter().chain(queries.iter()) {
            if text.trim().is_empty() {
                continue;
            }
            if seen.insert(text.as_str()) {
                unique.push(text.clone());
            }
        }

        if unique.is_empty() {
            return Ok(Self::default());
        }

        tracing::debug!(count = unique.len(), "Embedding labels");
        let embeddings = provider.embed(&unique).await?;

        if embeddings.len() != unique.len() {
            return Err(MatchError::Embedding(format!(
                "ベクトル数が一致しません（入力{}件、出力{}件）",
                unique.len(),
                embeddings.len()
            )));
        }

        Ok(Self::from_vectors(unique.into_iter().zip(embeddings)))
    }

    /// 計算済みのベクトルから作成
    pub fn from_vectors(vectors: impl IntoIterator<Item = (String, Vec<f32>)>) -> Self {
        Self {
            vectors: vectors.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn vector(&self, text: &str) -> Result<&[f32]> {
        const EMPTY: &[f32] = &[];
        if text.trim().is_empty() {
            return Ok(EMPTY);
        }
        self.vectors
            .get(text)
            .map(Vec::as_slice)
            .ok_or_else(|| MatchError::Embedding(format!("未準備の文字列です: {}", text)))
    }
}

impl Scorer for SemanticScorer {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score_all(&self, query: &str, pool: &[String]) -> Result<Vec<Scored>> {
        let query_vector = self.vector(query)?;

        pool.iter()
            .map(|candidate| {
                let candidate_vector = self.vector(candidate)?;
                let similarity = cosine_similarity(query_vector, candidate_vector);
                Ok(Scored::new(candidate.clone(), similarity_to_score(similarity)))
            })
            .collect()
    }
}

/// コサイン類似度
///
/// 次元が違う、またはどちらかのノルムが0の場合は0。
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn similarity_to_score(similarity: f32) -> u8 {
    if !similarity.is_finite() {
        return 0;
    }
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

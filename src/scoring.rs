//! スコアラーの生成
//!
//! 方式に応じて採点可能な状態のスコアラーを返す。
//! 意味スコアの場合はモデルの確認・取得と埋め込みまでここで済ませる。

use crate::config::Config;
use crate::error::Result;
use crate::ollama::OllamaEmbedder;
use room_match_common::{LabeledItem, LexicalScorer, Scorer, SemanticScorer, Strategy};

pub async fn build_scorer(
    strategy: Strategy,
    config: &Config,
    pool: &[LabeledItem],
    queries: &[LabeledItem],
) -> Result<Box<dyn Scorer>> {
    match strategy {
        Strategy::Lexical => Ok(Box::new(LexicalScorer::new())),
        Strategy::Semantic => {
            let embedder = OllamaEmbedder::new(config.embedding.clone())?;
            embedder.ensure_model().await?;

            let pool_names = names(pool);
            let query_names = names(queries);
            let scorer = SemanticScorer::prepare(&embedder, &pool_names, &query_names).await?;

            tracing::info!(model = %embedder.model(), vectors = scorer.len(), "Semantic scorer ready");
            Ok(Box::new(scorer))
        }
    }
}

fn names(items: &[LabeledItem]) -> Vec<String> {
    items.iter().map(|i| i.name.clone()).collect()
}

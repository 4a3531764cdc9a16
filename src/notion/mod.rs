//! Notion連携
//!
//! データベースの全件取得と室名の取り出し、リレーションの書き込み。

pub mod client;
pub mod extract;
pub mod types;

pub use client::NotionClient;
pub use extract::{extract_database_id, extract_labeled_item};
pub use types::Page;

use crate::error::Result;
use async_trait::async_trait;
use room_match_common::LabeledItem;

/// データベースの読み出し
#[async_trait]
pub trait DatabaseReader: Send + Sync {
    /// 全ページを取得する（ページングは実装側で最後まで辿る）
    async fn fetch_all(&self, database_id: &str) -> Result<Vec<Page>>;
}

/// データベースを全件取得し、室名とページIDの一覧にする
///
/// タイトルが無い・空のページは除外する。順序はDBの返却順。
pub async fn fetch_labeled_items(
    reader: &dyn DatabaseReader,
    database_id: &str,
    property_key: &str,
) -> Result<Vec<LabeledItem>> {
    let pages = reader.fetch_all(database_id).await?;
    let total = pages.len();

    let items: Vec<LabeledItem> = pages
        .iter()
        .filter_map(|page| extract_labeled_item(page, property_key))
        .collect();

    if items.len() < total {
        tracing::warn!(
            database_id = %database_id,
            property = %property_key,
            skipped = total - items.len(),
            "Pages without a title were skipped"
        );
    }

    Ok(items)
}

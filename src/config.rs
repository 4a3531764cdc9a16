use crate::error::{RoomMatchError, Result};
use room_match_common::{DuplicatePolicy, Strategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 固定の参照元DB（AZS DB）
pub const DEFAULT_REFERENCE_DATABASE_ID: &str = "02c8dffa2f6e45c1898c36b04503bd23";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notion_token: Option<String>,
    /// 参照元DB（候補プール）
    pub reference_database_id: String,
    /// 対象DBの室名プロパティ
    pub source_property_key: String,
    /// 参照元DBの室名プロパティ
    pub pool_property_key: String,
    /// 書き込むリレーションプロパティ
    pub relation_property: String,
    pub threshold: u8,
    pub strategy: Strategy,
    pub duplicate_policy: DuplicatePolicy,
    pub notion_version: String,
    /// 429/5xx時の再試行回数
    pub max_retries: u32,
    pub timeout_seconds: u64,
    pub embedding: EmbeddingConfig,
}

/// 意味スコア用の埋め込みモデル設定（Ollama）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    pub batch_size: usize,
    /// モデルが無ければ取得する
    pub auto_pull: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:11434".into(),
            model: "bge-m3".into(), // 日本語対応の多言語モデル
            batch_size: 32,
            auto_pull: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion_token: None,
            reference_database_id: DEFAULT_REFERENCE_DATABASE_ID.into(),
            source_property_key: "Name".into(),
            pool_property_key: "部屋名".into(),
            relation_property: "AZS DB".into(),
            threshold: 70,
            strategy: Strategy::Lexical,
            duplicate_policy: DuplicatePolicy::Last,
            notion_version: "2022-06-28".into(),
            max_retries: 3,
            timeout_seconds: 30,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RoomMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("room-match").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold > 100 {
            return Err(RoomMatchError::Config(format!(
                "threshold は0〜100で指定してください: {}",
                self.threshold
            )));
        }
        if self.source_property_key.is_empty() || self.pool_property_key.is_empty() {
            return Err(RoomMatchError::Config("室名プロパティ名が空です".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(RoomMatchError::Config("embedding.batch_size は1以上にしてください".into()));
        }
        Ok(())
    }

    pub fn get_token(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(token) = std::env::var("NOTION_TOKEN") {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        self.notion_token.clone().ok_or(RoomMatchError::MissingToken)
    }

    pub fn set_token(&mut self, token: String) -> Result<()> {
        self.notion_token = Some(token);
        self.save()
    }

    pub fn set_reference_database(&mut self, database_id: String) -> Result<()> {
        self.reference_database_id = database_id;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.threshold, 70);
        assert_eq!(config.source_property_key, "Name");
        assert_eq!(config.pool_property_key, "部屋名");
        assert_eq!(config.relation_property, "AZS DB");
        assert_eq!(config.strategy, Strategy::Lexical);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.reference_database_id, DEFAULT_REFERENCE_DATABASE_ID);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            threshold: 85,
            strategy: Strategy::Semantic,
            pool_property_key: "室名".into(),
            ..Default::default()
        };
        config.save_to(&path).expect("設定保存失敗");

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.threshold, 85);
        assert_eq!(loaded.strategy, Strategy::Semantic);
        assert_eq!(loaded.pool_property_key, "室名");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"threshold": 60, "duplicate_policy": "first"}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.threshold, 60);
        assert_eq!(loaded.duplicate_policy, DuplicatePolicy::First);
        assert_eq!(loaded.relation_property, "AZS DB");
        assert_eq!(loaded.embedding.batch_size, 32);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"threshold": 120}"#).unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(RoomMatchError::Config(_))));
    }
}

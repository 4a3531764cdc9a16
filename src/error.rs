use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoomMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("Notionトークンが設定されていません。環境変数 NOTION_TOKEN か `notion-room-match config --set-token YOUR_TOKEN` で設定してください")]
    MissingToken,

    #[error("無効なURL形式です。NotionのデータベースURLを確認してください: {0}")]
    InvalidDatabaseUrl(String),

    #[error("データベース {database_id} の取得に失敗: {message}")]
    Fetch { database_id: String, message: String },

    #[error("ページ {page_id} のリレーション更新に失敗: {message}")]
    RelationWrite { page_id: String, message: String },

    #[error("API呼び出しエラー: {0}")]
    Api(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Match(#[from] room_match_common::MatchError),
}

pub type Result<T> = std::result::Result<T, RoomMatchError>;

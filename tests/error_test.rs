//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use notion_room_match::config::Config;
use notion_room_match::error::RoomMatchError;
use notion_room_match::notion::extract_database_id;
use notion_room_match::source;
use room_match_common::{LexicalScorer, MatchError, MatchOptions, Reconciler};
use std::path::Path;
use tempfile::tempdir;

/// URLでもIDでもない入力
#[test]
fn test_invalid_database_url() {
    let err = extract_database_id("https://www.notion.so/workspace/not-a-database").unwrap_err();
    assert!(matches!(err, RoomMatchError::InvalidDatabaseUrl(_)));
}

/// 存在しないJSONファイル
#[test]
fn test_missing_source_file() {
    let err = source::load_labeled_items(Path::new("/nonexistent/path/12345.json")).unwrap_err();
    assert!(matches!(err, RoomMatchError::FileNotFound(_)));
    assert!(err.to_string().contains("12345.json"));
}

/// 照合エラーはメッセージをそのまま引き継ぐ
#[test]
fn test_match_error_is_transparent() {
    let err: RoomMatchError = MatchError::EmptyPool.into();
    assert!(matches!(err, RoomMatchError::Match(MatchError::EmptyPool)));
    assert_eq!(err.to_string(), MatchError::EmptyPool.to_string());
}

/// しきい値が範囲外
#[test]
fn test_invalid_threshold() {
    let scorer = LexicalScorer::new();
    let result = Reconciler::new(
        &scorer,
        MatchOptions {
            threshold: 101,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(MatchError::InvalidThreshold(101))));
}

/// 設定ファイルの値が不正
#[test]
fn test_invalid_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"threshold": 150}"#).unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, RoomMatchError::Config(_)));
}

/// 壊れた設定ファイル
#[test]
fn test_broken_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{threshold:").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, RoomMatchError::JsonParse(_)));
}

/// 取得エラーにはDB IDが含まれる
#[test]
fn test_fetch_error_message() {
    let err = RoomMatchError::Fetch {
        database_id: "0123456789abcdef0123456789abcdef".into(),
        message: "HTTP 404".into(),
    };
    let message = err.to_string();
    assert!(message.contains("0123456789abcdef0123456789abcdef"));
    assert!(message.contains("HTTP 404"));
}

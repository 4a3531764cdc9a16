//! Notion室名自動マッチングツール
//!
//! 対象DBの室名を参照元DBの室名と照合し、CSV出力とリレーション設定を行う。
//! 照合のコアは `room-match-common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod notion;
pub mod ollama;
pub mod relation;
pub mod scoring;
pub mod source;

//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的な型定義を管理します。
//! - 設定エラー: 環境変数・設定ファイル・設定値の検証
//! - インフラエラー: ファイル、シリアライゼーション、HTTP

pub mod config;
pub mod error;

// 便利な再エクスポート
pub use config::{ConfigError, ConfigResult};
pub use error::{InfraError, InfraResult};

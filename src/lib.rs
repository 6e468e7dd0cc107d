//! ロシア語ニュースの集約・感情分析ダッシュボード
//!
//! 3トピック（ВИШ・ВСМ・РЖД）の記事を取得し、重複排除・並べ替え・感情分析・
//! キーワードによる絞り込みを行い、JSONとHTMLダッシュボードを出力する。

pub mod app;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod types;

use crate::domain::topic::{Topic, TopicSet};
use crate::infra::api::classifier::ClassifierConfig;
use crate::infra::api::http::{RetryPolicy, MAX_BACKOFF_SECS};
use crate::infra::api::newsapi::DEFAULT_NEWSAPI_BASE_URL;
use crate::infra::storage::file::load_yaml_from_file;
use crate::types::config::{optional_env, required_env};
use crate::types::{ConfigError, InfraResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// パイプライン設定ファイルのデフォルトパス
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.yaml";

const ENV_NEWSAPI_KEY: &str = "NEWSAPI_API_KEY";
const ENV_HF_TOKEN: &str = "HF_API_TOKEN";
const ENV_CONFIG_PATH: &str = "NEWS_CONFIG";
const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// 出力ファイルの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_path: String,
    pub html_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "all_articles.json".to_string(),
            html_path: "news_dashboard.html".to_string(),
        }
    }
}

/// パイプライン全体の設定
///
/// YAMLで一部の項目だけを指定した場合、残りはデフォルト値になる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub newsapi_base_url: Option<String>,
    pub topics: TopicSet,
    pub retry: RetryPolicy,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// YAMLファイルから読み込む。ファイルがなければデフォルト値を使う
    pub fn load(file_path: &str) -> InfraResult<Self> {
        let config: Self = if Path::new(file_path).exists() {
            info!(path = file_path, "パイプライン設定を読み込みます");
            load_yaml_from_file(file_path)?
        } else {
            info!(path = file_path, "設定ファイルがないためデフォルト設定を使用します");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// 明示的に指定されたYAMLファイルから読み込む。ファイルがなければエラー
    pub fn load_required(file_path: &str) -> InfraResult<Self> {
        if !Path::new(file_path).exists() {
            return Err(ConfigError::missing_config_file(file_path).into());
        }
        Self::load(file_path)
    }

    pub fn newsapi_base_url(&self) -> &str {
        self.newsapi_base_url
            .as_deref()
            .unwrap_or(DEFAULT_NEWSAPI_BASE_URL)
    }

    /// 設定値を検証する
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, topic) in self.topics.iter() {
            validate_topic(name, topic)?;
        }

        if self.retry.max_retries > 10 {
            return Err(ConfigError::invalid_value(
                "retry.max_retries",
                "10以下である必要があります",
            ));
        }
        let backoff = self.retry.backoff_factor;
        if !backoff.is_finite() || !(0.0..=MAX_BACKOFF_SECS).contains(&backoff) {
            return Err(ConfigError::invalid_value(
                "retry.backoff_factor",
                format!("0以上{}以下である必要があります", MAX_BACKOFF_SECS),
            ));
        }
        if self.output.json_path.trim().is_empty() || self.output.html_path.trim().is_empty() {
            return Err(ConfigError::invalid_value("output", "出力パスが空です"));
        }
        Ok(())
    }
}

fn validate_topic(name: &str, topic: &Topic) -> Result<(), ConfigError> {
    if topic.query.trim().is_empty() {
        return Err(ConfigError::invalid_value(
            format!("topics.{}.query", name),
            "検索クエリが空です",
        ));
    }
    if topic.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::invalid_value(
            format!("topics.{}.keywords", name),
            "空のキーワードは指定できません",
        ));
    }
    Ok(())
}

/// 環境変数とYAMLから組み立てたアプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub newsapi_api_key: String,
    pub hf_api_token: Option<String>,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// 環境変数（.envを含む）から設定を読み込む
    pub fn from_env() -> InfraResult<Self> {
        let newsapi_api_key = required_env(ENV_NEWSAPI_KEY)?;
        // NEWS_CONFIGで指定されたファイルは必須、未指定ならデフォルトパスを任意で読む
        let pipeline = match optional_env(ENV_CONFIG_PATH) {
            Some(path) => PipelineConfig::load_required(&path)?,
            None => PipelineConfig::load(DEFAULT_CONFIG_PATH)?,
        };

        Ok(Self {
            newsapi_api_key,
            hf_api_token: optional_env(ENV_HF_TOKEN),
            pipeline,
        })
    }
}

/// `LOG_LEVEL`環境変数（未設定ならinfo）
pub fn log_level_from_env() -> String {
    optional_env(ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string())
}

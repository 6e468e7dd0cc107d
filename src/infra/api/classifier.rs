use crate::domain::article::Sentiment;
use crate::domain::sentiment::{Classification, SentimentClassifier};
use crate::infra::api::http::HttpClient;
use crate::types::InfraError;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 推論APIのデフォルトエンドポイント
pub const DEFAULT_INFERENCE_ENDPOINT: &str = "https://api-inference.huggingface.co";
/// ロシア語の感情分類モデル（ラベル: POSITIVE / NEGATIVE / NEUTRAL）
pub const DEFAULT_SENTIMENT_MODEL: &str = "blanchefort/rubert-base-cased-sentiment";

/// 分類器の接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            model: DEFAULT_SENTIMENT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

// 推論APIはモデルや入力形式によって入れ子のリストかフラットなリストを返す
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

/// 推論APIのレスポンス本文から最もスコアの高いラベルを取り出す
pub fn parse_inference_response(body: &str) -> Result<Classification> {
    let response: InferenceResponse =
        serde_json::from_str(body).map_err(|e| InfraError::serialization("推論APIレスポンス", e))?;

    let candidates = match response {
        InferenceResponse::Nested(mut lists) => {
            if lists.is_empty() {
                Vec::new()
            } else {
                lists.swap_remove(0)
            }
        }
        InferenceResponse::Flat(list) => list,
        InferenceResponse::Error { error } => {
            return Err(anyhow!("推論APIがエラーを返しました: {}", error))
        }
    };

    let best = candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| anyhow!("推論APIのレスポンスにラベルがありません"))?;

    let label = Sentiment::from_label(&best.label)
        .ok_or_else(|| anyhow!("未知の感情ラベル: {}", best.label))?;

    Ok(Classification::new(label, best.score))
}

/// 推論APIを呼び出す感情分類器
pub struct HuggingFaceClassifier<H: HttpClient> {
    client: H,
    config: ClassifierConfig,
    api_token: Option<String>,
}

impl<H: HttpClient> HuggingFaceClassifier<H> {
    pub fn new(client: H, config: ClassifierConfig, api_token: Option<String>) -> Self {
        Self {
            client,
            config,
            api_token,
        }
    }

    pub fn client(&self) -> &H {
        &self.client
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl<H: HttpClient> SentimentClassifier for HuggingFaceClassifier<H> {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let url = self.model_url();
        let body = serde_json::json!({ "inputs": text });

        let response = self
            .client
            .post_json(&url, self.api_token.as_deref(), &body)
            .await
            .context("推論APIへのリクエストに失敗")?;

        if !response.is_success() {
            return Err(InfraError::http_status(url, response.status, response.body).into());
        }

        parse_inference_response(&response.body)
            .with_context(|| format!("感情分類結果の解析に失敗: {}", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::api::http::MockHttpClient;

    mod parsing_tests {
        use super::*;

        #[test]
        fn test_parse_nested_response_picks_best() {
            let body = r#"[[
                {"label": "NEUTRAL", "score": 0.12},
                {"label": "POSITIVE", "score": 0.81},
                {"label": "NEGATIVE", "score": 0.07}
            ]]"#;

            let classification = parse_inference_response(body).unwrap();

            assert_eq!(classification.label, Sentiment::Positive);
            assert_eq!(classification.score, 0.81);
        }

        #[test]
        fn test_parse_flat_response() {
            let body = r#"[{"label": "negative", "score": 0.66}]"#;

            let classification = parse_inference_response(body).unwrap();

            assert_eq!(classification.label, Sentiment::Negative);
        }

        #[test]
        fn test_parse_error_response() {
            let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;

            let err = parse_inference_response(body).unwrap_err();

            assert!(err.to_string().contains("Model is currently loading"));
        }

        #[test]
        fn test_parse_unknown_label() {
            let body = r#"[[{"label": "LABEL_1", "score": 0.9}]]"#;

            assert!(parse_inference_response(body).is_err(), "未知のラベルはエラーになるべき");
        }

        #[test]
        fn test_parse_empty_and_garbage() {
            assert!(parse_inference_response("[]").is_err());
            assert!(parse_inference_response("[[]]").is_err());
            assert!(parse_inference_response("not json").is_err());
        }
    }

    mod classifier_tests {
        use super::*;

        #[tokio::test]
        async fn test_classify_with_mock() {
            let client = MockHttpClient::new_success(r#"[[{"label":"NEUTRAL","score":0.95}]]"#);
            let classifier = HuggingFaceClassifier::new(
                client,
                ClassifierConfig::default(),
                Some("hf_test".to_string()),
            );

            let classification = classifier.classify("РЖД объявила тендер").await.unwrap();

            assert_eq!(classification.label, Sentiment::Neutral);
            let recorded = classifier.client().recorded();
            assert_eq!(
                recorded[0].url,
                "https://api-inference.huggingface.co/models/blanchefort/rubert-base-cased-sentiment"
            );
            assert_eq!(
                recorded[0].body,
                Some(serde_json::json!({"inputs": "РЖД объявила тендер"}))
            );
            assert_eq!(recorded[0].bearer_token.as_deref(), Some("hf_test"));
        }

        #[tokio::test]
        async fn test_classify_http_error() {
            let client = MockHttpClient::new_status(503, r#"{"error":"overloaded"}"#);
            let classifier = HuggingFaceClassifier::new(client, ClassifierConfig::default(), None);

            let err = classifier.classify("ВСМ").await.unwrap_err();

            assert!(err.to_string().contains("503"));
        }
    }
}

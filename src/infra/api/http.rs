use crate::types::InfraError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// リクエスト全体のタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// HTTPレスポンスの最小表現
///
/// 2xx以外のステータスもエラーにせずそのまま返す。
/// 呼び出し側がステータスコードと本文をログに残せるようにするため。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 再試行前の待機時間の上限（秒）
pub const MAX_BACKOFF_SECS: f64 = 120.0;

/// 一時的なサーバーエラーに対するリトライ方針
///
/// `max_retries`は初回リクエスト後に行う再試行の回数。
/// n回目の再試行の前に `backoff_factor * 2^(n-1)` 秒（上限`MAX_BACKOFF_SECS`）待機する。
///
/// GETだけでなく推論APIへのPOSTにも同じ方針を適用する。
/// 推論リクエストは副作用がなく、再送しても結果が変わらないため。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor: 0.1,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// 待機なしのリトライ方針（テスト用）
    pub fn without_backoff(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_factor: 0.0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// `retry`回目（1始まり）の再試行前の待機時間
    pub fn backoff_for(&self, retry: u32) -> Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let secs = (self.backoff_factor * 2f64.powi(retry as i32 - 1)).min(MAX_BACKOFF_SECS);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::from_secs_f64(MAX_BACKOFF_SECS))
    }
}

/// HTTPクライアントの抽象化トレイト
///
/// 実際のHTTP通信とモック実装の両方を統一的に扱うためのインターフェース。
/// リトライは実装側の責務とする。
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// クエリパラメータ付きでGETする
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse>;

    /// JSON本文をPOSTする。`bearer_token`があればAuthorizationヘッダーに付与する
    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

/// `reqwest` を使用した本番用のHTTPクライアント実装
pub struct ReqwestHttpClient {
    client: Client,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// 新しいHTTPクライアントを作成
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| InfraError::http_transport("(client builder)", e))?;

        Ok(Self {
            client,
            retry,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// リトライ方針に従ってリクエストを送信する
    ///
    /// 再試行対象のステータスが返り続けた場合は、最後のレスポンスをそのまま返す。
    async fn send_with_retry<F>(&self, url: &str, build_request: F) -> Result<HttpResponse>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut retry = 0;
        loop {
            match build_request().timeout(self.timeout).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if self.retry.should_retry_status(status) && retry < self.retry.max_retries {
                        retry += 1;
                        warn!(url, status, retry, "一時的なサーバーエラー、再試行します");
                        tokio::time::sleep(self.retry.backoff_for(retry)).await;
                        continue;
                    }

                    let body = response
                        .text()
                        .await
                        .map_err(|e| InfraError::http_transport(url, e))?;
                    return Ok(HttpResponse::new(status, body));
                }
                Err(e) => {
                    let transient = e.is_connect() || e.is_timeout();
                    if transient && retry < self.retry.max_retries {
                        retry += 1;
                        warn!(url, retry, error = %e, "通信エラー、再試行します");
                        tokio::time::sleep(self.retry.backoff_for(retry)).await;
                        continue;
                    }
                    return Err(InfraError::http_transport(url, e).into());
                }
            }
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        self.send_with_retry(url, || self.client.get(url).query(query))
            .await
    }

    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        self.send_with_retry(url, || {
            let request = self.client.post(url).json(body);
            match bearer_token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        })
        .await
    }
}

/// テスト用のモックHTTPクライアント
///
/// 実際のHTTPリクエストを行わずに、定義済みのレスポンスやエラーを返す。
/// 受け取ったリクエストは`requests`に記録される。
pub struct MockHttpClient {
    /// モック時に返すレスポンス
    pub mock_response: HttpResponse,
    /// モック時に返すステータス（成功/失敗の制御）
    pub should_succeed: bool,
    /// エラー時に返すメッセージ
    pub error_message: Option<String>,
    /// 受け取ったリクエスト（URLとクエリ/本文）
    pub requests: Mutex<Vec<RecordedRequest>>,
}

/// モックが受け取ったリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer_token: Option<String>,
}

impl MockHttpClient {
    /// 200のレスポンスを返すモッククライアントを作成
    pub fn new_success(body: &str) -> Self {
        Self::new_status(200, body)
    }

    /// 任意のステータスのレスポンスを返すモッククライアントを作成
    pub fn new_status(status: u16, body: &str) -> Self {
        Self {
            mock_response: HttpResponse::new(status, body),
            should_succeed: true,
            error_message: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 通信エラーを返すモッククライアントを作成
    pub fn new_error(error_message: &str) -> Self {
        Self {
            mock_response: HttpResponse::new(0, ""),
            should_succeed: false,
            error_message: Some(error_message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 記録済みリクエストのコピーを返す
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: RecordedRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }

    fn respond(&self) -> Result<HttpResponse> {
        if self.should_succeed {
            Ok(self.mock_response.clone())
        } else {
            let error_msg = self.error_message.as_deref().unwrap_or("Mock HTTP error");
            Err(anyhow::anyhow!("モックHTTPエラー: {}", error_msg))
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        self.record(RecordedRequest {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
            bearer_token: None,
        });
        self.respond()
    }

    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        self.record(RecordedRequest {
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
            bearer_token: bearer_token.map(str::to_string),
        });
        self.respond()
    }
}

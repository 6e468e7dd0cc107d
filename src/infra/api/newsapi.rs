use crate::domain::article::Article;
use crate::infra::api::http::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, error, info};

/// NewsAPIのデフォルトのベースURL
pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org";

/// 記事の取得元の抽象化トレイト
///
/// 取得に失敗してもエラーは返さず、空のリストとして扱う。
/// 1つのクエリの失敗で実行全体を止めないため。
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, query: &str) -> Vec<Article>;
}

// NewsAPI `/v2/everything` のレスポンス（必要なフィールドのみ）
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    description: Option<String>,
}

impl NewsApiArticle {
    fn into_article(self) -> Option<Article> {
        let link = self.url.filter(|url| !url.is_empty())?;
        Some(Article {
            title: self.title.unwrap_or_default(),
            link,
            published: self.published_at.unwrap_or_default(),
            description: self.description,
            sentiment: None,
            subjectivity: None,
        })
    }
}

/// NewsAPIのレスポンス本文を記事リストに変換する
///
/// 解析できない本文や`articles`がない本文は0件として扱う。
pub fn parse_everything_response(query: &str, body: &str) -> Vec<Article> {
    let response: EverythingResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            info!(query, error = %e, "NewsAPIのレスポンスを解析できなかったため0件として扱います");
            return Vec::new();
        }
    };

    let articles: Vec<Article> = response
        .articles
        .into_iter()
        .filter_map(NewsApiArticle::into_article)
        .collect();

    if articles.is_empty() {
        info!(query, "NewsAPIのレスポンスに記事が見つかりませんでした");
    }
    articles
}

/// NewsAPIを使った記事取得元
pub struct NewsApiSource<H: HttpClient> {
    client: H,
    api_key: String,
    base_url: String,
}

impl<H: HttpClient> NewsApiSource<H> {
    pub fn new<K: Into<String>>(client: H, api_key: K) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_NEWSAPI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn client(&self) -> &H {
        &self.client
    }

    fn everything_url(&self) -> String {
        format!("{}/v2/everything", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl<H: HttpClient> ArticleSource for NewsApiSource<H> {
    async fn fetch_articles(&self, query: &str) -> Vec<Article> {
        let url = self.everything_url();
        let params = [("q", query), ("apiKey", self.api_key.as_str())];

        let response = match self.client.get(&url, &params).await {
            Ok(response) => response,
            Err(e) => {
                error!(query, error = %format!("{:#}", e), "NewsAPIへのリクエストに失敗しました");
                return Vec::new();
            }
        };

        if !response.is_success() {
            error!(
                query,
                status = response.status,
                body = %response.body,
                "NewsAPIがエラーを返しました"
            );
            return Vec::new();
        }

        let articles = parse_everything_response(query, &response.body);
        debug!(query, count = articles.len(), "記事を取得しました");
        for article in &articles {
            debug!(title = %article.title, link = %article.link, published = %article.published, "取得記事");
        }
        articles
    }
}

/// テスト用のモック記事取得元
///
/// クエリごとに定義済みの記事を返す。未定義のクエリは0件。
#[derive(Default)]
pub struct MockArticleSource {
    pub responses: HashMap<String, Vec<Article>>,
    /// 受け取ったクエリ（呼び出し順）
    pub queries: Mutex<Vec<String>>,
}

impl MockArticleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(mut self, query: &str, articles: Vec<Article>) -> Self {
        self.responses.insert(query.to_string(), articles);
        self
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArticleSource for MockArticleSource {
    async fn fetch_articles(&self, query: &str) -> Vec<Article> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        self.responses.get(query).cloned().unwrap_or_default()
    }
}

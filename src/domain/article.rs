use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 見出しの感情ラベル
///
/// シリアライズ時は分類モデルのラベル表記（`POSITIVE`など）に合わせる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }

    /// 分類モデルのラベル文字列を解釈する（大文字小文字は区別しない）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Some(Sentiment::Positive),
            "NEGATIVE" => Some(Sentiment::Negative),
            "NEUTRAL" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 記事エンティティ（ニュース検索APIの1件分 + 感情分析結果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// 記事の同一性を表すキー
    pub link: String,
    /// ISO 8601形式の公開日時。文字列のまま辞書順で比較する
    pub published: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub subjectivity: Option<f64>,
}

impl Article {
    /// 未分析の記事を作成
    pub fn new<T, L, P>(title: T, link: L, published: P) -> Self
    where
        T: Into<String>,
        L: Into<String>,
        P: Into<String>,
    {
        Self {
            title: title.into(),
            link: link.into(),
            published: published.into(),
            description: None,
            sentiment: None,
            subjectivity: None,
        }
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 感情分析の結果が両方そろっているか
    pub fn is_scored(&self) -> bool {
        self.sentiment.is_some() && self.subjectivity.is_some()
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.title, self.published, self.link)
    }
}

/// linkをキーに記事を重複排除する
///
/// 同じlinkが複数回現れた場合は**後に現れた記事の内容**を採用する。
/// 並び順は各linkが最初に現れた位置のまま。
pub fn dedup_by_link(articles: Vec<Article>) -> Vec<Article> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(articles.len());
    let mut unique: Vec<Article> = Vec::with_capacity(articles.len());

    for article in articles {
        match positions.get(&article.link) {
            Some(&index) => unique[index] = article,
            None => {
                positions.insert(article.link.clone(), unique.len());
                unique.push(article);
            }
        }
    }

    unique
}

/// 公開日時の降順（新しい順）に並べた新しいベクタを返す
///
/// 同じ日時の記事は入力の順序を保つ（安定ソート）。
pub fn sort_by_published_desc(articles: &[Article]) -> Vec<Article> {
    let mut sorted = articles.to_vec();
    sorted.sort_by(|a, b| b.published.cmp(&a.published));
    sorted
}

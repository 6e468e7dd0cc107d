use crate::domain::article::{Article, Sentiment};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// NEUTRALと判定された記事に設定する固定の主観度
pub const NEUTRAL_SUBJECTIVITY: f64 = 0.1;

/// 分類モデル1回分の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Sentiment,
    /// モデルの確信度（0.0〜1.0）
    pub score: f64,
}

impl Classification {
    pub fn new(label: Sentiment, score: f64) -> Self {
        Self { label, score }
    }
}

/// 感情分類モデルの抽象化トレイト
///
/// 本番では推論APIを呼び出す実装を、テストでは決定的なモックを注入する。
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// テキスト1件を分類する
    async fn classify(&self, text: &str) -> Result<Classification>;

    /// 複数テキストを分類する
    ///
    /// 戻り値は入力と同じ順序・同じ件数。デフォルト実装は1件ずつ順番に呼び出す。
    async fn classify_batch(&self, texts: &[&str]) -> Vec<Result<Classification>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify(text).await);
        }
        results
    }
}

/// 感情分析の結果
#[derive(Debug, Clone, Default)]
pub struct ScoringOutcome {
    /// 感情ラベルと主観度が設定された記事（入力順）
    pub analyzed: Vec<Article>,
    /// 分類に失敗して除外された記事数
    pub skipped: usize,
}

/// 各記事の**タイトルのみ**を分類し、sentimentとsubjectivityを設定する
///
/// 分類に失敗した記事はログを残してスキップし、処理を継続する。
/// スキップされた記事は結果に含まれない。
pub async fn score_articles(
    classifier: &dyn SentimentClassifier,
    articles: Vec<Article>,
) -> ScoringOutcome {
    let mut outcome = ScoringOutcome {
        analyzed: Vec::with_capacity(articles.len()),
        skipped: 0,
    };

    for mut article in articles {
        match classifier.classify(&article.title).await {
            Ok(classification) => {
                article.sentiment = Some(classification.label);
                article.subjectivity = Some(classification.score);
                debug!(
                    title = %article.title,
                    sentiment = %classification.label,
                    subjectivity = classification.score,
                    "感情分析完了"
                );
                outcome.analyzed.push(article);
            }
            Err(e) => {
                warn!(title = %article.title, link = %article.link, error = %e, "感情分析に失敗したためスキップ");
                outcome.skipped += 1;
            }
        }
    }

    info!(
        analyzed = outcome.analyzed.len(),
        skipped = outcome.skipped,
        "感情分析が完了しました"
    );
    outcome
}

/// NEUTRALの記事の主観度を固定値に置き換える
///
/// 何度適用しても結果は変わらない。
pub fn adjust_subjectivity(mut articles: Vec<Article>) -> Vec<Article> {
    for article in articles.iter_mut() {
        if article.sentiment == Some(Sentiment::Neutral) {
            article.subjectivity = Some(NEUTRAL_SUBJECTIVITY);
        }
    }
    articles
}

/// テスト用のモック分類器
///
/// タイトルに含まれる部分文字列でラベルを決める。
/// どのルールにも当たらなければ`default_label`を返す。
pub struct MockSentimentClassifier {
    pub rules: Vec<(String, Sentiment)>,
    pub default_label: Sentiment,
    pub score: f64,
    /// この部分文字列を含むテキストは分類エラーにする
    pub failing: Vec<String>,
}

impl MockSentimentClassifier {
    /// 常に同じラベルを返すモックを作成
    pub fn constant(label: Sentiment, score: f64) -> Self {
        Self {
            rules: Vec::new(),
            default_label: label,
            score,
            failing: Vec::new(),
        }
    }

    pub fn with_rule(mut self, needle: &str, label: Sentiment) -> Self {
        self.rules.push((needle.to_string(), label));
        self
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }
}

#[async_trait]
impl SentimentClassifier for MockSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        if let Some(needle) = self.failing.iter().find(|n| text.contains(n.as_str())) {
            return Err(anyhow!("モック分類エラー: {}", needle));
        }

        let label = self
            .rules
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, label)| *label)
            .unwrap_or(self.default_label);

        Ok(Classification::new(label, self.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_articles() -> Vec<Article> {
        vec![
            Article::new("РЖД запустила новый поезд", "https://example.ru/1", "2025-03-03"),
            Article::new("Авария на ВСМ", "https://example.ru/2", "2025-03-02"),
            Article::new("ВИШ провела день открытых дверей", "https://example.ru/3", "2025-03-01"),
        ]
    }

    fn rule_classifier() -> MockSentimentClassifier {
        MockSentimentClassifier::constant(Sentiment::Neutral, 0.87)
            .with_rule("новый", Sentiment::Positive)
            .with_rule("Авария", Sentiment::Negative)
    }

    mod scoring_tests {
        use super::*;

        #[tokio::test]
        async fn test_score_articles_sets_label_and_score() {
            let classifier = rule_classifier();

            let outcome = score_articles(&classifier, sample_articles()).await;

            assert_eq!(outcome.skipped, 0);
            assert_eq!(outcome.analyzed.len(), 3);
            assert!(outcome.analyzed.iter().all(|a| a.is_scored()), "全件が分析済みであるべき");
            assert_eq!(outcome.analyzed[0].sentiment, Some(Sentiment::Positive));
            assert_eq!(outcome.analyzed[1].sentiment, Some(Sentiment::Negative));
            assert_eq!(outcome.analyzed[2].sentiment, Some(Sentiment::Neutral));
            assert_eq!(outcome.analyzed[2].subjectivity, Some(0.87));
        }

        #[tokio::test]
        async fn test_score_articles_uses_title_only() {
            let classifier = MockSentimentClassifier::constant(Sentiment::Neutral, 0.5)
                .with_rule("тендер", Sentiment::Positive);
            let article = Article::new("Нейтральный заголовок", "l", "p")
                .with_description("тендер в описании");

            let outcome = score_articles(&classifier, vec![article]).await;

            assert_eq!(
                outcome.analyzed[0].sentiment,
                Some(Sentiment::Neutral),
                "descriptionは分類に使われないはず"
            );
        }

        #[tokio::test]
        async fn test_score_articles_skips_failures() {
            let classifier = rule_classifier().failing_on("ВСМ");

            let outcome = score_articles(&classifier, sample_articles()).await;

            assert_eq!(outcome.skipped, 1);
            assert_eq!(outcome.analyzed.len(), 2);
            assert!(outcome.analyzed.iter().all(|a| a.link != "https://example.ru/2"));
            // 順序は保たれる
            assert_eq!(outcome.analyzed[0].link, "https://example.ru/1");
            assert_eq!(outcome.analyzed[1].link, "https://example.ru/3");
        }

        #[tokio::test]
        async fn test_classify_batch_preserves_order() {
            let classifier = rule_classifier().failing_on("ошибка");

            let results = classifier
                .classify_batch(&["новый поезд", "ошибка", "Авария", "просто"])
                .await;

            assert_eq!(results.len(), 4);
            assert_eq!(results[0].as_ref().unwrap().label, Sentiment::Positive);
            assert!(results[1].is_err());
            assert_eq!(results[2].as_ref().unwrap().label, Sentiment::Negative);
            assert_eq!(results[3].as_ref().unwrap().label, Sentiment::Neutral);
        }
    }

    mod adjust_tests {
        use super::*;

        #[tokio::test]
        async fn test_adjust_only_touches_neutral() {
            let outcome = score_articles(&rule_classifier(), sample_articles()).await;

            let adjusted = adjust_subjectivity(outcome.analyzed);

            assert_eq!(adjusted[0].subjectivity, Some(0.87), "POSITIVEは変更されない");
            assert_eq!(adjusted[1].subjectivity, Some(0.87), "NEGATIVEは変更されない");
            assert_eq!(adjusted[2].subjectivity, Some(NEUTRAL_SUBJECTIVITY));
        }

        #[tokio::test]
        async fn test_adjust_is_idempotent() {
            let outcome = score_articles(&rule_classifier(), sample_articles()).await;

            let once = adjust_subjectivity(outcome.analyzed);
            let twice = adjust_subjectivity(once.clone());

            assert_eq!(once, twice, "2回適用しても結果は同じであるべき");
        }

        #[test]
        fn test_adjust_leaves_unscored_articles() {
            let adjusted = adjust_subjectivity(vec![Article::new("t", "l", "p")]);

            assert_eq!(adjusted[0].subjectivity, None);
        }
    }
}

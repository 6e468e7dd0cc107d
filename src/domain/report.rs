use crate::domain::article::Article;
use crate::domain::topic::{filter_articles_by_keywords, TopicSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 1回の実行で得られる全ての記事集合
///
/// JSONエクスポートはこの構造体をそのままシリアライズする。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    /// 重複排除後の記事（取得順）。分析済みのものは分析結果を反映済み
    pub unique_articles: Vec<Article>,
    /// 感情分析と主観度補正を終えた記事（新しい順）
    pub analyzed_articles: Vec<Article>,
    pub filtered_vish: Vec<Article>,
    pub filtered_high_speed: Vec<Article>,
    pub filtered_rzd: Vec<Article>,
    /// 3トピックのフィルタ結果を連結したもの（トピック間の重複は残す）
    pub final_articles: Vec<Article>,
}

/// 分析済み記事を3トピックで絞り込み、結果一式を組み立てる
///
/// `unique_articles`の順序は保ったまま、同じlinkの分析済み記事に置き換える。
/// 分類でスキップされた記事だけが未分析のまま残る。
pub fn assemble_result(
    unique_articles: Vec<Article>,
    analyzed_articles: Vec<Article>,
    topics: &TopicSet,
) -> ResultBundle {
    let filtered_vish = to_owned(filter_articles_by_keywords(
        &analyzed_articles,
        &topics.vish.keywords,
    ));
    let filtered_high_speed = to_owned(filter_articles_by_keywords(
        &analyzed_articles,
        &topics.high_speed.keywords,
    ));
    let filtered_rzd = to_owned(filter_articles_by_keywords(
        &analyzed_articles,
        &topics.rzd.keywords,
    ));

    let unique_articles = merge_enriched(unique_articles, &analyzed_articles);

    let final_articles = filtered_vish
        .iter()
        .chain(filtered_high_speed.iter())
        .chain(filtered_rzd.iter())
        .cloned()
        .collect();

    ResultBundle {
        unique_articles,
        analyzed_articles,
        filtered_vish,
        filtered_high_speed,
        filtered_rzd,
        final_articles,
    }
}

fn merge_enriched(unique_articles: Vec<Article>, analyzed_articles: &[Article]) -> Vec<Article> {
    let enriched: HashMap<&str, &Article> = analyzed_articles
        .iter()
        .map(|article| (article.link.as_str(), article))
        .collect();

    unique_articles
        .into_iter()
        .map(|article| match enriched.get(article.link.as_str()) {
            Some(analyzed) => (*analyzed).clone(),
            None => article,
        })
        .collect()
}

fn to_owned(view: Vec<&Article>) -> Vec<Article> {
    view.into_iter().cloned().collect()
}

/// 実行結果の件数サマリー
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub unique: usize,
    pub analyzed: usize,
    pub skipped: usize,
    pub vish: usize,
    pub high_speed: usize,
    pub rzd: usize,
    pub final_count: usize,
}

impl RunSummary {
    pub fn from_bundle(bundle: &ResultBundle, fetched: usize, skipped: usize) -> Self {
        Self {
            fetched,
            unique: bundle.unique_articles.len(),
            analyzed: bundle.analyzed_articles.len(),
            skipped,
            vish: bundle.filtered_vish.len(),
            high_speed: bundle.filtered_high_speed.len(),
            rzd: bundle.filtered_rzd.len(),
            final_count: bundle.final_articles.len(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "取得{}件、重複排除後{}件、分析済み{}件（スキップ{}件）、ВИШ {}件、ВСМ {}件、РЖД {}件、最終{}件",
            self.fetched,
            self.unique,
            self.analyzed,
            self.skipped,
            self.vish,
            self.high_speed,
            self.rzd,
            self.final_count
        )
    }
}

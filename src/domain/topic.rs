use crate::domain::article::Article;
use serde::{Deserialize, Serialize};

/// 検索クエリとキーワード群からなるトピック
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// ニュース検索APIに渡すクエリ
    pub query: String,
    /// トピックへの関連判定に使うキーワード（大文字小文字は区別しない）
    pub keywords: Vec<String>,
}

impl Topic {
    pub fn new(query: &str, keywords: &[&str]) -> Self {
        Self {
            query: query.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// 固定の3トピック
///
/// 取得とフィルタはこの順序（vish → high_speed → rzd）で行う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSet {
    /// 高等工学院（ВИШ）
    pub vish: Topic,
    /// 高速鉄道（ВСМ）
    pub high_speed: Topic,
    /// ロシア鉄道（РЖД）
    pub rzd: Topic,
}

impl Default for TopicSet {
    fn default() -> Self {
        Self {
            vish: Topic::new(
                "Высшая инженерная школа",
                &["инженерная школа", "РУТ МИИТ", "ВИШ"],
            ),
            high_speed: Topic::new(
                "ВСМ",
                &["ВСМ", "скоростные магистрали", "высокоскоростной"],
            ),
            rzd: Topic::new(
                "РЖД Российские Железные дороги",
                &["РЖД", "Российские железные дороги"],
            ),
        }
    }
}

impl TopicSet {
    /// 名前付きで3トピックを順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Topic)> {
        [
            ("vish", &self.vish),
            ("high_speed", &self.high_speed),
            ("rzd", &self.rzd),
        ]
        .into_iter()
    }
}

/// キーワードのいずれかがタイトルまたは説明文に含まれる記事だけを返す
///
/// 比較は小文字化した部分文字列一致。説明文がない記事は空文字列として扱う。
/// 入力の順序を保ち、記事は複製せず参照で返す。
pub fn filter_articles_by_keywords<'a>(
    articles: &'a [Article],
    keywords: &[String],
) -> Vec<&'a Article> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    articles
        .iter()
        .filter(|article| {
            let title = article.title.to_lowercase();
            let description = article
                .description
                .as_deref()
                .unwrap_or("")
                .to_lowercase();
            keywords
                .iter()
                .any(|keyword| title.contains(keyword) || description.contains(keyword))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_filter_matches_title() {
        let articles = vec![
            Article::new("РЖД объявила тендер", "https://example.ru/1", "2025-01-02"),
            Article::new("Погода в Москве", "https://example.ru/2", "2025-01-01"),
        ];

        let filtered = filter_articles_by_keywords(&articles, &keywords(&["РЖД"]));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "РЖД объявила тендер");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let articles = vec![
            Article::new("Новости рут миит", "1", "3"),
            Article::new("ВЫСОКОСКОРОСТНОЙ поезд", "2", "2"),
        ];

        let vish = filter_articles_by_keywords(&articles, &keywords(&["РУТ МИИТ"]));
        let high_speed = filter_articles_by_keywords(&articles, &keywords(&["высокоскоростной"]));

        assert_eq!(vish.len(), 1, "キリル文字も大文字小文字を区別しないはず");
        assert_eq!(vish[0].link, "1");
        assert_eq!(high_speed.len(), 1);
        assert_eq!(high_speed[0].link, "2");
    }

    #[test]
    fn test_filter_matches_description() {
        let articles = vec![
            Article::new("Заголовок без ключевых слов", "1", "2")
                .with_description("Проект ВСМ Москва — Петербург"),
            Article::new("Другой заголовок", "2", "1"),
        ];

        let filtered = filter_articles_by_keywords(&articles, &keywords(&["всм"]));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].link, "1");
    }

    #[test]
    fn test_filter_excludes_non_matching() {
        let articles = vec![Article::new("Курс рубля", "1", "1").with_description("Экономика")];

        let filtered = filter_articles_by_keywords(&articles, &keywords(&["РЖД", "ВСМ"]));

        assert!(filtered.is_empty(), "キーワードを含まない記事は除外されるべき");
    }

    #[test]
    fn test_filter_preserves_order_and_references() {
        let articles = vec![
            Article::new("РЖД 3", "c", "2025-01-03"),
            Article::new("прочее", "x", "2025-01-02"),
            Article::new("РЖД 1", "a", "2025-01-01"),
        ];

        let filtered = filter_articles_by_keywords(&articles, &keywords(&["ржд"]));

        let links: Vec<&str> = filtered.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(links, vec!["c", "a"]);
        assert!(
            std::ptr::eq(filtered[0], &articles[0]),
            "フィルタ結果は元の記事を参照するべき"
        );
    }

    #[test]
    fn test_filter_with_empty_keywords() {
        let articles = vec![Article::new("РЖД", "1", "1")];

        assert!(filter_articles_by_keywords(&articles, &[]).is_empty());
    }

    #[test]
    fn test_default_topics() {
        let topics = TopicSet::default();

        let names: Vec<&str> = topics.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["vish", "high_speed", "rzd"]);
        assert_eq!(topics.high_speed.query, "ВСМ");
        assert!(topics.rzd.keywords.contains(&"РЖД".to_string()));
    }
}

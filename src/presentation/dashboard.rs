use crate::domain::article::{Article, Sentiment};

const PAGE_TITLE: &str = "Новостная панель";

const STYLE: &str = r#"
        body {
            font-family: Arial, sans-serif;
            background-color: #f4f4f4;
            margin: 0;
            padding: 0;
        }
        .container {
            max-width: 1200px;
            margin: 20px auto;
            padding: 20px;
            background-color: #fff;
            border-radius: 8px;
            box-shadow: 0 2px 5px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            text-align: center;
            margin-bottom: 20px;
        }
        .generated {
            text-align: center;
            font-size: 0.85em;
            color: #888;
        }
        .filters {
            position: fixed;
            top: 15px;
            left: calc(50% - 600px);
            margin-top: 45px;
            padding: 10px;
            background-color: #f1f1f1;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            z-index: 1000;
            display: flex;
            gap: 10px;
        }
        .filters label {
            display: flex;
            align-items: center;
        }
        .filters input[type="checkbox"] {
            margin-right: 5px;
        }
        ul {
            list-style-type: none;
            padding: 0;
            margin-top: 60px;
        }
        li {
            margin: 10px 0;
            padding: 10px;
            border-radius: 4px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            background-color: #fafafa;
        }
        a {
            text-decoration: none;
            color: #1a0dab;
        }
        a:hover {
            text-decoration: underline;
        }
        .sentiment-positive { color: green; }
        .sentiment-negative { color: red; }
        .sentiment-neutral { color: gray; }
        .date {
            font-size: 0.9em;
            color: #888;
        }
        .subjectivity {
            font-size: 0.9em;
            color: #555;
        }
"#;

// 各項目はチェックされた感情のものだけ表示する
const SCRIPT: &str = r#"
        function filterNews() {
            const positiveChecked = document.getElementById('positive').checked;
            const negativeChecked = document.getElementById('negative').checked;
            const neutralChecked = document.getElementById('neutral').checked;

            const newsItems = document.querySelectorAll('#news-list li');
            newsItems.forEach(item => {
                const sentiment = item.getAttribute('data-sentiment');
                if ((sentiment === 'POSITIVE' && positiveChecked) ||
                    (sentiment === 'NEGATIVE' && negativeChecked) ||
                    (sentiment === 'NEUTRAL' && neutralChecked)) {
                    item.style.display = 'block';
                } else {
                    item.style.display = 'none';
                }
            });
        }

        filterNews();
"#;

fn sentiment_class(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment {
        Some(Sentiment::Positive) => "sentiment-positive",
        Some(Sentiment::Negative) => "sentiment-negative",
        Some(Sentiment::Neutral) | None => "sentiment-neutral",
    }
}

/// HTMLの本文・属性値として安全な文字列にする
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 記事1件分の`<li>`要素
fn render_item(article: &Article) -> String {
    // 未分析の記事は表示上NEUTRALとして扱う
    let sentiment = article.sentiment.unwrap_or(Sentiment::Neutral);
    let subjectivity = article.subjectivity.unwrap_or_default();

    format!(
        "<li class='{class}' data-sentiment='{sentiment}'><a href='{link}'>{title}</a> - <span class='date'>{published}</span> (Настроение: {sentiment}, Субъективность: <span class='subjectivity'>{subjectivity:.2}</span>)</li>",
        class = sentiment_class(article.sentiment),
        sentiment = sentiment,
        link = escape_html(&article.link),
        title = escape_html(&article.title),
        published = escape_html(&article.published),
        subjectivity = subjectivity,
    )
}

/// 記事リストを埋め込んだ単独で開けるHTMLダッシュボードを生成する
///
/// `generated_at`はヘッダーにそのまま表示される。
pub fn render_dashboard(articles: &[Article], generated_at: &str) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{style}    </style>
</head>
<body>
    <div class="filters">
        <label><input type="checkbox" id="positive" onclick="filterNews()" checked> Позитивные</label>
        <label><input type="checkbox" id="negative" onclick="filterNews()" checked> Негативные</label>
        <label><input type="checkbox" id="neutral" onclick="filterNews()" checked> Нейтральные</label>
    </div>

    <div class="container">
        <h1>{title}</h1>
        <p class="generated">{generated_at}</p>
        <ul id="news-list">
"#,
        title = PAGE_TITLE,
        style = STYLE,
        generated_at = escape_html(generated_at),
    );

    for article in articles {
        html.push_str("            ");
        html.push_str(&render_item(article));
        html.push('\n');
    }

    html.push_str(&format!(
        r#"        </ul>
    </div>

    <script>{script}    </script>
</body>
</html>
"#,
        script = SCRIPT,
    ));

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(title: &str, link: &str, sentiment: Sentiment, subjectivity: f64) -> Article {
        let mut article = Article::new(title, link, "2025-03-01T09:00:00Z");
        article.sentiment = Some(sentiment);
        article.subjectivity = Some(subjectivity);
        article
    }

    #[test]
    fn test_render_item_contents() {
        let html = render_dashboard(
            &[scored("РЖД объявила тендер", "https://gudok.ru/1", Sentiment::Positive, 0.876)],
            "2025-03-01 12:00",
        );

        assert!(html.contains("<li class='sentiment-positive' data-sentiment='POSITIVE'>"));
        assert!(html.contains("<a href='https://gudok.ru/1'>РЖД объявила тендер</a>"));
        assert!(html.contains("<span class='date'>2025-03-01T09:00:00Z</span>"));
        assert!(html.contains("<span class='subjectivity'>0.88</span>"), "主観度は小数2桁で表示");
        assert!(html.contains("2025-03-01 12:00"));
    }

    #[test]
    fn test_render_page_structure() {
        let html = render_dashboard(
            &[
                scored("Первая", "https://e.ru/1", Sentiment::Negative, 0.4),
                scored("Вторая", "https://e.ru/2", Sentiment::Neutral, 0.1),
            ],
            "2025-03-01 12:00",
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>\n"));

        let list_start = html.find("<ul id=\"news-list\">").unwrap();
        let list_end = html.find("</ul>").unwrap();
        let first = html.find("Первая").unwrap();
        let second = html.find("Вторая").unwrap();
        assert!(list_start < first && first < second && second < list_end, "記事は入力順にリスト内へ並ぶべき");
        assert!(html.find("<script>").unwrap() > list_end);
    }

    #[test]
    fn test_render_has_filters_and_script() {
        let html = render_dashboard(&[], "now");

        for id in ["positive", "negative", "neutral"] {
            assert!(html.contains(&format!("id=\"{}\"", id)), "チェックボックス{}がありません", id);
        }
        assert!(html.contains("function filterNews()"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<ul id=\"news-list\">"));
    }

    #[test]
    fn test_render_keeps_order_and_duplicates() {
        let a = scored("ВСМ", "a", Sentiment::Negative, 0.5);
        let b = scored("ВИШ", "b", Sentiment::Neutral, 0.1);

        let html = render_dashboard(&[b.clone(), a, b], "now");

        assert_eq!(html.matches("<li ").count(), 3);
        let first = html.find("ВИШ").unwrap();
        let second = html.find("ВСМ").unwrap();
        assert!(first < second, "入力順で出力されるべき");
        assert!(html.contains("class='sentiment-neutral' data-sentiment='NEUTRAL'"));
        assert!(html.contains("class='sentiment-negative' data-sentiment='NEGATIVE'"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let html = render_dashboard(
            &[scored("<script>alert('x')</script>", "https://e.ru/?a=1&b=2", Sentiment::Neutral, 0.1)],
            "now",
        );

        assert!(!html.contains("<script>alert"), "タイトルはエスケープされるべき");
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("https://e.ru/?a=1&amp;b=2"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Новости & <b>\"x\"</b>"), "Новости &amp; &lt;b&gt;&quot;x&quot;&lt;/b&gt;");
    }
}

use crate::{
    app::config::{OutputConfig, PipelineConfig},
    domain::{
        article::{dedup_by_link, sort_by_published_desc, Article},
        report::{assemble_result, ResultBundle, RunSummary},
        sentiment::{adjust_subjectivity, score_articles, SentimentClassifier},
        topic::TopicSet,
    },
    infra::{
        api::newsapi::ArticleSource,
        storage::file::{load_json_from_file, save_json_to_file, save_text_to_file, to_pretty_json},
    },
    presentation::render_dashboard,
};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// 1回の実行結果
#[derive(Debug, Clone)]
pub struct WorkflowOutput {
    pub bundle: ResultBundle,
    pub summary: RunSummary,
}

/// ニュースワークフローのメイン実行関数（依存性を注入）
///
/// 1. 3トピックの記事を取得して連結
/// 2. 重複排除 → 新しい順に並べ替え → 感情分析 → 主観度補正
/// 3. 3トピックのキーワードで絞り込み、結果一式を組み立て
/// 4. JSONとHTMLダッシュボードを書き出す
pub async fn execute_news_workflow<S: ArticleSource, C: SentimentClassifier>(
    source: &S,
    classifier: &C,
    config: &PipelineConfig,
) -> Result<WorkflowOutput> {
    info!("=== ニュースワークフロー開始 ===");

    let output = run_pipeline(source, classifier, &config.topics).await;
    persist_result(&output.bundle, &config.output, &current_timestamp())?;

    info!("実行結果: {}", output.summary);
    info!("=== ニュースワークフロー完了 ===");
    Ok(output)
}

/// 取得から結果の組み立てまでを行う（ファイル出力なし）
///
/// 個別クエリの取得失敗は0件として扱われ、分類に失敗した記事はスキップされるため、
/// この段階ではエラーにならない。
pub async fn run_pipeline<S: ArticleSource, C: SentimentClassifier>(
    source: &S,
    classifier: &C,
    topics: &TopicSet,
) -> WorkflowOutput {
    // 段階1: 各トピックの記事を順番に取得
    let all_articles = collect_articles(source, topics).await;
    let fetched = all_articles.len();

    // 段階2: 重複排除と並べ替え
    let unique_articles = dedup_by_link(all_articles);
    info!(fetched, unique = unique_articles.len(), "重複排除完了");
    let sorted_articles = sort_by_published_desc(&unique_articles);

    // 段階3: 感情分析と主観度補正
    info!("--- 感情分析開始 ---");
    let outcome = score_articles(classifier, sorted_articles).await;
    let analyzed_articles = adjust_subjectivity(outcome.analyzed);

    // 段階4: トピックごとの絞り込みと組み立て
    let bundle = assemble_result(unique_articles, analyzed_articles, topics);
    let summary = RunSummary::from_bundle(&bundle, fetched, outcome.skipped);

    WorkflowOutput { bundle, summary }
}

/// 3トピックの記事を取得して連結する
async fn collect_articles<S: ArticleSource>(source: &S, topics: &TopicSet) -> Vec<Article> {
    info!("--- 記事取得開始 ---");
    let mut all_articles = Vec::new();

    for (name, topic) in topics.iter() {
        let articles = source.fetch_articles(&topic.query).await;
        info!(topic = name, query = %topic.query, count = articles.len(), "トピックの記事を取得");
        all_articles.extend(articles);
    }

    info!("--- 記事取得完了: {}件 ---", all_articles.len());
    all_articles
}

/// 結果一式をJSONに、最終記事リストをHTMLダッシュボードに書き出す
pub fn persist_result(bundle: &ResultBundle, output: &OutputConfig, generated_at: &str) -> Result<()> {
    save_json_to_file(bundle, &output.json_path)
        .with_context(|| format!("JSONの保存に失敗: {}", output.json_path))?;
    info!(path = %output.json_path, "JSONを保存しました");
    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(json) = to_pretty_json(bundle) {
            debug!("{}", json);
        }
    }

    let dashboard = render_dashboard(&bundle.final_articles, generated_at);
    save_text_to_file(&dashboard, &output.html_path)
        .with_context(|| format!("ダッシュボードの保存に失敗: {}", output.html_path))?;
    info!(path = %output.html_path, "ダッシュボードを保存しました");

    Ok(())
}

/// 以前に書き出したJSONから結果一式を読み込む
pub fn load_result_bundle(file_path: &str) -> Result<ResultBundle> {
    load_json_from_file(file_path).with_context(|| format!("結果JSONの読み込みに失敗: {}", file_path))
}

fn current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

use anyhow::{Context, Result};
use news_dashboard::{
    app::{config::log_level_from_env, execute_news_workflow, AppConfig},
    infra::{
        api::{
            classifier::HuggingFaceClassifier,
            http::ReqwestHttpClient,
            newsapi::NewsApiSource,
        },
        logging::init_logging,
    },
};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();
    init_logging(&log_level_from_env());

    if let Err(e) = run().await {
        error!(error = %format!("{:#}", e), "ニュースワークフローが失敗しました");
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::from_env().context("設定の読み込みに失敗")?;
    let pipeline = &config.pipeline;

    let source = NewsApiSource::new(
        ReqwestHttpClient::new(pipeline.retry.clone())?,
        config.newsapi_api_key.clone(),
    )
    .with_base_url(pipeline.newsapi_base_url());

    let classifier = HuggingFaceClassifier::new(
        ReqwestHttpClient::new(pipeline.retry.clone())?,
        pipeline.classifier.clone(),
        config.hf_api_token.clone(),
    );

    execute_news_workflow(&source, &classifier, pipeline).await?;
    Ok(())
}

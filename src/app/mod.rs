pub mod config;
pub mod workflow;

pub use config::{AppConfig, PipelineConfig};
pub use workflow::{execute_news_workflow, load_result_bundle, run_pipeline, WorkflowOutput};

pub mod classifier;
pub mod http;
pub mod newsapi;

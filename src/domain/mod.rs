pub mod article;
pub mod report;
pub mod sentiment;
pub mod topic;

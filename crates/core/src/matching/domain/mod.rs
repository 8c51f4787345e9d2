pub mod decision;
pub mod scoring_policy;
pub mod similarity_report;

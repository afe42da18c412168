pub mod analytics_service;
pub mod bank_service;
pub mod media;
pub mod review_service;
pub mod scoring_service;

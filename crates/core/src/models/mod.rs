pub mod analytics;
pub mod chart;
pub mod chat;
pub mod holding;
pub mod settings;
pub mod upload;

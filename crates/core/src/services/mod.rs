// Pipeline stages
pub mod analytics_service;
pub mod import_service;

// Collaborator boundaries
pub mod chart_service;
pub mod chat_service;
pub mod upload_service;

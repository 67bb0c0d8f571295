pub mod traits;

// Collaborator implementations
pub mod groq;
pub mod svg_chart;

//! LLM service adapters
//!
//! Implementations of the AnalysisGatewayPort trait:
//! - Google (Gemini)

pub mod google;

pub use google::GoogleService;

//! Meeting Insight
//!
//! Keeps a collection of meeting records, corrects their transcripts through
//! a generative model and runs five insight modules over the result, each
//! with its own follow-up conversation.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod ports;
pub mod state;
pub mod utils;

pub use config::AppConfig;
pub use controller::{InsightController, RequestOutcome};
pub use error::{AppError, Result};
pub use state::AppState;

/// Command handlers behind the CLI subcommands
pub mod config;
pub mod llm;
pub mod meeting;

/// Domain layer - core business models
///
/// These models are platform-agnostic and represent core business entities.
pub mod markdown;
pub mod models;
pub mod modules;
pub mod prompts;
pub mod stage;

pub use models::{ChatMessage, ChatRole, MeetingMetadata, MeetingRecord, MetadataField};
pub use modules::{InsightModule, ModuleDescriptor};
pub use prompts::PromptTemplates;
pub use stage::Stage;

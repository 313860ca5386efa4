/// Port trait definitions (interfaces)
///
/// These traits define the contracts for adapters to implement.
/// Following the ports-and-adapters (hexagonal) architecture pattern.
pub mod dialog;
pub mod llm;
pub mod storage;

#[cfg(test)]
pub mod mocks;

pub use dialog::{ConfirmPort, NotifierPort};
pub use llm::{AnalysisGatewayPort, LlmConfig};
pub use storage::BlobStorePort;

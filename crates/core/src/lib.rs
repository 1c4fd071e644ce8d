pub mod chat;
pub mod config;
pub mod employee;
pub mod error;
pub mod simulation;
pub mod summary;
pub mod upload;

pub use chat::{ChatMessage, ChatRole};
pub use config::Config;
pub use employee::*;
pub use error::*;
pub use simulation::{ChangeSet, SimulationOutcome, SimulationResult};
pub use summary::{FactorCount, RiskBreakdown, Summary};
pub use upload::{accept_drop, UploadFile, UploadReceipt};

pub mod chat;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod hypothesis;
pub mod memo;
pub mod recommendation;
pub mod storage;
pub mod store;
pub mod summary;
pub mod template;
pub mod verdict;

pub use dashboard::Dashboard;
pub use error::{MemoBoardError, Result};
pub use hypothesis::{Category, Hypothesis, HypothesisKind, HypothesisPatch, Outcome, Status};
pub use verdict::{Verdict, VerdictReport, evaluate};


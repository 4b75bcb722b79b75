//! Remote query engine abstraction.
//!
//! The executor only ever talks to these traits; the AWS-backed
//! implementations live in [`athena`] and [`s3`], and tests substitute
//! in-memory fakes.

use async_trait::async_trait;

pub mod athena;
pub mod day_window;
pub mod executor;
pub mod s3;

/// Key prefix under which the engine materializes per-execution scratch
/// objects. Must match the output location submissions point at.
pub const SCRATCH_PREFIX: &str = "temp/";

/// Lifecycle state of one submitted execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Parse the engine's state string. Unknown states return `None`.
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Polling stops once a terminal state is reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// One status poll's answer: the state plus the engine's raw failure
/// payload, when it reports one.
#[derive(Debug, Clone)]
pub struct ExecutionStatus {
    pub state: ExecutionState,
    pub reason: Option<String>,
}

/// Submit/poll/fetch surface of the managed query service.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a query; returns the engine-assigned opaque execution id.
    async fn submit(&self, query: &str) -> anyhow::Result<String>;

    /// Current status of an execution.
    async fn status(&self, execution_id: &str) -> anyhow::Result<ExecutionStatus>;

    /// Full result set of a succeeded execution. Row 0 is the header row
    /// (column names), all later rows are data.
    async fn results(&self, execution_id: &str) -> anyhow::Result<Vec<Vec<String>>>;
}

/// Store holding the engine's temporary result artifacts.
#[async_trait]
pub trait ScratchStore: Send + Sync {
    /// Remove one object. Deleting a key that does not exist is a no-op.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

use thiserror::Error;

/// Errors that interrupt a single query execution.
///
/// Terminal `FAILED`/`CANCELLED` states are not errors; they surface as
/// [`crate::engine::executor::QueryOutcome::Failed`] and the run carries on.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The engine rejected the query at submission, or was unreachable.
    /// Fatal for the whole run.
    #[error("query submission failed: {0}")]
    Submit(#[source] anyhow::Error),

    /// The execution never reached a terminal state within the poll budget.
    /// Distinct from a zero-row result so an engine outage cannot masquerade
    /// as an empty partition.
    #[error("execution {execution_id} not terminal after {attempts} polls")]
    PollBudget { execution_id: String, attempts: u32 },

    /// A data row did not line up with the header row.
    #[error("result row {row} has {found} cells, header has {expected} columns")]
    ColumnMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },

    /// Transport failure while polling status, fetching results or deleting
    /// scratch objects.
    #[error("engine call failed: {0}")]
    Engine(#[source] anyhow::Error),

    /// The record sink could not be written.
    #[error("failed to write record: {0}")]
    Output(#[from] std::io::Error),
}

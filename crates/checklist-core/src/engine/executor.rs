//! Submit/poll/fetch lifecycle for a single query.

use std::time::Duration;

use tracing::{debug, error, info, trace};

use super::{ExecutionState, ExecutionStatus, QueryEngine, ScratchStore, SCRATCH_PREFIX};
use crate::errors::ExecuteError;
use crate::model::CheckRecord;
use crate::report::RecordSink;

/// Fixed-interval polling with an attempt cap.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 100,
        }
    }
}

/// How one execution ended.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// Reached SUCCEEDED; `rows` records were emitted.
    Completed { rows: usize },
    /// Reached a terminal non-success state. Already logged; the caller
    /// moves on to the next check.
    Failed {
        state: ExecutionState,
        reason: Option<String>,
    },
}

impl QueryOutcome {
    /// Emitted row count; a failed execution counts as zero rows.
    pub fn rows(&self) -> usize {
        match self {
            Self::Completed { rows } => *rows,
            Self::Failed { .. } => 0,
        }
    }
}

pub struct QueryExecutor<'a> {
    engine: &'a dyn QueryEngine,
    scratch: &'a dyn ScratchStore,
    poll: PollPolicy,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(engine: &'a dyn QueryEngine, scratch: &'a dyn ScratchStore, poll: PollPolicy) -> Self {
        Self {
            engine,
            scratch,
            poll,
        }
    }

    /// Run one query to completion and emit its records on `sink`.
    ///
    /// Submission rejection is fatal ([`ExecuteError::Submit`]); a terminal
    /// non-success state is not ([`QueryOutcome::Failed`]). Exhausting the
    /// poll budget raises [`ExecuteError::PollBudget`] rather than passing
    /// as an empty result.
    pub async fn execute(
        &self,
        query: &str,
        sink: &mut dyn RecordSink,
    ) -> Result<QueryOutcome, ExecuteError> {
        info!(query, "submitting query");
        let execution_id = self
            .engine
            .submit(query)
            .await
            .map_err(ExecuteError::Submit)?;
        debug!(execution_id, "execution started");

        let status = self.poll_until_terminal(&execution_id).await?;
        match status.state {
            ExecutionState::Succeeded => {
                let rows = self
                    .engine
                    .results(&execution_id)
                    .await
                    .map_err(ExecuteError::Engine)?;
                let emitted = emit_rows(&rows, sink)?;
                self.discard(&execution_id).await?;
                info!(rows = emitted, "rows returned");
                Ok(QueryOutcome::Completed { rows: emitted })
            }
            state => {
                error!(
                    execution_id,
                    ?state,
                    reason = status.reason.as_deref().unwrap_or("none given"),
                    "query execution did not succeed"
                );
                Ok(QueryOutcome::Failed {
                    state,
                    reason: status.reason,
                })
            }
        }
    }

    async fn poll_until_terminal(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionStatus, ExecuteError> {
        for attempt in 0..self.poll.max_attempts {
            let status = self
                .engine
                .status(execution_id)
                .await
                .map_err(ExecuteError::Engine)?;
            if status.state.is_terminal() {
                return Ok(status);
            }
            trace!(execution_id, attempt, state = ?status.state, "not terminal yet");
            tokio::time::sleep(self.poll.interval).await;
        }
        Err(ExecuteError::PollBudget {
            execution_id: execution_id.to_owned(),
            attempts: self.poll.max_attempts,
        })
    }

    /// Drop the execution's two scratch artifacts, rows or not.
    async fn discard(&self, execution_id: &str) -> Result<(), ExecuteError> {
        for suffix in [".csv", ".csv.metadata"] {
            let key = format!("{SCRATCH_PREFIX}{execution_id}{suffix}");
            self.scratch
                .delete(&key)
                .await
                .map_err(ExecuteError::Engine)?;
        }
        Ok(())
    }
}

/// Row 0 is the header; every later row zips into one record.
fn emit_rows(rows: &[Vec<String>], sink: &mut dyn RecordSink) -> Result<usize, ExecuteError> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(0);
    };
    let mut emitted = 0;
    for (index, cells) in data.iter().enumerate() {
        let record = CheckRecord::from_row(header, cells, index + 1)?;
        sink.emit(&record)?;
        emitted += 1;
    }
    Ok(emitted)
}

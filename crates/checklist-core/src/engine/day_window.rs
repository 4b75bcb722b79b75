//! Bounded lookback over calendar days.
//!
//! Day-partitioned source tables can lag: a query against today's partition
//! may legitimately return nothing while yesterday's is already populated.
//! This driver walks backwards from the reference day until a day yields
//! rows, instead of failing outright on an unpopulated partition.

use chrono::{Days, NaiveDate};
use tracing::debug;

use super::executor::{QueryExecutor, QueryOutcome};
use crate::errors::ExecuteError;
use crate::queries::CheckQuery;
use crate::report::RecordSink;

/// Days tried per check: the reference day plus five before it.
pub const DAY_LOOKBACK: u32 = 6;

/// Which day (if any) produced rows, and how many.
#[derive(Debug, Clone, Copy)]
pub struct DayOutcome {
    pub day: Option<NaiveDate>,
    pub rows: usize,
}

/// Run `check` against `start_day`, stepping back one day per zero-row
/// attempt, at most [`DAY_LOOKBACK`] attempts total.
///
/// A terminal failure counts as a zero-row day and the window keeps
/// walking; poll-budget exhaustion and transport errors propagate, since
/// retrying an earlier day cannot fix an engine outage.
pub async fn execute_for_latest_day(
    executor: &QueryExecutor<'_>,
    check: &CheckQuery,
    start_day: NaiveDate,
    sink: &mut dyn RecordSink,
) -> Result<DayOutcome, ExecuteError> {
    let mut day = start_day;
    for _ in 0..DAY_LOOKBACK {
        let outcome = executor.execute(&check.bind_day(day), sink).await?;
        if let QueryOutcome::Completed { rows } = outcome {
            if rows > 0 {
                return Ok(DayOutcome {
                    day: Some(day),
                    rows,
                });
            }
        }
        debug!(%day, section = check.section, item = check.item, "no rows, stepping back a day");
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    Ok(DayOutcome { day: None, rows: 0 })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::engine::executor::PollPolicy;
    use crate::engine::{ExecutionState, ExecutionStatus, QueryEngine, ScratchStore};
    use crate::model::CheckRecord;
    use crate::queries::checklist;

    /// Serves one scripted result set per submitted query, in order.
    struct PerDayEngine {
        result_sets: Mutex<VecDeque<Vec<Vec<String>>>>,
        submitted: Mutex<Vec<String>>,
    }

    impl PerDayEngine {
        fn new(per_day_counts: &[usize]) -> Self {
            let result_sets = per_day_counts
                .iter()
                .map(|&count| {
                    let mut rows = vec![vec!["section".to_string(), "pass".to_string()]];
                    for _ in 0..count {
                        rows.push(vec!["Web Applications".to_string(), "true".to_string()]);
                    }
                    rows
                })
                .collect();
            Self {
                result_sets: Mutex::new(result_sets),
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryEngine for PerDayEngine {
        async fn submit(&self, query: &str) -> anyhow::Result<String> {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(query.to_string());
            Ok(format!("exec-{}", submitted.len()))
        }

        async fn status(&self, _execution_id: &str) -> anyhow::Result<ExecutionStatus> {
            Ok(ExecutionStatus {
                state: ExecutionState::Succeeded,
                reason: None,
            })
        }

        async fn results(&self, _execution_id: &str) -> anyhow::Result<Vec<Vec<String>>> {
            Ok(self
                .result_sets
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| vec![vec!["section".to_string(), "pass".to_string()]]))
        }
    }

    #[derive(Default)]
    struct NullScratch;

    #[async_trait]
    impl ScratchStore for NullScratch {
        async fn delete(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct VecSink(Vec<CheckRecord>);

    impl RecordSink for VecSink {
        fn emit(&mut self, record: &CheckRecord) -> std::io::Result<()> {
            self.0.push(record.clone());
            Ok(())
        }
    }

    fn sts_check() -> CheckQuery {
        checklist()
            .into_iter()
            .find(|c| c.item == "Set STS")
            .unwrap()
    }

    fn fast_poll() -> PollPolicy {
        PollPolicy {
            interval: Duration::ZERO,
            max_attempts: 100,
        }
    }

    #[tokio::test]
    async fn stops_on_first_populated_day() {
        let engine = PerDayEngine::new(&[0, 0, 3]);
        let scratch = NullScratch;
        let executor = QueryExecutor::new(&engine, &scratch, fast_poll());
        let mut sink = VecSink::default();
        let start = NaiveDate::from_ymd_opt(2018, 10, 31).unwrap();

        let outcome = execute_for_latest_day(&executor, &sts_check(), start, &mut sink)
            .await
            .unwrap();

        assert_eq!(outcome.day, NaiveDate::from_ymd_opt(2018, 10, 29));
        assert_eq!(outcome.rows, 3);
        assert_eq!(sink.0.len(), 3);

        let submitted = engine.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 3);
        assert!(submitted[0].contains("'2018-10-31'"));
        assert!(submitted[1].contains("'2018-10-30'"));
        assert!(submitted[2].contains("'2018-10-29'"));
    }

    #[tokio::test]
    async fn gives_up_after_six_empty_days() {
        let engine = PerDayEngine::new(&[0, 0, 0, 0, 0, 0, 5]);
        let scratch = NullScratch;
        let executor = QueryExecutor::new(&engine, &scratch, fast_poll());
        let mut sink = VecSink::default();
        let start = NaiveDate::from_ymd_opt(2018, 10, 31).unwrap();

        let outcome = execute_for_latest_day(&executor, &sts_check(), start, &mut sink)
            .await
            .unwrap();

        assert_eq!(outcome.day, None);
        assert_eq!(outcome.rows, 0);
        assert!(sink.0.is_empty());
        // The seventh day's rows are never asked for.
        assert_eq!(engine.submitted.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn first_day_with_rows_needs_one_query() {
        let engine = PerDayEngine::new(&[2]);
        let scratch = NullScratch;
        let executor = QueryExecutor::new(&engine, &scratch, fast_poll());
        let mut sink = VecSink::default();
        let start = NaiveDate::from_ymd_opt(2018, 10, 31).unwrap();

        let outcome = execute_for_latest_day(&executor, &sts_check(), start, &mut sink)
            .await
            .unwrap();

        assert_eq!(outcome.day, Some(start));
        assert_eq!(outcome.rows, 2);
        assert_eq!(engine.submitted.lock().unwrap().len(), 1);
    }
}

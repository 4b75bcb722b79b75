//! Athena-backed [`QueryEngine`].

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_sdk_athena::types::ResultConfiguration;

use super::{ExecutionState, ExecutionStatus, QueryEngine};

pub struct AthenaEngine {
    client: aws_sdk_athena::Client,
    /// `s3://bucket/prefix/` location executions write their results under.
    output_location: String,
}

impl AthenaEngine {
    pub fn new(client: aws_sdk_athena::Client, output_location: String) -> Self {
        Self {
            client,
            output_location,
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn submit(&self, query: &str) -> Result<String> {
        let resp = self
            .client
            .start_query_execution()
            .query_string(query)
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&self.output_location)
                    .build(),
            )
            .send()
            .await
            .context("StartQueryExecution")?;

        resp.query_execution_id()
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("engine returned no execution id"))
    }

    async fn status(&self, execution_id: &str) -> Result<ExecutionStatus> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .with_context(|| format!("GetQueryExecution for {execution_id}"))?;

        let status = resp
            .query_execution()
            .and_then(|execution| execution.status())
            .ok_or_else(|| anyhow!("execution {execution_id} has no status"))?;
        let raw = status
            .state()
            .ok_or_else(|| anyhow!("execution {execution_id} has no state"))?
            .as_str();
        let state = ExecutionState::parse(raw)
            .ok_or_else(|| anyhow!("execution {execution_id} in unrecognized state {raw:?}"))?;

        let reason = status
            .state_change_reason()
            .map(str::to_owned)
            .or_else(|| {
                status
                    .athena_error()
                    .and_then(|err| err.error_message())
                    .map(str::to_owned)
            });

        Ok(ExecutionStatus { state, reason })
    }

    async fn results(&self, execution_id: &str) -> Result<Vec<Vec<String>>> {
        let mut rows = Vec::new();
        let mut next_token: Option<String> = None;

        // The header row only appears on the first page.
        loop {
            let mut request = self
                .client
                .get_query_results()
                .query_execution_id(execution_id);
            if let Some(token) = next_token.take() {
                request = request.next_token(token);
            }
            let resp = request
                .send()
                .await
                .with_context(|| format!("GetQueryResults for {execution_id}"))?;

            if let Some(result_set) = resp.result_set() {
                for row in result_set.rows() {
                    rows.push(
                        row.data()
                            .iter()
                            .map(|cell| cell.var_char_value().unwrap_or_default().to_owned())
                            .collect(),
                    );
                }
            }

            next_token = resp.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }

        Ok(rows)
    }
}

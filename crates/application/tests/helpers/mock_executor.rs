#![allow(dead_code)]

use async_trait::async_trait;
use looking_glass_application::ports::QueryExecutor;
use looking_glass_domain::{DomainError, QueryDescriptor, QueryError, QueryResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers every query with its own request bytes, or with a scripted error.
#[derive(Clone, Default)]
pub struct MockQueryExecutor {
    calls: Arc<AtomicUsize>,
    errors: Arc<Mutex<Vec<(usize, QueryError)>>>,
    batch_failure: Arc<Mutex<Option<DomainError>>>,
    drop_last: Arc<Mutex<bool>>,
}

impl MockQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_query(&self, index: usize, error: QueryError) {
        self.errors.lock().unwrap().push((index, error));
    }

    pub fn fail_batch(&self, error: DomainError) {
        *self.batch_failure.lock().unwrap() = Some(error);
    }

    pub fn drop_last_result(&self) {
        *self.drop_last.lock().unwrap() = true;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, queries: Vec<QueryDescriptor>) -> Result<Vec<QueryResult>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.batch_failure.lock().unwrap().clone() {
            return Err(err);
        }

        let errors = self.errors.lock().unwrap().clone();
        let mut results: Vec<QueryResult> = queries
            .iter()
            .enumerate()
            .map(|(i, query)| {
                let outcome = match errors.iter().find(|(idx, _)| *idx == i) {
                    Some((_, err)) => Err(*err),
                    None => Ok(query.request.to_vec()),
                };
                QueryResult {
                    outcome,
                    source: query.source,
                    source_port: None,
                    elapsed: Duration::from_millis(1),
                }
            })
            .collect();

        if *self.drop_last.lock().unwrap() {
            results.pop();
        }

        Ok(results)
    }
}

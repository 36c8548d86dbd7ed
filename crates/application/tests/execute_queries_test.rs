use looking_glass_application::use_cases::ExecuteQueriesUseCase;
use looking_glass_domain::{DomainError, Errno, QueryDescriptor, QueryError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::MockQueryExecutor;

fn query(payload: &[u8]) -> QueryDescriptor {
    let dst: SocketAddr = "192.0.2.1:53".parse().unwrap();
    QueryDescriptor::udp(payload.to_vec(), dst, Duration::from_millis(500))
}

#[tokio::test]
async fn test_empty_batch_skips_executor() {
    // Arrange
    let executor = MockQueryExecutor::new();
    let use_case = ExecuteQueriesUseCase::new(Arc::new(executor.clone()));

    // Act
    let results = use_case.execute(vec![]).await.unwrap();

    // Assert
    assert!(results.is_empty());
    assert_eq!(executor.calls(), 0);
}

#[tokio::test]
async fn test_results_preserve_input_order() {
    let executor = MockQueryExecutor::new();
    let use_case = ExecuteQueriesUseCase::new(Arc::new(executor.clone()));

    let results = use_case
        .execute(vec![query(b"first"), query(b"second"), query(b"third")])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].response(), Some(&b"first"[..]));
    assert_eq!(results[1].response(), Some(&b"second"[..]));
    assert_eq!(results[2].response(), Some(&b"third"[..]));
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn test_per_query_errors_do_not_fail_batch() {
    let executor = MockQueryExecutor::new();
    executor.fail_query(1, QueryError::Network(Errno::ECONNREFUSED));
    let use_case = ExecuteQueriesUseCase::new(Arc::new(executor));

    let results = use_case
        .execute(vec![query(b"a"), query(b"b"), query(b"c")])
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert_eq!(
        results[1].error(),
        Some(QueryError::Network(Errno::ECONNREFUSED))
    );
    assert!(results[2].is_success());
}

#[tokio::test]
async fn test_batch_failure_propagates() {
    let executor = MockQueryExecutor::new();
    executor.fail_batch(DomainError::TransportFailure("boom".into()));
    let use_case = ExecuteQueriesUseCase::new(Arc::new(executor));

    let result = use_case.execute(vec![query(b"a")]).await;

    assert!(matches!(result, Err(DomainError::TransportFailure(_))));
}

#[tokio::test]
async fn test_missing_result_is_rejected() {
    let executor = MockQueryExecutor::new();
    executor.drop_last_result();
    let use_case = ExecuteQueriesUseCase::new(Arc::new(executor));

    let result = use_case.execute(vec![query(b"a"), query(b"b")]).await;

    assert!(matches!(
        result,
        Err(DomainError::ResultCountMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

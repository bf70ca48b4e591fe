use mockito::Matcher;
use rdf_federation::adapters::embedded::EmbeddedAdapter;
use rdf_federation::adapters::{Adapter, AdapterError, ConnectionParams};
use rdf_federation::model::{Literal, NamedNode, StatementPattern, TermPattern, Triple, Variable};
use rdf_federation::query::Query;
use rdf_federation::{
    ConnectionPool, FederationConfig, FederationError, FederationManager, QueryOptions,
    QueryResult,
};
use std::sync::Arc;
use std::time::Duration;

fn ex(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn var(name: &str) -> Option<TermPattern> {
    Some(Variable::new_unchecked(name).into())
}

fn in_memory(pool: &ConnectionPool) -> Arc<dyn Adapter> {
    let adapter: Arc<dyn Adapter> = Arc::new(EmbeddedAdapter::new());
    pool.add_adapter(ConnectionParams::new("embedded").fresh(), Arc::clone(&adapter));
    adapter
}

fn age_query() -> Query {
    let mut query = Query::new();
    query
        .distinct(["o"])
        .unwrap()
        .where_pattern(Some(ex("eyal").into()), Some(ex("age").into()), var("o"))
        .unwrap();
    query
}

#[tokio::test]
async fn test_distinct_union_flattens_to_a_single_value() {
    let pool = Arc::new(ConnectionPool::default());
    let first = in_memory(&pool);
    let second = in_memory(&pool);
    let triple = Triple::new(ex("eyal"), ex("age"), Literal::from(30));
    first.add(&triple, None).await.unwrap();
    second.add(&triple, None).await.unwrap();

    let manager = FederationManager::new(pool);
    let result = manager.query(&age_query(), QueryOptions::default()).await.unwrap();
    assert_eq!(result, QueryResult::Value(Literal::from(30).into()));
}

#[tokio::test]
async fn test_query_without_sources_fails() {
    let manager = FederationManager::new(Arc::new(ConnectionPool::default()));
    let err = manager
        .query(&age_query(), QueryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::NoDataSource));
}

#[tokio::test]
async fn test_disabled_sources_are_not_queried() {
    let pool = Arc::new(ConnectionPool::default());
    let adapter = in_memory(&pool);
    assert!(pool.set_enabled(&adapter, false));
    assert!(!pool.is_enabled(&adapter));

    let manager = FederationManager::new(Arc::clone(&pool));
    assert!(matches!(
        manager.query(&age_query(), QueryOptions::default()).await,
        Err(FederationError::NoDataSource)
    ));
}

#[tokio::test]
async fn test_ask_and_count() {
    let pool = Arc::new(ConnectionPool::default());
    in_memory(&pool);
    let manager = FederationManager::new(Arc::clone(&pool));

    let mut ask = Query::new();
    ask.ask()
        .where_pattern(var("s"), Some(ex("knows").into()), None)
        .unwrap();
    assert_eq!(
        manager.query(&ask, QueryOptions::default()).await.unwrap(),
        QueryResult::Boolean(false)
    );

    for i in 0..5 {
        manager
            .add(&Triple::new(ex(&format!("s{i}")), ex("knows"), ex("o")), None)
            .await
            .unwrap();
    }
    assert_eq!(
        manager.query(&ask, QueryOptions::default()).await.unwrap(),
        QueryResult::Boolean(true)
    );

    let mut count = Query::new();
    count
        .count(["s"])
        .unwrap()
        .where_pattern(var("s"), Some(ex("knows").into()), Some(ex("o").into()))
        .unwrap();
    assert_eq!(
        manager.query(&count, QueryOptions::collections()).await.unwrap(),
        QueryResult::Count(5)
    );
}

#[tokio::test]
async fn test_multi_variable_rows_and_streaming() {
    let pool = Arc::new(ConnectionPool::default());
    in_memory(&pool);
    let manager = FederationManager::new(Arc::clone(&pool));
    manager
        .add(&Triple::new(ex("a"), ex("knows"), ex("b")), None)
        .await
        .unwrap();
    manager
        .add(&Triple::new(ex("b"), ex("knows"), ex("c")), None)
        .await
        .unwrap();

    let mut query = Query::new();
    query
        .select(["s", "o"])
        .unwrap()
        .where_pattern(var("s"), Some(ex("knows").into()), var("o"))
        .unwrap()
        .sort(["s"])
        .unwrap();

    let result = manager.query(&query, QueryOptions::default()).await.unwrap();
    assert_eq!(
        result,
        QueryResult::Rows(vec![
            vec![Some(ex("a").into()), Some(ex("b").into())],
            vec![Some(ex("b").into()), Some(ex("c").into())],
        ])
    );

    let mut seen = Vec::new();
    let delivered = manager
        .for_each_row(&query, |row| seen.push(row))
        .await
        .unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn test_sort_and_limit_span_every_source() {
    let pool = Arc::new(ConnectionPool::default());
    let first = in_memory(&pool);
    let second = in_memory(&pool);
    first
        .add(&Triple::new(ex("armin"), ex("age"), Literal::from(40)), None)
        .await
        .unwrap();
    second
        .add(&Triple::new(ex("eyal"), ex("age"), Literal::from(20)), None)
        .await
        .unwrap();

    let mut query = Query::new();
    query
        .select(["o"])
        .unwrap()
        .where_pattern(None, Some(ex("age").into()), var("o"))
        .unwrap()
        .sort(["o"])
        .unwrap()
        .limit(1);

    let manager = FederationManager::new(pool);
    let result = manager.query(&query, QueryOptions::default()).await.unwrap();
    assert_eq!(result, QueryResult::Value(Literal::from(20).into()));
}

#[tokio::test]
async fn test_failing_source_is_isolated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("unavailable")
        .create_async()
        .await;

    let pool = Arc::new(ConnectionPool::default());
    let local = in_memory(&pool);
    local
        .add(&Triple::new(ex("eyal"), ex("age"), Literal::from(30)), None)
        .await
        .unwrap();
    pool.add_data_source(&ConnectionParams::new("sparql").with_option("host", server.url()))
        .unwrap();

    let manager = FederationManager::new(Arc::clone(&pool));
    let result = manager.query(&age_query(), QueryOptions::default()).await.unwrap();
    assert_eq!(result, QueryResult::Value(Literal::from(30).into()));
}

#[tokio::test]
async fn test_sole_failing_source_propagates_its_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let pool = Arc::new(ConnectionPool::default());
    pool.add_data_source(&ConnectionParams::new("sparql").with_option("host", server.url()))
        .unwrap();
    let manager = FederationManager::new(pool);
    let err = manager
        .query(&age_query(), QueryOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_unreachable());
    assert!(matches!(
        err,
        FederationError::Adapter(AdapterError::Backend { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_all_failing_sources_are_aggregated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(500)
        .expect_at_least(2)
        .create_async()
        .await;

    let pool = Arc::new(ConnectionPool::default());
    for path in ["a", "b"] {
        pool.add_data_source(
            &ConnectionParams::new("sparql")
                .with_option("host", server.url())
                .with_option("path", path),
        )
        .unwrap();
    }
    let manager = FederationManager::with_config(
        pool,
        FederationConfig::default().with_concurrent_dispatch(false),
    );
    let err = manager
        .query(&age_query(), QueryOptions::default())
        .await
        .unwrap_err();
    let FederationError::AllSourcesFailed(errors) = err else {
        panic!("expected an aggregated error, got {err}");
    };
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn test_slow_sources_time_out() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sparql")
        .match_query(Matcher::Any)
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_millis(500));
            writer.write_all(b"{}")
        })
        .create_async()
        .await;

    let pool = Arc::new(ConnectionPool::default());
    pool.add_data_source(&ConnectionParams::new("sparql").with_option("host", server.url()))
        .unwrap();
    let manager = FederationManager::with_config(
        pool,
        FederationConfig::default().with_source_timeout(Duration::from_millis(50)),
    );
    let err = manager
        .query(&age_query(), QueryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FederationError::Adapter(AdapterError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_writes_go_to_the_write_adapter_only() {
    let pool = Arc::new(ConnectionPool::default());
    let first = in_memory(&pool);
    let second = in_memory(&pool);
    let manager = FederationManager::new(Arc::clone(&pool));

    let triple = Triple::new(ex("a"), ex("p"), ex("b"));
    assert!(manager.add(&triple, Some(&ex("g"))).await.unwrap());

    let everything = StatementPattern::any();
    assert_eq!(first.remove(&everything).await.unwrap(), Some(0));
    assert_eq!(second.remove(&everything).await.unwrap(), Some(1));

    manager.add(&triple, None).await.unwrap();
    manager
        .add(&Triple::new(ex("c"), ex("p"), ex("a")), None)
        .await
        .unwrap();
    assert_eq!(manager.delete_all(&ex("a")).await.unwrap(), Some(2));
    assert_eq!(manager.clear(None).await.unwrap(), Some(0));
    manager.flush().await.unwrap();
}

#[tokio::test]
async fn test_writes_without_writer_fail() {
    let manager = FederationManager::new(Arc::new(ConnectionPool::default()));
    let triple = Triple::new(ex("a"), ex("p"), ex("b"));
    assert!(matches!(
        manager.add(&triple, None).await,
        Err(FederationError::NoWriteAdapter)
    ));
    assert!(matches!(
        manager.flush().await,
        Err(FederationError::NoWriteAdapter)
    ));
}

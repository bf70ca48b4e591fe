use rdf_federation::adapters::embedded::EmbeddedAdapter;
use rdf_federation::adapters::{Adapter, ConnectionParams};
use rdf_federation::{AdapterRegistry, ConnectionPool, FederationError};
use std::sync::Arc;

fn sparql(host: &str) -> ConnectionParams {
    ConnectionParams::new("sparql").with_option("host", host)
}

#[test]
fn test_equal_params_return_the_same_adapter() {
    let pool = ConnectionPool::default();
    let first = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let second = pool.add_data_source(&ConnectionParams::new("Embedded")).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(pool.len(), 1);

    let other = pool.add_data_source(&sparql("dbpedia.org")).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_fresh_params_bypass_the_cache() {
    let pool = ConnectionPool::default();
    let cached = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let fresh = pool
        .add_data_source(&ConnectionParams::new("embedded").fresh())
        .unwrap();
    assert!(!Arc::ptr_eq(&cached, &fresh));
    let write_adapter = pool.write_adapter().unwrap();
    assert!(Arc::ptr_eq(&write_adapter, &fresh));
}

#[test]
fn test_unknown_types_fail() {
    let pool = ConnectionPool::new(AdapterRegistry::new());
    assert!(matches!(
        pool.add_data_source(&ConnectionParams::new("embedded")),
        Err(FederationError::UnknownAdapterType(_))
    ));
    assert!(pool.is_empty());
}

#[test]
fn test_write_adapter_follows_additions_and_removals() {
    let pool = ConnectionPool::default();
    let reader = pool.add_data_source(&sparql("dbpedia.org")).unwrap();
    assert!(pool.write_adapter().is_none());

    let first = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let second = pool
        .add_data_source(&ConnectionParams::new("embedded").with_option("auto_flush", "false"))
        .unwrap();
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &second));

    assert!(pool.remove_data_source(&second));
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &first));
    assert!(!pool.remove_data_source(&second));

    assert!(pool.remove_data_source(&first));
    assert!(pool.write_adapter().is_none());
    assert_eq!(pool.adapters().len(), 1);
    assert!(Arc::ptr_eq(&pool.adapters()[0], &reader));
}

#[test]
fn test_re_adding_a_writer_makes_it_the_write_adapter() {
    let pool = ConnectionPool::default();
    let first = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let second = pool
        .add_data_source(&ConnectionParams::new("embedded").fresh())
        .unwrap();
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &second));

    let again = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    assert!(Arc::ptr_eq(&again, &first));
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &first));
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_removing_a_non_writer_keeps_the_write_adapter() {
    let pool = ConnectionPool::default();
    let writer = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let reader = pool.add_data_source(&sparql("dbpedia.org")).unwrap();
    assert!(pool.remove_data_source(&reader));
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &writer));
}

#[test]
fn test_set_write_adapter() {
    let pool = ConnectionPool::default();
    let first = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let _second = pool
        .add_data_source(&ConnectionParams::new("embedded").fresh())
        .unwrap();
    pool.set_write_adapter(&first).unwrap();
    assert!(Arc::ptr_eq(&pool.write_adapter().unwrap(), &first));

    let reader = pool.add_data_source(&sparql("dbpedia.org")).unwrap();
    assert!(matches!(
        pool.set_write_adapter(&reader),
        Err(FederationError::NotWritable("sparql"))
    ));

    let outsider: Arc<dyn Adapter> = Arc::new(EmbeddedAdapter::new());
    assert!(matches!(
        pool.set_write_adapter(&outsider),
        Err(FederationError::UnknownDataSource)
    ));
}

#[test]
fn test_clear_is_idempotent() {
    let pool = ConnectionPool::default();
    pool.clear();
    pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    pool.clear();
    assert!(pool.is_empty());
    assert!(pool.write_adapter().is_none());
    pool.clear();
    assert!(pool.is_empty());
}

#[test]
fn test_read_adapters_skip_disabled_members() {
    let pool = ConnectionPool::default();
    let first = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    let second = pool.add_data_source(&sparql("dbpedia.org")).unwrap();
    pool.set_enabled(&first, false);
    let readers = pool.read_adapters();
    assert_eq!(readers.len(), 1);
    assert!(Arc::ptr_eq(&readers[0], &second));
}

#[tokio::test]
async fn test_close_data_source_removes_it() {
    let pool = ConnectionPool::default();
    let adapter = pool.add_data_source(&ConnectionParams::new("embedded")).unwrap();
    pool.close_data_source(&adapter).await.unwrap();
    assert!(pool.is_empty());
    assert!(matches!(
        pool.close_data_source(&adapter).await,
        Err(FederationError::UnknownDataSource)
    ));
}

#[test]
fn test_concurrent_additions_create_one_adapter() {
    let pool = Arc::new(ConnectionPool::default());
    let handles = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                pool.add_data_source(&ConnectionParams::new("embedded"))
                    .unwrap()
            })
        })
        .collect::<Vec<_>>();
    let adapters = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(pool.len(), 1);
    assert!(adapters.iter().all(|a| Arc::ptr_eq(a, &adapters[0])));
}

#[test]
fn test_params_deserialize_from_json() {
    let params: ConnectionParams = serde_json::from_str(
        r#"{ "type": "SPARQL", "options": { "host": "dbpedia.org", "port": "80" } }"#,
    )
    .unwrap();
    assert_eq!(params, sparql("dbpedia.org").with_option("port", "80"));
    assert!(!params.is_fresh());

    let fresh: ConnectionParams =
        serde_json::from_str(r#"{ "type": "embedded", "fresh": true }"#).unwrap();
    assert!(fresh.is_fresh());
    assert!(fresh.options().is_empty());
}

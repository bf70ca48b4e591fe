use assert_fs::prelude::*;
use rdf_federation_adapters::embedded::EmbeddedAdapter;
use rdf_federation_adapters::{Adapter, AdapterError, ConnectionParams};
use rdf_federation_model::{NamedNode, Triple};
use std::error::Error;

fn ex(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

#[tokio::test]
async fn test_location_is_loaded_and_saved() -> Result<(), Box<dyn Error>> {
    let dir = assert_fs::TempDir::new()?;
    let file = dir.child("store.nq");
    file.write_str("<http://example.com/a> <http://example.com/p> <http://example.com/b> .\n")?;

    let params = ConnectionParams::new("embedded")
        .with_option("location", file.path().to_string_lossy());
    let adapter = EmbeddedAdapter::from_params(&params)?;
    assert_eq!(adapter.store().len(), 1);

    adapter
        .add(&Triple::new(ex("c"), ex("p"), ex("d")), Some(&ex("g")))
        .await?;
    adapter.flush().await?;

    let reopened = EmbeddedAdapter::from_params(&params)?;
    assert_eq!(reopened.store().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_auto_flush_persists_every_write() -> Result<(), Box<dyn Error>> {
    let dir = assert_fs::TempDir::new()?;
    let file = dir.child("store.nq");
    let params = ConnectionParams::new("embedded")
        .with_option("location", file.path().to_string_lossy())
        .with_option("auto_flush", "true");

    let adapter = EmbeddedAdapter::from_params(&params)?;
    adapter.add(&Triple::new(ex("a"), ex("p"), ex("b")), None).await?;
    let content = std::fs::read_to_string(file.path())?;
    assert!(content.contains("<http://example.com/a>"));
    Ok(())
}

#[tokio::test]
async fn test_failed_auto_flush_keeps_the_write() -> Result<(), Box<dyn Error>> {
    let dir = assert_fs::TempDir::new()?;
    let file = dir.child("missing-dir").child("store.nq");
    let params = ConnectionParams::new("embedded")
        .with_option("location", file.path().to_string_lossy())
        .with_option("auto_flush", "true");

    let adapter = EmbeddedAdapter::from_params(&params)?;
    let triple = Triple::new(ex("a"), ex("p"), ex("b"));
    assert!(adapter.add(&triple, None).await?);
    assert!(adapter.store().contains(&triple));
    assert!(matches!(adapter.flush().await, Err(AdapterError::Io(_))));
    Ok(())
}

#[test]
fn test_missing_location_starts_empty() {
    let dir = assert_fs::TempDir::new().unwrap();
    let params = ConnectionParams::new("embedded")
        .with_option("location", dir.child("absent.nq").path().to_string_lossy());
    let adapter = EmbeddedAdapter::from_params(&params).unwrap();
    assert!(adapter.store().is_empty());
}

#[test]
fn test_malformed_location_fails_construction() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("broken.nq");
    file.write_str("not a statement\n").unwrap();
    let params = ConnectionParams::new("embedded")
        .with_option("location", file.path().to_string_lossy());
    assert!(matches!(
        EmbeddedAdapter::from_params(&params),
        Err(AdapterError::Load(_))
    ));
}

#[test]
fn test_invalid_auto_flush() {
    let params = ConnectionParams::new("embedded").with_option("auto_flush", "sometimes");
    assert!(matches!(
        EmbeddedAdapter::from_params(&params),
        Err(AdapterError::InvalidOption { .. })
    ));
}

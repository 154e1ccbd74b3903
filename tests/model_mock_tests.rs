//! Tests against a mocked Model, checking exactly which calls the proxy makes

use autosave::{AutosaveOptions, AutosaveProxy, Model, Tracking};
use mockall::predicate::eq;
use mockall::{Sequence, mock};
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Document {}

    impl Model for Document {
        type Value = i64;

        fn get(&self, key: &str) -> Option<i64>;
        fn set(&self, key: &str, value: i64);
        fn save(&self) -> anyhow::Result<()>;
    }
}

#[tokio::test(start_paused = true)]
async fn test_writes_forwarded_then_saved_once() {
    let mut doc = MockDocument::new();
    let mut seq = Sequence::new();

    doc.expect_set()
        .with(eq("words"), eq(10))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    doc.expect_set()
        .with(eq("words"), eq(12))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    doc.expect_save()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));

    let proxy = AutosaveProxy::create(
        Some(Arc::new(doc)),
        AutosaveOptions::new().save_delay(Duration::from_millis(300)),
    )
    .unwrap();

    proxy.set("words", 10).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    proxy.set("words", 12).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Mock expectations are verified when the proxy releases the document
    drop(proxy);
}

#[tokio::test]
async fn test_reads_forwarded_without_side_effects() {
    let mut doc = MockDocument::new();
    doc.expect_get()
        .with(eq("words"))
        .times(2)
        .returning(|_| Some(7));
    doc.expect_set().never();
    doc.expect_save().never();

    let proxy = AutosaveProxy::create(Some(Arc::new(doc)), AutosaveOptions::new()).unwrap();

    assert_eq!(proxy.get("words"), Some(7));
    assert_eq!(proxy.get("words"), Some(7));
    assert!(!proxy.has_pending_save());
}

#[tokio::test]
async fn test_untracked_write_never_saves() {
    let mut doc = MockDocument::new();
    doc.expect_set()
        .with(eq("cursor"), eq(3))
        .times(1)
        .return_const(());
    doc.expect_save().never();

    let proxy = AutosaveProxy::create(
        Some(Arc::new(doc)),
        AutosaveOptions::new().except(["cursor"]),
    )
    .unwrap();

    assert_eq!(proxy.set("cursor", 3).unwrap(), Tracking::Untracked);
    proxy.destroy().unwrap();
}

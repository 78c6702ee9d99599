//! Loader, configuration and CLI integration
//!
//! Run with: cargo test --package kgviz-core --test loader_tests

use futures::executor::block_on;
use futures::{stream, StreamExt};
use kgviz_core::{cli, EnvironmentConfig, GraphLoader, GraphStatus, KgvizError};
use kgviz_reactive::{on_context, DeadlineError, SharedValue, Status, StatusExt};
use kgviz_test_utils::{
    counted_source, layered_graph, pathway_graph, write_document, CountingContext,
    ReversingContext, PATHWAY_BOUNDS, PATHWAY_JSON,
};
use pretty_assertions::assert_eq;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::Context;

#[tokio::test]
async fn loads_document_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "pathway.json", PATHWAY_JSON);

    let graph = GraphLoader::new().load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.bounding_rect(), PATHWAY_BOUNDS);
    assert_eq!(graph.node_by_id("disease:CML").unwrap().depth, 2);
    assert_eq!(graph.node_by_id("drug:imatinib").unwrap().value, 10.0);
}

#[tokio::test]
async fn missing_file_is_a_failed_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let snapshots: Vec<_> = GraphLoader::new()
        .load_status(path.to_str().unwrap())
        .collect()
        .await;
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].is_loading());
    let error = snapshots[1].error().unwrap();
    assert!(matches!(error, KgvizError::Io { .. }));
    assert!(error.is_retryable());
}

#[test]
fn status_stream_outside_tokio_fails_instead_of_panicking() {
    let snapshots: Vec<_> = block_on(
        GraphLoader::new()
            .load_status("/nonexistent/kgviz/graph.json")
            .collect(),
    );
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].is_loading());
    let error = snapshots[1].error().unwrap();
    assert!(matches!(error, KgvizError::Deadline(DeadlineError::NoRuntime)));
    assert!(!error.is_retryable());

    let settled = block_on(GraphLoader::new().load_settled("/nonexistent/kgviz/graph.json"));
    assert!(matches!(settled, Err(KgvizError::Deadline(DeadlineError::NoRuntime))));
}

#[tokio::test]
async fn status_stream_through_context_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "pathway.json", PATHWAY_JSON);
    let context = Arc::new(CountingContext::default());

    let statuses = GraphLoader::new()
        .load_status(path.to_str().unwrap())
        .map(Ok::<_, Infallible>);
    let out: Vec<_> = on_context(Arc::clone(&context), statuses).collect().await;

    assert_eq!(out.len(), 2);
    assert!(matches!(&out[0], Ok(s) if s.is_loading()));
    assert!(matches!(&out[1], Ok(s) if s.is_ready()));
    // two snapshots plus completion
    assert_eq!(context.runs(), 3);
}

#[test]
fn reversed_dispatch_keeps_snapshot_order() {
    let context = ReversingContext::new();
    let statuses = stream::iter(vec![Ok::<_, String>(1), Ok(2), Ok(3)])
        .with_status()
        .map(Ok::<_, Infallible>);
    let mut adapted = on_context(Arc::clone(&context), statuses);

    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(adapted.poll_next_unpin(&mut cx).is_pending());
    // loading, three values, completion
    assert_eq!(context.pending(), 5);
    assert_eq!(context.flush(), 5);

    let out: Vec<Status<i32, String>> = block_on(adapted.map(|r| r.unwrap()).collect());
    assert_eq!(
        out,
        vec![Status::Loading, Status::Ready(1), Status::Ready(2), Status::Ready(3)]
    );
}

#[test]
fn inspect_reports_pathway_summary() {
    let report = cli::inspect(&pathway_graph());
    assert!(report.contains("nodes: 4"));
    assert!(report.contains("max depth: 2"));
    assert!(report.ends_with("bounds: x 0..420, y 0..120"));
}

#[tokio::test]
async fn subscribers_observe_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "pathway.json", PATHWAY_JSON);
    let store = SharedValue::new(GraphStatus::Loading);
    let mut updates = Box::pin(store.subscribe());

    assert!(updates.next().await.unwrap().is_loading());
    let last = GraphLoader::new().refresh(path.to_str().unwrap(), &store).await;
    assert!(last.is_ready());

    let latest = updates.next().await.unwrap();
    assert_eq!(latest.value().map(|g| g.link_count()), Some(4));
}

#[tokio::test]
async fn scripted_source_is_not_polled_before_loading() {
    let (source, polls) = counted_source(vec![Ok::<_, String>(1), Ok(2)]);
    let mut snapshots = source.with_status();

    assert!(snapshots.next().await.unwrap().is_loading());
    assert_eq!(polls.load(std::sync::atomic::Ordering::SeqCst), 0);

    let rest: Vec<_> = snapshots.collect().await;
    assert_eq!(rest.len(), 2);
}

#[test]
fn layered_fixture_depths() {
    let graph = layered_graph(&[2, 3, 1]);
    assert_eq!(graph.link_count(), 2 * 3 + 3);
    assert!(graph.nodes().iter().filter(|n| n.depth == 2).all(|n| n.height == 0));
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kgviz.toml");
    std::fs::write(
        &path,
        "production = true\noauth_enabled = true\noauth_issuer = \"https://auth.example.org\"\noauth_client_id = \"kgviz\"\n",
    )
    .unwrap();

    let config = EnvironmentConfig::from_file(&path).unwrap();
    assert!(config.production);
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn cli_bounds_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "pathway.json", PATHWAY_JSON);

    let matches = cli::build_command()
        .try_get_matches_from(["kgviz", "bounds", path.to_str().unwrap(), "--json"])
        .unwrap();
    let output = cli::run(&matches).await.unwrap();
    assert_eq!(output, r#"{"x0":0.0,"x1":420.0,"y0":0.0,"y1":120.0}"#);
}

#[tokio::test]
async fn cli_hit_reports_topmost_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "pathway.json", PATHWAY_JSON);

    let matches = cli::build_command()
        .try_get_matches_from(["kgviz", "hit", path.to_str().unwrap(), "210", "100"])
        .unwrap();
    assert_eq!(cli::run(&matches).await.unwrap(), "KIT (gene:KIT)");
}

#[tokio::test]
async fn cli_reports_load_failure_with_context() {
    let matches = cli::build_command()
        .try_get_matches_from(["kgviz", "inspect", "/nonexistent/kgviz/graph.json"])
        .unwrap();
    let err = cli::run(&matches).await.unwrap_err();
    assert!(err.to_string().contains("failed to load"));
}

//! Status pipeline and serialized update properties
//!
//! Run with: cargo test --package kgviz-reactive --test pipeline_tests

use futures::executor::block_on;
use futures::stream::{self, StreamExt};
use kgviz_reactive::prelude::*;
use kgviz_reactive::{InlineContext, UpdateError};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #[test]
    fn prop_n_values_give_n_plus_one_snapshots(values in proptest::collection::vec(any::<i32>(), 0..50)) {
        let source = stream::iter(values.clone().into_iter().map(Ok::<_, String>));
        let snapshots: Vec<Status<i32, String>> = block_on(source.with_status().collect());

        prop_assert_eq!(snapshots.len(), values.len() + 1);
        prop_assert!(snapshots[0].is_loading());
        let emitted: Vec<i32> = snapshots[1..].iter().filter_map(|s| s.value().copied()).collect();
        prop_assert_eq!(emitted, values);
    }

    #[test]
    fn prop_failure_after_k_values(
        values in proptest::collection::vec(any::<u16>(), 0..30),
        trailing in proptest::collection::vec(any::<u16>(), 0..5),
    ) {
        let k = values.len();
        let items = values
            .into_iter()
            .map(Ok)
            .chain(std::iter::once(Err("source failed")))
            .chain(trailing.into_iter().map(Ok));
        let snapshots: Vec<_> = block_on(stream::iter(items).with_status().collect());

        // loading + k values + exactly one error, nothing after it
        prop_assert_eq!(snapshots.len(), k + 2);
        prop_assert!(snapshots[..=k].iter().all(|s| !s.is_failed()));
        prop_assert_eq!(snapshots.last(), Some(&Status::Failed("source failed")));
    }

    #[test]
    fn prop_context_adapter_is_transparent(values in proptest::collection::vec(any::<u8>(), 0..40)) {
        let source = stream::iter(values.clone().into_iter().map(Ok::<_, ()>));
        let out: Vec<Result<u8, ()>> = block_on(source.on_context(InlineContext).collect());
        prop_assert_eq!(out, values.into_iter().map(Ok).collect::<Vec<_>>());
    }
}

#[test]
fn resubscribing_restarts_from_loading() {
    let make_source = || stream::iter(vec![Err::<u8, _>("offline")]);

    let first: Vec<_> = block_on(make_source().with_status().collect());
    let retry: Vec<_> = block_on(make_source().with_status().collect());

    assert_eq!(first, vec![Status::Loading, Status::Failed("offline")]);
    assert_eq!(retry, first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unchained_updates_are_mutually_exclusive() {
    const CALLERS: u64 = 64;
    let holder = SharedValue::new(0u64);

    let tasks: Vec<_> = (0..CALLERS)
        .map(|_| {
            let holder = holder.clone();
            tokio::spawn(async move {
                holder
                    .update(|v| async move {
                        // Yield between read and write to invite interleaving.
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        Ok::<_, ()>(v + 1)
                    })
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap().unwrap());
    }

    assert_eq!(holder.get(), CALLERS);
    assert_eq!(holder.version(), CALLERS);
    // every caller observed a distinct generation
    results.sort_unstable();
    assert_eq!(results, (1..=CALLERS).collect::<Vec<_>>());
}

#[tokio::test]
async fn failed_update_in_queue_does_not_block_others() {
    let holder = SharedValue::new(String::from("base"));

    let failing = holder.spawn_update(|_| async { Err::<String, _>("invalid entity") });
    let succeeding = holder.spawn_update(|v| async move { Ok::<_, &str>(format!("{v}+entity")) });

    assert_eq!(failing.await, Err(UpdateError::Transform("invalid entity")));
    assert_eq!(succeeding.await.unwrap(), "base+entity");
    assert_eq!(holder.get(), "base+entity");
}

#[tokio::test]
async fn subscribers_see_published_values() {
    let holder = SharedValue::new(0u32);
    let mut updates = Box::pin(holder.subscribe());

    assert_eq!(updates.next().await, Some(0));
    holder.update_with(|v| v + 7).await;
    assert_eq!(updates.next().await, Some(7));
}

#[tokio::test]
async fn deadline_is_distinct_from_source_failure() {
    let slow = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err::<u8, &str>("source failure")
    };
    let raced = with_deadline(Duration::from_millis(5), slow).await;

    match raced {
        Err(err) => assert!(err.is_elapsed()),
        Ok(inner) => panic!("deadline should have fired, got {inner:?}"),
    }
}

#[tokio::test]
async fn first_value_of_status_stream_is_loading() {
    let source = stream::iter(vec![Ok::<_, ()>(1)]);
    let head = first_value(source.with_status()).await;
    assert_eq!(head, Ok(Status::Loading));
}

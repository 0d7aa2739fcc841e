//! Concurrent writers racing for the same unique values.

mod common;

use common::stale_storage::StaleStorage;
use common::{country, init_logging, seeded_directory, walid, yosaf};
use futures::future::join_all;
use phone_directory::model::{CountryPayload, CustomerPayload, PageRequest};
use phone_directory::{Directory, DirectoryBuilder, DirectoryError, Rule};
use std::sync::Arc;

fn lost_on_phone(err: &DirectoryError) -> bool {
    match err {
        DirectoryError::Conflict { field, .. } => field == "phone",
        DirectoryError::Validation(errors) => errors
            .for_field("phone")
            .any(|v| v.rule == Rule::Unique),
        _ => false,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_with_same_phone_commit_once() {
    let (directory, _) = seeded_directory().await;
    let directory = Arc::new(directory);

    let attempts = (0..16).map(|n| {
        let directory = Arc::clone(&directory);
        tokio::spawn(async move {
            directory
                .customers()
                .add(CustomerPayload::new(format!("Racer {}", n), "(20) 123-547-8915"))
                .await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(lost_on_phone(err), "unexpected error: {}", err);
        assert!(err.is_client_error());
    }

    let page = directory
        .customers()
        .list(&directory.first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_cannot_share_an_email() {
    let (directory, _) = seeded_directory().await;
    let directory = Arc::new(directory);

    let mut ids = Vec::new();
    for n in 0..8 {
        let customer = directory
            .customers()
            .add(CustomerPayload::new(format!("Sharer {}", n), format!("(1) 555-000-{:04}", n)))
            .await
            .unwrap();
        ids.push(customer.id);
    }

    let attempts = ids.iter().map(|&id| {
        let directory = Arc::clone(&directory);
        tokio::spawn(async move {
            directory
                .customers()
                .update(id, CustomerPayload::default().with_email("shared@example.com"))
                .await
        })
    });
    let results = join_all(attempts).await;
    let committed = results
        .iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();
    assert_eq!(committed, 1);

    let mut holders = 0;
    for id in ids {
        let customer = directory.customers().get(id).await.unwrap();
        if customer.email.as_deref() == Some("shared@example.com") {
            holders += 1;
        }
    }
    assert_eq!(holders, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_country_adds_keep_codes_unique() {
    let (directory, countries) = seeded_directory().await;
    directory.countries().delete(countries[0].id).await.unwrap();
    let directory = Arc::new(directory);

    let attempts = (0..12u8).map(|n| {
        let directory = Arc::clone(&directory);
        tokio::spawn(async move {
            // Same alpha-2 for everyone, distinct alpha-3 and ISD.
            let payload = CountryPayload::new(
                format!("Egypt {}", n),
                "EG",
                format!("E{}G", (b'A' + n) as char),
                format!("{}", 900 + u32::from(n)),
            );
            directory.countries().add(payload).await
        })
    });
    let results = join_all(attempts).await;
    assert_eq!(
        results.iter().filter(|joined| matches!(joined, Ok(Ok(_)))).count(),
        1
    );

    let page = directory.countries().list(&PageRequest::first(50)).await.unwrap();
    assert_eq!(page.content.iter().filter(|c| c.alpha2_code == "EG").count(), 1);
    assert_eq!(page.total_elements, 5);
}

#[tokio::test]
async fn readers_never_see_rejected_writes() {
    let (directory, _) = seeded_directory().await;
    directory.customers().add(walid()).await.unwrap();

    let rejected = directory
        .customers()
        .add(CustomerPayload::new("Walid Copy", "(20) 123-547-8915").with_email("copy@example.com"))
        .await;
    assert!(rejected.is_err());
    assert!(!directory.customers().exists_by_email("copy@example.com").await.unwrap());
}

/// A directory whose customer uniqueness checks always see an empty store.
async fn stale_directory() -> Directory<StaleStorage> {
    init_logging();
    let directory = DirectoryBuilder::new(StaleStorage::new()).build().await.unwrap();
    for alpha2 in ["EG", "MA"] {
        directory.countries().add(country(alpha2)).await.unwrap();
    }
    directory
}

#[tokio::test]
async fn add_that_passes_a_stale_check_still_conflicts_on_phone() {
    let directory = stale_directory().await;
    let first = directory.customers().add(walid()).await.unwrap();

    let err = directory
        .customers()
        .add(CustomerPayload::new("Walid Twin", first.phone.clone()))
        .await
        .unwrap_err();

    match &err {
        DirectoryError::Conflict { field, value } => {
            assert_eq!(field, "phone");
            assert_eq!(value, &first.phone);
        }
        other => panic!("expected a conflict, got {}", other),
    }
    assert!(err.is_client_error());
    assert_eq!(directory.customers().count().await.unwrap(), 1);
}

#[tokio::test]
async fn update_that_passes_a_stale_check_still_conflicts_on_email() {
    let directory = stale_directory().await;
    directory.customers().add(walid()).await.unwrap();
    let other = directory.customers().add(yosaf()).await.unwrap();

    let err = directory
        .customers()
        .update(other.id, CustomerPayload::default().with_email("walid@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        DirectoryError::Conflict { field, .. } if field == "email"
    ));
    assert_eq!(directory.customers().get(other.id).await.unwrap(), other);
    assert_eq!(directory.customers().count().await.unwrap(), 2);
}

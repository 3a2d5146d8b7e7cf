mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::*;
use rzp_aggregator::query::{Partition, SubjectKey};
use rzp_aggregator::search::{wide_search, SearchScope};
use rzp_aggregator::SearchError;

fn name_key() -> SubjectKey {
    SubjectKey::name("SILVERTONNI").unwrap()
}

#[tokio::test]
async fn test_merges_both_partitions() {
    let registry = ScriptedRegistry::new()
        .with_subjects(
            &name_key(),
            Partition::Entrepreneur,
            page(vec![
                candidate("Jan Silvertonni", "11111111", "r-1", true),
                candidate("Petr Silvertonni", "22222222", "r-2", true),
            ]),
        )
        .with_subjects(
            &name_key(),
            Partition::StatutoryBody,
            page(vec![candidate("THOMAS SILVERTONNI s.r.o.", "01895541", "r-3", false)]),
        );
    let stats = registry.stats();
    let client = registry.into_client();

    let candidates = wide_search(client.as_ref(), &SearchScope::new(), &name_key())
        .await
        .unwrap();

    let icos: HashSet<&str> = candidates.iter().map(|c| c.ico.as_str()).collect();
    assert_eq!(candidates.len(), 3);
    assert_eq!(icos, HashSet::from(["11111111", "22222222", "01895541"]));
    assert_eq!(CallStats::get(&stats.subject_searches), 2);
}

#[tokio::test]
async fn test_keeps_order_within_partition() {
    let registry = ScriptedRegistry::new().with_subjects(
        &name_key(),
        Partition::Entrepreneur,
        page(vec![
            candidate("B", "22222222", "r-2", true),
            candidate("A", "11111111", "r-1", true),
        ]),
    );
    let client = registry.into_client();

    let candidates = wide_search(client.as_ref(), &SearchScope::new(), &name_key())
        .await
        .unwrap();
    let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[tokio::test]
async fn test_does_not_deduplicate_across_partitions() {
    let same = candidate("Jan Novák", "12345678", "r-1", true);
    let registry = ScriptedRegistry::new()
        .with_subjects(&name_key(), Partition::Entrepreneur, page(vec![same.clone()]))
        .with_subjects(&name_key(), Partition::StatutoryBody, page(vec![same]));
    let client = registry.into_client();

    let candidates = wide_search(client.as_ref(), &SearchScope::new(), &name_key())
        .await
        .unwrap();
    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn test_truncation_in_either_partition_is_ambiguous() {
    for truncated in Partition::ALL {
        let other = if truncated == Partition::Entrepreneur {
            Partition::StatutoryBody
        } else {
            Partition::Entrepreneur
        };
        let registry = ScriptedRegistry::new()
            .with_subjects(
                &name_key(),
                truncated,
                truncated_page(vec![candidate("A", "11111111", "r-1", true)]),
            )
            .with_subjects(
                &name_key(),
                other,
                page(vec![candidate("B", "22222222", "r-2", false)]),
            );
        let client = registry.into_client();

        let err = wide_search(client.as_ref(), &SearchScope::new(), &name_key())
            .await
            .unwrap_err();
        assert!(err.is_ambiguous(), "{} truncation gave {:?}", truncated, err);
    }
}

#[tokio::test]
async fn test_truncated_empty_page_is_still_ambiguous() {
    let registry = ScriptedRegistry::new().with_subjects(
        &name_key(),
        Partition::StatutoryBody,
        truncated_page(vec![]),
    );
    let client = registry.into_client();

    let err = wide_search(client.as_ref(), &SearchScope::new(), &name_key())
        .await
        .unwrap_err();
    assert!(err.is_ambiguous());
}

#[tokio::test]
async fn test_partition_failure_cancels_scope() {
    let registry = ScriptedRegistry::new()
        .with_delay(Duration::from_millis(5))
        .with_subjects(&name_key(), Partition::Entrepreneur, Err("gateway down".into()))
        .with_subjects(
            &name_key(),
            Partition::StatutoryBody,
            page(vec![candidate("B", "22222222", "r-2", false)]),
        );
    let client = registry.into_client();
    let scope = SearchScope::new();

    let err = wide_search(client.as_ref(), &scope, &name_key())
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Remote(ref m) if m.contains("gateway down")));
    assert!(scope.is_cancelled());
    assert_eq!(scope.cause(), Some(err));
}

#[tokio::test]
async fn test_cancelled_scope_issues_no_calls() {
    let registry = ScriptedRegistry::new();
    let stats = registry.stats();
    let client = registry.into_client();
    let scope = SearchScope::new();
    scope.fail(SearchError::Remote("earlier failure".into()));

    let err = wide_search(client.as_ref(), &scope, &name_key())
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::Remote("earlier failure".into()));
    assert_eq!(CallStats::get(&stats.subject_searches), 0);
}

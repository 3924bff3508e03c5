//! Tests for the deterministic fake providers.

use std::time::Duration;

use storyreel_error::{ProviderErrorKind, RetryableError};
use storyreel_interface::{NarrationProvider, VisualProvider};
use storyreel_models::{FakeNarrationProvider, FakeVisualProvider};

#[tokio::test]
async fn test_fake_references_are_deterministic_per_input() {
    let visual = FakeVisualProvider::new();
    let a = visual.synthesize_visual("a dragon").await.unwrap();
    let b = visual.synthesize_visual("a dragon").await.unwrap();
    let c = visual.synthesize_visual("a village").await.unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(visual.calls(), 3);

    let narration = FakeNarrationProvider::new();
    let n = narration.synthesize_narration("a dragon").await.unwrap();
    assert!(n.as_str().starts_with("fake://narration/"));
}

#[tokio::test]
async fn test_fake_fails_on_matching_input() {
    let visual = FakeVisualProvider::new().failing_when_contains("flies");

    assert!(visual.synthesize_visual("A dragon wants friends").await.is_ok());
    let err = visual
        .synthesize_visual("It flies over the village")
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::Rejected(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fake_transient_failures_then_success() {
    let narration = FakeNarrationProvider::new().with_transient_failures(2);

    for _ in 0..2 {
        let err = narration.synthesize_narration("text").await.unwrap_err();
        assert!(err.is_retryable());
    }
    assert!(narration.synthesize_narration("text").await.is_ok());
}

#[tokio::test]
async fn test_fake_unconfigured_is_unavailable() {
    let visual = FakeVisualProvider::new().unconfigured();
    let err = visual.synthesize_visual("text").await.unwrap_err();
    assert!(err.kind.is_unavailable());
}

#[tokio::test]
async fn test_fake_tracks_concurrent_calls() {
    let visual = FakeVisualProvider::new().with_delay(Duration::from_millis(50));

    let (a, b) = tokio::join!(
        visual.synthesize_visual("one"),
        visual.synthesize_visual("two")
    );
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(visual.max_in_flight(), 2);
}

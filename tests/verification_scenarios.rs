//! End-to-end verification scenarios
//!
//! Drives the service façade with fixed-score and seeded strategies and
//! checks the verdict mapping, error propagation, history ordering and
//! statistics contracts from the outside.

use std::sync::Arc;
use std::time::Duration;
use veracity::detection::{FixedFailure, FixedScoreStrategy};
use veracity::{
    BinaryHandle, ContentKind, ContentSubmission, HistoryQuery, HistoryStats, RawScore,
    StrategyRegistry, VeracityConfig, VeracityError, Verdict, VerificationService,
};

// ─── Helper ─────────────────────────────────────────────────────────

fn fixed(s: f64) -> FixedScoreStrategy {
    FixedScoreStrategy::new(RawScore::new(s).unwrap())
}

async fn service_with(
    bindings: Vec<(ContentKind, FixedScoreStrategy)>,
    config: &VeracityConfig,
) -> VerificationService {
    let mut registry = StrategyRegistry::new();
    for (kind, strategy) in bindings {
        registry.register(kind, Arc::new(strategy)).unwrap();
    }
    VerificationService::new(registry, config).await.unwrap()
}

fn image(name: &str) -> ContentSubmission {
    ContentSubmission::binary(ContentKind::Image, BinaryHandle::new(name, "image/jpeg", 250_000))
}

// ═══════════════════════════════════════════════════════════════════
// Section 1: Verdict Mapping
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_confident_real_text() {
    let service = service_with(vec![(ContentKind::Text, fixed(0.95))], &VeracityConfig::default()).await;
    let result = service
        .submit(ContentSubmission::text("The museum reopens in June."))
        .await
        .unwrap();
    assert_eq!(result.verdict(), Verdict::Real);
    assert_eq!(result.confidence(), 95);
    assert!(!result.explanation().is_empty());
    assert_eq!(result.submission().kind(), ContentKind::Text);
}

#[tokio::test]
async fn test_midpoint_is_uncertain() {
    let service = service_with(vec![(ContentKind::Text, fixed(0.5))], &VeracityConfig::default()).await;
    let result = service.submit(ContentSubmission::text("Hmm.")).await.unwrap();
    assert_eq!(result.verdict(), Verdict::Uncertain);
    assert_eq!(result.confidence(), 50);
}

#[tokio::test]
async fn test_threshold_scores_are_decided() {
    for (s, verdict) in [(0.6, Verdict::Real), (0.4, Verdict::Fake), (0.55, Verdict::Uncertain)] {
        let service = service_with(vec![(ContentKind::Text, fixed(s))], &VeracityConfig::default()).await;
        let result = service.submit(ContentSubmission::text("x")).await.unwrap();
        assert_eq!(result.verdict(), verdict, "s = {}", s);
        assert_eq!(result.confidence(), if s == 0.55 { 55 } else { 60 });
    }
}

// ═══════════════════════════════════════════════════════════════════
// Section 2: Failures Leave History Untouched
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_unregistered_kind_leaves_history_unchanged() {
    let service = service_with(vec![(ContentKind::Text, fixed(0.8))], &VeracityConfig::default()).await;
    service.submit(ContentSubmission::text("ok")).await.unwrap();
    let before = service.history(&HistoryQuery::new()).await;

    let err = service.submit(image("photo.jpg")).await.unwrap_err();
    assert!(matches!(err, VeracityError::NoStrategyRegistered(ContentKind::Image)));
    assert_eq!(service.history(&HistoryQuery::new()).await, before);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_leaves_history_and_stats_unchanged() {
    let config = VeracityConfig {
        strategy_timeout_ms: 1_000,
        ..Default::default()
    };
    let service = service_with(
        vec![
            (ContentKind::Text, fixed(0.9)),
            (ContentKind::Image, fixed(0.1).with_delay(Duration::from_secs(60))),
        ],
        &config,
    )
    .await;
    service.submit(ContentSubmission::text("ok")).await.unwrap();
    let stats_before = service.stats().await;
    let history_before = service.history(&HistoryQuery::new()).await;

    let err = service.submit(image("slow.jpg")).await.unwrap_err();
    assert!(matches!(err, VeracityError::AnalysisTimeout { timeout_ms: 1_000, .. }));
    assert!(err.is_retryable());

    assert_eq!(service.stats().await, stats_before);
    assert_eq!(service.history(&HistoryQuery::new()).await, history_before);
}

#[tokio::test]
async fn test_strategy_failures_bubble_unchanged() {
    let service = service_with(
        vec![
            (ContentKind::Text, fixed(0.9).failing(FixedFailure::Unavailable)),
            (ContentKind::Image, fixed(0.9).failing(FixedFailure::Unsupported)),
        ],
        &VeracityConfig::default(),
    )
    .await;

    let err = service.submit(ContentSubmission::text("x")).await.unwrap_err();
    assert!(matches!(err, VeracityError::StrategyUnavailable { .. }));
    let err = service.submit(image("a.jpg")).await.unwrap_err();
    assert!(matches!(err, VeracityError::UnsupportedContent { .. }));

    assert_eq!(service.stats().await, HistoryStats::default());
}

// ═══════════════════════════════════════════════════════════════════
// Section 3: History Ordering and Statistics
// ═══════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_history_follows_completion_order() {
    let service = service_with(
        vec![
            (ContentKind::Text, fixed(0.9).named("slow").with_delay(Duration::from_millis(500))),
            (ContentKind::Image, fixed(0.1).named("fast").with_delay(Duration::from_millis(10))),
        ],
        &VeracityConfig::default(),
    )
    .await;

    // Text is submitted first but finishes last
    let (slow, fast) = tokio::join!(
        service.submit(ContentSubmission::text("submitted first")),
        service.submit(image("submitted-second.jpg")),
    );
    let (slow, fast) = (slow.unwrap(), fast.unwrap());
    assert!(slow.completed_at() >= fast.completed_at());

    let history = service.history(&HistoryQuery::new()).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id(), slow.id());
    assert_eq!(history[1].id(), fast.id());
}

#[tokio::test]
async fn test_history_is_newest_first_and_stats_match() {
    let service = VerificationService::with_mocks(&VeracityConfig {
        mock_seed: 2024,
        ..Default::default()
    })
    .await
    .unwrap();

    let mut successes = 0;
    for i in 0..12 {
        let submission = match i % 4 {
            0 => ContentSubmission::text(format!("claim number {}", i)),
            1 => image(&format!("frame_{}.jpg", i)),
            2 => ContentSubmission::binary(
                ContentKind::Audio,
                BinaryHandle::new(format!("memo_{}.mp3", i), "audio/mpeg", 80_000),
            ),
            _ => ContentSubmission::text("   "),
        };
        if service.submit(submission).await.is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 9);

    let history = service.history(&HistoryQuery::new()).await;
    assert!(history
        .windows(2)
        .all(|w| w[0].completed_at() >= w[1].completed_at()));

    let stats = service.stats().await;
    assert_eq!(stats.total, successes);
    assert!(stats.is_consistent());
    assert_eq!(stats, HistoryStats::from_results(&history));
    assert_eq!(service.stats().await, stats);

    let audio = service
        .history(&HistoryQuery::new().kind(ContentKind::Audio).limit(2))
        .await;
    assert_eq!(audio.len(), 2);
    assert!(audio.iter().all(|r| r.submission().kind() == ContentKind::Audio));
}

#[tokio::test]
async fn test_seeded_mocks_are_reproducible() {
    let config = VeracityConfig {
        mock_seed: 77,
        ..Default::default()
    };
    let a = VerificationService::with_mocks(&config).await.unwrap();
    let b = VerificationService::with_mocks(&config).await.unwrap();

    for text in ["Aliens built the pyramids", "Rates rose by a quarter point"] {
        let ra = a.submit(ContentSubmission::text(text)).await.unwrap();
        let rb = b.submit(ContentSubmission::text(text)).await.unwrap();
        assert_eq!(ra.raw_score(), rb.raw_score());
        assert_eq!((ra.verdict(), ra.confidence()), (rb.verdict(), rb.confidence()));
        assert_ne!(ra.id(), rb.id());
    }
}

#[tokio::test]
async fn test_retention_cap() {
    let config = VeracityConfig {
        history_capacity: Some(3),
        ..Default::default()
    };
    let service = service_with(vec![(ContentKind::Text, fixed(0.9))], &config).await;
    for i in 0..5 {
        service.submit(ContentSubmission::text(format!("item {}", i))).await.unwrap();
    }
    let history = service.history(&HistoryQuery::new()).await;
    let previews: Vec<_> = history.iter().map(|r| r.input_preview().to_string()).collect();
    assert_eq!(previews, vec!["item 4", "item 3", "item 2"]);
    assert_eq!(service.stats().await.total, 3);
}

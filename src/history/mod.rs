//! History store: ledger of completed analyses
//!
//! Results are kept in completion order and exposed newest first. Verdict
//! counters are maintained alongside the sequence under the same lock, so
//! `stats()` always equals a scan of what `list()` would return.
//!
//! Appends take the write lock; `list`/`stats` take read locks and see a
//! consistent snapshot. An optional capacity evicts the oldest results.
//! The whole ledger can be saved to / loaded from a versioned JSON file.

use crate::content::ContentKind;
use crate::engine::scoring::{ScoringPolicy, Verdict};
use crate::engine::AnalysisResult;
use crate::VeracityResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

const SNAPSHOT_VERSION: u32 = 1;

// ─── Query & Stats ─────────────────────────────────────────────────

/// Optional filters for [`HistoryStore::list`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub kind: Option<ContentKind>,
    pub verdict: Option<Verdict>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    fn matches(&self, result: &AnalysisResult) -> bool {
        self.kind.map_or(true, |k| result.submission().kind() == k)
            && self.verdict.map_or(true, |v| result.verdict() == v)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub real_count: usize,
    pub fake_count: usize,
    pub uncertain_count: usize,
}

impl HistoryStats {
    /// Count verdicts by scanning a sequence of results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a AnalysisResult>) -> Self {
        let mut stats = Self::default();
        for r in results {
            stats.record(r.verdict());
        }
        stats
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.real_count + self.fake_count + self.uncertain_count
    }

    fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Real => self.real_count += 1,
            Verdict::Fake => self.fake_count += 1,
            Verdict::Uncertain => self.uncertain_count += 1,
        }
    }

    fn forget(&mut self, verdict: Verdict) {
        self.total = self.total.saturating_sub(1);
        let slot = match verdict {
            Verdict::Real => &mut self.real_count,
            Verdict::Fake => &mut self.fake_count,
            Verdict::Uncertain => &mut self.uncertain_count,
        };
        *slot = slot.saturating_sub(1);
    }
}

// ─── Store ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Ledger {
    /// Oldest first, ordered by `completed_at`
    results: VecDeque<AnalysisResult>,
    stats: HistoryStats,
}

/// On-disk history snapshot
#[derive(Debug, Serialize, Deserialize)]
struct HistorySnapshot {
    version: u32,
    results: Vec<AnalysisResult>,
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    ledger: RwLock<Ledger>,
    capacity: Option<usize>,
    save_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` results, evicting the oldest
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    fn bounded(capacity: Option<usize>) -> Self {
        match capacity {
            Some(c) => Self::with_capacity(c),
            None => Self::new(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Record a completed result
    ///
    /// Results normally arrive in completion order and land at the back in
    /// O(1). One that completed earlier than the newest entry is slotted in
    /// by `completed_at`; equal timestamps keep arrival order. Submission
    /// times are capped at `MAX_CLOCK_SKEW_SECS` ahead of the clock, so the
    /// backward scan and the insert only cover results completed within
    /// that window.
    pub async fn append(&self, result: AnalysisResult) {
        let mut ledger = self.ledger.write().await;
        let verdict = result.verdict();

        let at = ledger
            .results
            .iter()
            .rposition(|r| r.completed_at() <= result.completed_at())
            .map_or(0, |i| i + 1);
        ledger.results.insert(at, result);
        ledger.stats.record(verdict);

        if let Some(cap) = self.capacity {
            while ledger.results.len() > cap {
                if let Some(evicted) = ledger.results.pop_front() {
                    ledger.stats.forget(evicted.verdict());
                    tracing::debug!("History full, evicted {}", evicted.id());
                }
            }
        }
    }

    /// Newest-first results matching `query`
    pub async fn list(&self, query: &HistoryQuery) -> Vec<AnalysisResult> {
        let ledger = self.ledger.read().await;
        ledger
            .results
            .iter()
            .rev()
            .filter(|r| query.matches(r))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> HistoryStats {
        self.ledger.read().await.stats
    }

    pub async fn len(&self) -> usize {
        self.ledger.read().await.results.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // ─── Snapshot ──────────────────────────────────────────────────

    /// Write the whole ledger to `path` as pretty JSON
    ///
    /// Saves are serialized and each one captures the ledger after taking
    /// the save lock, so the file on disk only ever moves forward. The JSON
    /// goes to a sibling temp file first and is renamed over `path`.
    pub async fn save_snapshot(&self, path: &Path) -> VeracityResult<()> {
        let _guard = self.save_lock.lock().await;
        let snapshot = {
            let ledger = self.ledger.read().await;
            HistorySnapshot {
                version: SNAPSHOT_VERSION,
                results: ledger.results.iter().cloned().collect(),
            }
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        let tmp = temp_path_for(path);
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!("Saved history snapshot ({} results) to {}", snapshot.results.len(), path.display());
        Ok(())
    }

    /// Load a ledger saved by [`save_snapshot`](Self::save_snapshot)
    ///
    /// A missing, unparsable or other-version file yields an empty store.
    /// Results that `policy` would not have produced, or that repeat an id
    /// already loaded, are dropped.
    pub async fn load_snapshot(
        path: &Path,
        capacity: Option<usize>,
        policy: &ScoringPolicy,
    ) -> VeracityResult<Self> {
        let store = Self::bounded(capacity);
        if !path.exists() {
            return Ok(store);
        }

        let content = tokio::fs::read_to_string(path).await?;
        let snapshot = match serde_json::from_str::<HistorySnapshot>(&content) {
            Ok(s) if s.version == SNAPSHOT_VERSION => s,
            Ok(s) => {
                tracing::debug!(
                    "History snapshot version {} != {}, starting fresh",
                    s.version,
                    SNAPSHOT_VERSION
                );
                return Ok(store);
            }
            Err(e) => {
                tracing::warn!("Unreadable history snapshot {}: {}, starting fresh", path.display(), e);
                return Ok(store);
            }
        };

        let mut seen = HashSet::new();
        let mut dropped = 0usize;
        for result in snapshot.results {
            if !seen.insert(result.id()) || !result.is_consistent_with(policy) {
                dropped += 1;
                continue;
            }
            store.append(result).await;
        }
        if dropped > 0 {
            tracing::warn!("Dropped {} inconsistent or duplicate result(s) from {}", dropped, path.display());
        }
        tracing::info!("Loaded history snapshot ({} results) from {}", store.len().await, path.display());
        Ok(store)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "history.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VeracityConfig;
    use crate::content::{BinaryHandle, ContentSubmission};
    use crate::detection::{FixedScoreStrategy, RawScore};
    use crate::engine::registry::StrategyRegistry;
    use crate::engine::AnalysisOrchestrator;
    use std::sync::Arc;

    async fn result_with(kind: ContentKind, s: f64) -> AnalysisResult {
        let mut registry = StrategyRegistry::new();
        registry
            .register(kind, Arc::new(FixedScoreStrategy::new(RawScore::new(s).unwrap())))
            .unwrap();
        let orch = AnalysisOrchestrator::new(registry, &VeracityConfig::default()).unwrap();
        let submission = match kind {
            ContentKind::Text => ContentSubmission::text("a claim"),
            other => ContentSubmission::binary(
                other,
                BinaryHandle::new("clip.bin", format!("{}/x-test", other), 4096),
            ),
        };
        orch.run(submission).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = HistoryStore::new();
        let first = result_with(ContentKind::Text, 0.9).await;
        let second = result_with(ContentKind::Text, 0.1).await;
        store.append(first.clone()).await;
        store.append(second.clone()).await;

        let listed = store.list(&HistoryQuery::new()).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }

    #[tokio::test]
    async fn test_late_arrival_is_slotted_by_completion_time() {
        let store = HistoryStore::new();
        let older = result_with(ContentKind::Text, 0.9).await;
        let newer = result_with(ContentKind::Text, 0.5).await;
        store.append(newer.clone()).await;
        store.append(older.clone()).await;

        let listed = store.list(&HistoryQuery::new()).await;
        assert!(listed[0].completed_at() >= listed[1].completed_at());
        if newer.completed_at() > older.completed_at() {
            assert_eq!(listed[0].id(), newer.id());
        }
    }

    #[tokio::test]
    async fn test_filters_and_limit() {
        let store = HistoryStore::new();
        store.append(result_with(ContentKind::Text, 0.9).await).await;
        store.append(result_with(ContentKind::Image, 0.1).await).await;
        store.append(result_with(ContentKind::Text, 0.2).await).await;
        store.append(result_with(ContentKind::Audio, 0.5).await).await;

        let texts = store.list(&HistoryQuery::new().kind(ContentKind::Text)).await;
        assert_eq!(texts.len(), 2);

        let fakes = store.list(&HistoryQuery::new().verdict(Verdict::Fake)).await;
        assert_eq!(fakes.len(), 2);
        assert!(fakes.iter().all(|r| r.verdict() == Verdict::Fake));

        let fake_text = HistoryQuery::new().kind(ContentKind::Text).verdict(Verdict::Fake);
        assert_eq!(store.list(&fake_text).await.len(), 1);

        assert_eq!(store.list(&HistoryQuery::new().limit(3)).await.len(), 3);
        assert!(store.list(&HistoryQuery::new().limit(0)).await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_track_every_append() {
        let store = HistoryStore::new();
        assert_eq!(store.stats().await, HistoryStats::default());
        for s in [0.9, 0.1, 0.5, 0.95] {
            store.append(result_with(ContentKind::Text, s).await).await;
            let stats = store.stats().await;
            assert!(stats.is_consistent());
            assert_eq!(stats, HistoryStats::from_results(&store.list(&HistoryQuery::new()).await));
        }
        let stats = store.stats().await;
        assert_eq!(
            (stats.total, stats.real_count, stats.fake_count, stats.uncertain_count),
            (4, 2, 1, 1)
        );
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = HistoryStore::with_capacity(2);
        let a = result_with(ContentKind::Text, 0.9).await;
        let b = result_with(ContentKind::Text, 0.1).await;
        let c = result_with(ContentKind::Text, 0.5).await;
        store.append(a.clone()).await;
        store.append(b.clone()).await;
        store.append(c.clone()).await;

        let ids: Vec<_> = store.list(&HistoryQuery::new()).await.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains(&a.id()));
        let stats = store.stats().await;
        assert_eq!((stats.total, stats.real_count), (2, 0));
        assert!(stats.is_consistent());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let store = HistoryStore::new();
        store.append(result_with(ContentKind::Text, 0.9).await).await;
        store.append(result_with(ContentKind::Video, 0.3).await).await;
        store.save_snapshot(&path).await.unwrap();
        assert!(!temp_path_for(&path).exists());

        let loaded = HistoryStore::load_snapshot(&path, None, &ScoringPolicy::default())
            .await
            .unwrap();
        assert_eq!(
            loaded.list(&HistoryQuery::new()).await,
            store.list(&HistoryQuery::new()).await
        );
        assert_eq!(loaded.stats().await, store.stats().await);
    }

    #[tokio::test]
    async fn test_snapshot_version_mismatch_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"version": 99, "results": []}"#).unwrap();
        let loaded = HistoryStore::load_snapshot(&path, Some(10), &ScoringPolicy::default())
            .await
            .unwrap();
        assert!(loaded.is_empty().await);
        assert_eq!(loaded.capacity(), Some(10));

        let missing = HistoryStore::load_snapshot(
            &dir.path().join("nope.json"),
            None,
            &ScoringPolicy::default(),
        )
        .await
        .unwrap();
        assert!(missing.is_empty().await);
    }

    #[tokio::test]
    async fn test_truncated_snapshot_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"version":1,"results":[{"id""#).unwrap();

        let loaded = HistoryStore::load_snapshot(&path, None, &ScoringPolicy::default())
            .await
            .unwrap();
        assert!(loaded.is_empty().await);
        assert_eq!(loaded.stats().await, HistoryStats::default());
    }

    #[tokio::test]
    async fn test_snapshot_drops_tampered_and_duplicate_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let genuine = result_with(ContentKind::Text, 0.95).await;
        let other = result_with(ContentKind::Text, 0.2).await;
        let mut tampered = serde_json::to_value(&other).unwrap();
        tampered["verdict"] = serde_json::json!("real");

        let snapshot = serde_json::json!({
            "version": SNAPSHOT_VERSION,
            "results": [genuine, genuine, tampered],
        });
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let loaded = HistoryStore::load_snapshot(&path, None, &ScoringPolicy::default())
            .await
            .unwrap();
        let listed = loaded.list(&HistoryQuery::new()).await;
        assert_eq!(listed, vec![genuine]);
        let stats = loaded.stats().await;
        assert_eq!((stats.total, stats.real_count), (1, 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_leave_a_complete_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = Arc::new(HistoryStore::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let path = path.clone();
            handles.push(tokio::spawn(async move {
                let s = if i % 2 == 0 { 0.9 } else { 0.1 };
                store.append(result_with(ContentKind::Text, s).await).await;
                store.save_snapshot(&path).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let snapshot: HistorySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(snapshot.results.len(), 16);

        let loaded = HistoryStore::load_snapshot(&path, None, &ScoringPolicy::default())
            .await
            .unwrap();
        assert_eq!(loaded.stats().await, store.stats().await);
    }
}

//! Strategy registry: content kind → active detection strategy
//!
//! Exactly one strategy is bound per kind. The orchestrator only ever asks
//! for `resolve(kind)`; new scorers are wired in here.

use crate::content::ContentKind;
use crate::detection::{DetectionStrategy, MediaMetadataStrategy, SeededMockStrategy, TextHeuristicStrategy};
use crate::{VeracityError, VeracityResult};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<ContentKind, Arc<dyn DetectionStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded mock strategy for every kind
    pub fn with_mocks(seed: u64) -> Self {
        let mut registry = Self::new();
        for kind in ContentKind::ALL {
            registry.strategies.insert(kind, Arc::new(SeededMockStrategy::new(kind, seed)));
        }
        registry
    }

    /// Lexical heuristics for text, handle metadata for media
    pub fn with_heuristics() -> Self {
        let mut registry = Self::new();
        registry
            .strategies
            .insert(ContentKind::Text, Arc::new(TextHeuristicStrategy::new()));
        let media: Arc<dyn DetectionStrategy> = Arc::new(MediaMetadataStrategy::new());
        for kind in [ContentKind::Image, ContentKind::Audio, ContentKind::Video] {
            registry.strategies.insert(kind, Arc::clone(&media));
        }
        registry
    }

    /// Bind `strategy` to `kind`, returning the strategy it replaced
    pub fn register(
        &mut self,
        kind: ContentKind,
        strategy: Arc<dyn DetectionStrategy>,
    ) -> VeracityResult<Option<Arc<dyn DetectionStrategy>>> {
        if !strategy.supports(kind) {
            return Err(VeracityError::Config(format!(
                "strategy {} does not support {} content",
                strategy.name(),
                kind
            )));
        }
        tracing::debug!("Registered {} v{} for {}", strategy.name(), strategy.version(), kind);
        Ok(self.strategies.insert(kind, strategy))
    }

    pub fn unregister(&mut self, kind: ContentKind) -> Option<Arc<dyn DetectionStrategy>> {
        self.strategies.remove(&kind)
    }

    pub fn resolve(&self, kind: ContentKind) -> VeracityResult<Arc<dyn DetectionStrategy>> {
        self.strategies
            .get(&kind)
            .cloned()
            .ok_or(VeracityError::NoStrategyRegistered(kind))
    }

    /// Kinds with a bound strategy, in declaration order
    pub fn registered_kinds(&self) -> Vec<ContentKind> {
        ContentKind::ALL
            .into_iter()
            .filter(|k| self.strategies.contains_key(k))
            .collect()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in self.registered_kinds() {
            if let Some(s) = self.strategies.get(&kind) {
                map.entry(&kind.as_str(), &s.name());
            }
        }
        map.finish()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::domain::{CostParameters, MarketContext};
use super::error::ValidationError;
use super::thresholds::{compute_thresholds, ThresholdSet};

#[derive(Debug)]
struct CachedThresholds {
    costs: CostParameters,
    market: MarketContext,
    thresholds: Arc<ThresholdSet>,
}

/// Last computed threshold set per landlord or listing context.
///
/// An entry is replaced wholesale when its inputs change; readers holding the previous
/// `Arc` keep a consistent set. At most `max_contexts` entries are held. Adding a new
/// context to a full cache evicts an arbitrary existing one, which is recomputed on demand.
#[derive(Debug)]
pub struct ThresholdCache {
    entries: RwLock<HashMap<String, CachedThresholds>>,
    max_contexts: usize,
}

impl Default for ThresholdCache {
    fn default() -> Self {
        Self::bounded(Self::DEFAULT_MAX_CONTEXTS)
    }
}

impl ThresholdCache {
    pub const DEFAULT_MAX_CONTEXTS: usize = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(max_contexts: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_contexts: max_contexts.max(1),
        }
    }

    pub fn get_or_compute(
        &self,
        context: &str,
        costs: &CostParameters,
        market: &MarketContext,
    ) -> Result<Arc<ThresholdSet>, ValidationError> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(context) {
                if cached.costs == *costs && cached.market == *market {
                    return Ok(Arc::clone(&cached.thresholds));
                }
            }
        }

        let thresholds = Arc::new(compute_thresholds(costs, Some(market))?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(context) && entries.len() >= self.max_contexts {
            if let Some(evicted) = entries.keys().next().cloned() {
                entries.remove(&evicted);
                tracing::debug!(evicted = %evicted, "threshold cache full; context evicted");
            }
        }
        entries.insert(
            context.to_string(),
            CachedThresholds {
                costs: *costs,
                market: *market,
                thresholds: Arc::clone(&thresholds),
            },
        );
        tracing::debug!(context, "threshold cache entry replaced");
        Ok(thresholds)
    }

    /// Drop a context so its next request recomputes.
    pub fn invalidate(&self, context: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(context);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

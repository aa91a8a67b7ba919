//! Slug allocation.
//!
//! [`SlugAllocator`] draws random candidates and skips those the metadata
//! store already knows. The check is advisory: two allocators can pick the
//! same free candidate at once, and the store's conditional insert decides
//! which of them wins.

use std::sync::Arc;

use pagedrop_meta::MetadataStore;
use pagedrop_types::{Slug, MAX_SLUG_LEN, SLUG_LEN};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PublishError, PublishResult};

/// Default bound on candidates tried per allocation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Slug shape and retry budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Characters per slug.
    pub slug_len: usize,
    /// Candidates tried before giving up with `AllocationExhausted`.
    pub max_attempts: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            slug_len: SLUG_LEN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Produces slug candidates.
pub trait SlugSource: Send + Sync {
    fn next_candidate(&self, len: usize) -> Slug;
}

/// Uniform random candidates from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSlugSource;

impl SlugSource for RandomSlugSource {
    fn next_candidate(&self, len: usize) -> Slug {
        Slug::generate(&mut rand::thread_rng(), len)
    }
}

/// Picks slugs not yet present in the metadata store.
#[derive(Clone)]
pub struct SlugAllocator {
    meta: Arc<dyn MetadataStore>,
    source: Arc<dyn SlugSource>,
    config: AllocatorConfig,
}

impl SlugAllocator {
    pub fn new(meta: Arc<dyn MetadataStore>, config: AllocatorConfig) -> Self {
        Self::with_source(meta, Arc::new(RandomSlugSource), config)
    }

    /// A `slug_len` outside `1..=MAX_SLUG_LEN` is clamped into that range;
    /// longer or empty slugs could be stored but never looked up again.
    pub fn with_source(
        meta: Arc<dyn MetadataStore>,
        source: Arc<dyn SlugSource>,
        mut config: AllocatorConfig,
    ) -> Self {
        let slug_len = config.slug_len.clamp(1, MAX_SLUG_LEN);
        if slug_len != config.slug_len {
            warn!(requested = config.slug_len, used = slug_len, "slug length out of range");
            config.slug_len = slug_len;
        }
        Self {
            meta,
            source,
            config,
        }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Return a slug the metadata store did not know at lookup time.
    ///
    /// A failed lookup does not consume the budget: the candidate is returned
    /// as-is and the conditional insert will reject it if it was taken.
    pub async fn allocate(&self) -> PublishResult<Slug> {
        for attempt in 1..=self.config.max_attempts {
            let candidate = self.source.next_candidate(self.config.slug_len);
            match self.meta.slug_exists(&candidate).await {
                Ok(false) => {
                    debug!(slug = %candidate, attempt, "slug allocated");
                    return Ok(candidate);
                }
                Ok(true) => {
                    debug!(slug = %candidate, attempt, "slug candidate collided");
                }
                Err(e) => {
                    warn!(slug = %candidate, error = %e, "slug pre-check failed; deferring to insert");
                    return Ok(candidate);
                }
            }
        }
        warn!(attempts = self.config.max_attempts, "slug allocation exhausted");
        Err(PublishError::AllocationExhausted {
            attempts: self.config.max_attempts,
        })
    }
}

impl std::fmt::Debug for SlugAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugAllocator")
            .field("config", &self.config)
            .finish()
    }
}

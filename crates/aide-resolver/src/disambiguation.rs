//! Per-owner, per-domain disambiguation contexts.
//!
//! When a resolution is ambiguous the offered candidates are kept here so
//! the user's numeric reply can be mapped back to a record id. Each owner
//! holds at most one live context per domain; a newer prompt in the same
//! domain replaces the older one. Entries expire after a TTL and are purged
//! lazily on access.

use aide_core::domain::{Domain, EntityReference};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Candidates offered to one owner in one domain, in the order they were
/// numbered.
#[derive(Debug, Clone, PartialEq)]
pub struct DisambiguationContext {
    pub domain: Domain,
    pub candidates: Vec<EntityReference>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of mapping a 1-based index against the live context.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The index named a stored candidate; the context has been consumed.
    Picked(EntityReference),
    /// A context exists but the index does not fit it. The context is kept.
    OutOfRange { len: usize },
    /// No live context for this owner and domain.
    NoContext,
}

type ContextKey = (String, Domain);

fn key(owner_id: &str, domain: Domain) -> ContextKey {
    (owner_id.to_string(), domain)
}

pub struct DisambiguationStore {
    entries: Mutex<HashMap<ContextKey, DisambiguationContext>>,
    ttl: Duration,
    max_options: usize,
}

impl DisambiguationStore {
    pub fn new(ttl: Duration, max_options: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_options: max_options.max(1),
        }
    }

    fn is_live(&self, ctx: &DisambiguationContext, now: DateTime<Utc>) -> bool {
        now - ctx.created_at < self.ttl
    }

    /// Remember the candidates offered to `owner_id`, truncated to
    /// `max_options`, replacing any earlier context in the same domain.
    pub async fn store(
        &self,
        owner_id: &str,
        domain: Domain,
        mut candidates: Vec<EntityReference>,
        now: DateTime<Utc>,
    ) {
        candidates.truncate(self.max_options);
        let ctx = DisambiguationContext {
            domain,
            candidates,
            created_at: now,
        };
        self.entries.lock().await.insert(key(owner_id, domain), ctx);
    }

    /// The live context for an owner in `domain`, if any.
    pub async fn get(
        &self,
        owner_id: &str,
        domain: Domain,
        now: DateTime<Utc>,
    ) -> Option<DisambiguationContext> {
        let key = key(owner_id, domain);
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(ctx) if self.is_live(ctx, now) => Some(ctx.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Check and consume under one lock, so two replies from the same owner
    /// cannot both pick from the same context.
    pub async fn take_selection(
        &self,
        owner_id: &str,
        domain: Domain,
        index: usize,
        now: DateTime<Utc>,
    ) -> Selection {
        let key = key(owner_id, domain);
        let mut entries = self.entries.lock().await;
        let Some(ctx) = entries.get(&key) else {
            return Selection::NoContext;
        };
        if !self.is_live(ctx, now) {
            debug!("resolver: {} disambiguation context for {owner_id} expired", domain.as_str());
            entries.remove(&key);
            return Selection::NoContext;
        }

        let len = ctx.candidates.len();
        if index == 0 || index > len {
            return Selection::OutOfRange { len };
        }
        match entries.remove(&key) {
            Some(mut ctx) => Selection::Picked(ctx.candidates.swap_remove(index - 1)),
            None => Selection::NoContext,
        }
    }

    pub async fn clear(&self, owner_id: &str, domain: Domain) {
        self.entries.lock().await.remove(&key(owner_id, domain));
    }

    /// Drop every expired context; returns how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, ctx| now - ctx.created_at < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

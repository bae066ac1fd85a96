//! Entity resolution: free text to zero, one or many candidate records.

use crate::disambiguation::{DisambiguationStore, Selection};
use crate::format::format_disambiguation;
use crate::selection::parse_selection;
use crate::similarity::{normalize, search, MatchReason};
use crate::timerange::extract_time_range;
use aide_core::config::ResolverConfig;
use aide_core::domain::{Domain, Entity, EntityReference};
use aide_core::error::AideError;
use aide_core::message::Language;
use aide_core::window::TimeRange;
use aide_memory::Store;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where candidate pools come from. Pools are read fresh on every call.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Every record of `domain` the owner has, narrowed by `range` when the
    /// domain has a date column.
    async fn candidates(
        &self,
        owner_id: &str,
        domain: Domain,
        range: Option<&TimeRange>,
    ) -> Result<Vec<Entity>, AideError>;

    async fn timezone(&self, owner_id: &str) -> Result<Tz, AideError>;
}

#[async_trait]
impl CandidateSource for Store {
    async fn candidates(
        &self,
        owner_id: &str,
        domain: Domain,
        range: Option<&TimeRange>,
    ) -> Result<Vec<Entity>, AideError> {
        self.fetch_candidates(owner_id, domain, range).await
    }

    async fn timezone(&self, owner_id: &str) -> Result<Tz, AideError> {
        self.owner_timezone(owner_id).await
    }
}

/// Fields scored per domain.
pub fn search_fields(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Task => &["text", "category"],
        Domain::Contact => &["name", "email", "phone"],
        Domain::List => &["list_name"],
        Domain::CalendarEvent => &["summary", "description"],
        Domain::Email => &["subject", "from", "to"],
    }
}

/// Domains whose display name can short-circuit on an exact match.
fn has_display_name(domain: Domain) -> bool {
    matches!(domain, Domain::Task | Domain::List)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionCandidate {
    pub entity: Entity,
    pub score: f64,
    pub reason: MatchReason,
}

impl ResolutionCandidate {
    pub fn reference(&self) -> EntityReference {
        self.entity.reference()
    }
}

/// Ranked candidates, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub candidates: Vec<ResolutionCandidate>,
    pub disambiguation_required: bool,
}

impl ResolutionResult {
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            disambiguation_required: false,
        }
    }

    /// The user must choose when there is more than one candidate and the
    /// top two scores are closer than `gap`.
    pub fn from_ranked(candidates: Vec<ResolutionCandidate>, gap: f64) -> Self {
        let disambiguation_required = match candidates.as_slice() {
            [first, second, ..] => first.score - second.score < gap,
            _ => false,
        };
        Self {
            candidates,
            disambiguation_required,
        }
    }

    pub fn top(&self) -> Option<&ResolutionCandidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// What a caller acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NotFound,
    Resolved(ResolutionCandidate),
    /// Several plausible records; `prompt` is ready to send to the user.
    Ambiguous {
        candidates: Vec<ResolutionCandidate>,
        prompt: String,
    },
    /// A numbered reply picked a candidate from an earlier prompt.
    Selected(EntityReference),
}

impl Resolution {
    /// Id of the record to act on, when there is exactly one.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Resolved(c) => Some(c.entity.id()),
            Self::Selected(r) => r.id.as_deref(),
            Self::NotFound | Self::Ambiguous { .. } => None,
        }
    }
}

pub struct EntityResolver {
    source: Arc<dyn CandidateSource>,
    contexts: DisambiguationStore,
    threshold: f64,
    gap: f64,
    max_options: usize,
}

impl EntityResolver {
    pub fn new(source: Arc<dyn CandidateSource>, config: &ResolverConfig) -> Self {
        Self {
            source,
            contexts: DisambiguationStore::new(
                Duration::minutes(config.disambiguation_ttl_minutes),
                config.max_options,
            ),
            threshold: config.threshold,
            gap: config.ambiguity_gap,
            max_options: config.max_options,
        }
    }

    pub fn contexts(&self) -> &DisambiguationStore {
        &self.contexts
    }

    /// Rank the owner's records of `domain` against `query`.
    pub async fn resolve(
        &self,
        query: &str,
        owner_id: &str,
        domain: Domain,
        now: DateTime<Utc>,
    ) -> Result<ResolutionResult, AideError> {
        let (range, text) = if domain == Domain::CalendarEvent {
            let tz = self.source.timezone(owner_id).await?;
            extract_time_range(query, now, tz)
        } else {
            (None, normalize(query))
        };

        if text.is_empty() && range.is_none() {
            return Ok(ResolutionResult::empty());
        }

        let pool = self
            .source
            .candidates(owner_id, domain, range.as_ref())
            .await?;
        debug!(
            "resolver: {} {domain} candidates for {owner_id}",
            pool.len()
        );

        // Only a time range was given: everything inside it is equally likely.
        if text.is_empty() {
            let ranked = pool
                .into_iter()
                .map(|entity| ResolutionCandidate {
                    entity,
                    score: 1.0,
                    reason: MatchReason::InRange,
                })
                .collect();
            return Ok(ResolutionResult::from_ranked(ranked, self.gap));
        }

        if has_display_name(domain) {
            if let Some(exact) = exact_match(&text, &pool) {
                return Ok(ResolutionResult {
                    candidates: vec![exact],
                    disambiguation_required: false,
                });
            }
        }

        let ranked = search(&text, &pool, search_fields(domain), self.threshold)
            .into_iter()
            .map(|m| ResolutionCandidate {
                entity: m.item.clone(),
                score: m.score,
                reason: m.reason,
            })
            .collect();
        Ok(ResolutionResult::from_ranked(ranked, self.gap))
    }

    /// Resolve and, when ambiguous, remember the offered candidates and
    /// build the prompt.
    pub async fn resolve_one_or_ask(
        &self,
        query: &str,
        owner_id: &str,
        domain: Domain,
        language: Language,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AideError> {
        let mut result = self.resolve(query, owner_id, domain, now).await?;
        if result.is_empty() {
            return Ok(Resolution::NotFound);
        }
        if !result.disambiguation_required {
            return Ok(Resolution::Resolved(result.candidates.swap_remove(0)));
        }

        result.candidates.truncate(self.max_options);
        let references = result.candidates.iter().map(|c| c.reference()).collect();
        self.contexts
            .store(owner_id, domain, references, now)
            .await;

        let tz = self.source.timezone(owner_id).await?;
        let entities: Vec<Entity> = result.candidates.iter().map(|c| c.entity.clone()).collect();
        let prompt = format_disambiguation(domain, &entities, language, tz);
        info!(
            "resolver: {} candidates for '{query}' need a choice from {owner_id}",
            result.candidates.len()
        );
        Ok(Resolution::Ambiguous {
            candidates: result.candidates,
            prompt,
        })
    }

    /// Map a numbered reply onto the live context before treating `query`
    /// as new text. `selected_index` is 1-based; without one, a query that
    /// reads as a selection ("2", "the second one") is tried instead.
    pub async fn resolve_with_disambiguation_handling(
        &self,
        query: &str,
        owner_id: &str,
        domain: Domain,
        selected_index: Option<usize>,
        language: Language,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AideError> {
        if let Some(index) = selected_index.or_else(|| parse_selection(query)) {
            match self
                .contexts
                .take_selection(owner_id, domain, index, now)
                .await
            {
                Selection::Picked(reference) => {
                    info!("resolver: {owner_id} picked option {index} ({})", reference.label);
                    return Ok(Resolution::Selected(reference));
                }
                Selection::OutOfRange { len } => {
                    warn!(
                        "resolver: selection {index} is outside 1..={len} for {owner_id}, resolving as a new query"
                    );
                }
                Selection::NoContext => {}
            }
        }

        self.resolve_one_or_ask(query, owner_id, domain, language, now)
            .await
    }
}

/// One label equal to the query, and no other label containing it.
fn exact_match(text: &str, pool: &[Entity]) -> Option<ResolutionCandidate> {
    let labels: Vec<String> = pool.iter().map(|e| normalize(e.label())).collect();
    let mut exact = labels.iter().enumerate().filter(|(_, l)| l.as_str() == text);
    let (index, _) = exact.next()?;
    if exact.next().is_some() {
        return None;
    }
    let shadowed = labels
        .iter()
        .enumerate()
        .any(|(i, l)| i != index && l.contains(text));
    if shadowed {
        return None;
    }
    Some(ResolutionCandidate {
        entity: pool[index].clone(),
        score: 1.0,
        reason: MatchReason::Exact,
    })
}

#[cfg(test)]
mod tests;

//! # aide-resolver
//!
//! Turns free-text references ("the milk task", "standup tomorrow") into
//! records, and asks the user to choose when several are plausible.

pub mod disambiguation;
pub mod format;
pub mod resolver;
pub mod selection;
pub mod similarity;
pub mod timerange;

pub use disambiguation::{DisambiguationContext, DisambiguationStore, Selection};
pub use format::format_disambiguation;
pub use resolver::{
    CandidateSource, EntityResolver, Resolution, ResolutionCandidate, ResolutionResult,
};
pub use selection::parse_selection;
pub use similarity::{search, MatchReason, Searchable};

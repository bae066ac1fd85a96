use super::*;
use aide_core::domain::CalendarEvent;
use aide_memory::NewTask;
use chrono::TimeZone;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store-backed source that counts pool reads.
struct CountingSource {
    store: Store,
    reads: AtomicUsize,
}

#[async_trait]
impl CandidateSource for CountingSource {
    async fn candidates(
        &self,
        owner_id: &str,
        domain: Domain,
        range: Option<&TimeRange>,
    ) -> Result<Vec<Entity>, AideError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_candidates(owner_id, domain, range).await
    }

    async fn timezone(&self, owner_id: &str) -> Result<Tz, AideError> {
        self.store.owner_timezone(owner_id).await
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap()
}

async fn setup() -> (Arc<CountingSource>, EntityResolver) {
    let source = Arc::new(CountingSource {
        store: Store::in_memory().await.unwrap(),
        reads: AtomicUsize::new(0),
    });
    let resolver = EntityResolver::new(source.clone(), &ResolverConfig::default());
    (source, resolver)
}

async fn add_task(source: &CountingSource, owner: &str, text: &str) -> String {
    source
        .store
        .create_task(owner, NewTask::new(text), now())
        .await
        .unwrap()
        .id
}

fn candidate(id: &str, score: f64) -> ResolutionCandidate {
    ResolutionCandidate {
        entity: Entity::Task(aide_core::domain::Task {
            id: id.into(),
            owner_id: "u1".into(),
            text: id.into(),
            category: None,
            due_date: None,
            reminder: None,
            reminder_recurrence: None,
            next_reminder_at: None,
            completed: false,
        }),
        score,
        reason: MatchReason::Fuzzy,
    }
}

#[test]
fn test_gap_decides_disambiguation() {
    let close = ResolutionResult::from_ranked(vec![candidate("a", 0.91), candidate("b", 0.80)], 0.15);
    assert!(close.disambiguation_required);

    let clear = ResolutionResult::from_ranked(vec![candidate("a", 0.91), candidate("b", 0.70)], 0.15);
    assert!(!clear.disambiguation_required);

    let single = ResolutionResult::from_ranked(vec![candidate("a", 0.6)], 0.15);
    assert!(!single.disambiguation_required);
    assert!(!ResolutionResult::empty().disambiguation_required);
}

#[tokio::test]
async fn test_buy_milk_then_reply_one() {
    let (source, resolver) = setup().await;
    let milk = add_task(&source, "u1", "Buy milk").await;
    let eggs = add_task(&source, "u1", "Buy milk and eggs").await;
    add_task(&source, "u1", "Walk the dog").await;

    let result = resolver.resolve("buy milk", "u1", Domain::Task, now()).await.unwrap();
    let ids: Vec<&str> = result.candidates.iter().map(|c| c.entity.id()).collect();
    assert_eq!(ids, vec![milk.as_str(), eggs.as_str()]);
    assert!(result.disambiguation_required);

    let asked = resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();
    let Resolution::Ambiguous { candidates, prompt } = asked else {
        panic!("expected an ambiguous resolution");
    };
    assert_eq!(candidates.len(), 2);
    assert!(prompt.contains("1. Buy milk\n2. Buy milk and eggs"));

    let reads_before = source.reads.load(Ordering::SeqCst);
    let picked = resolver
        .resolve_with_disambiguation_handling("1", "u1", Domain::Task, None, Language::English, now())
        .await
        .unwrap();
    assert_eq!(picked.entity_id(), Some(milk.as_str()));
    assert!(matches!(picked, Resolution::Selected(_)));
    assert_eq!(source.reads.load(Ordering::SeqCst), reads_before);
    assert!(resolver.contexts().is_empty().await);
}

#[tokio::test]
async fn test_list_prompt_does_not_replace_pending_task_prompt() {
    let (source, resolver) = setup().await;
    let milk = add_task(&source, "u1", "Buy milk").await;
    add_task(&source, "u1", "Buy milk and eggs").await;
    source.store.create_list("u1", "Groceries", vec![], true).await.unwrap();
    source.store.create_list("u1", "Groceries", vec![], false).await.unwrap();

    let tasks = resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();
    assert!(matches!(tasks, Resolution::Ambiguous { .. }));
    let lists = resolver
        .resolve_one_or_ask("groceries", "u1", Domain::List, Language::English, now())
        .await
        .unwrap();
    assert!(matches!(lists, Resolution::Ambiguous { .. }));

    let reads_before = source.reads.load(Ordering::SeqCst);
    let picked = resolver
        .resolve_with_disambiguation_handling("1", "u1", Domain::Task, Some(1), Language::English, now())
        .await
        .unwrap();
    assert_eq!(picked.entity_id(), Some(milk.as_str()));
    assert_eq!(source.reads.load(Ordering::SeqCst), reads_before);
    assert_eq!(resolver.contexts().len().await, 1);
}

#[tokio::test]
async fn test_explicit_index_wins_over_text() {
    let (source, resolver) = setup().await;
    add_task(&source, "u1", "Buy milk").await;
    let eggs = add_task(&source, "u1", "Buy milk and eggs").await;
    resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();

    let picked = resolver
        .resolve_with_disambiguation_handling(
            "whatever",
            "u1",
            Domain::Task,
            Some(2),
            Language::English,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(picked.entity_id(), Some(eggs.as_str()));
}

#[tokio::test]
async fn test_ordinal_reply_picks_candidate() {
    let (source, resolver) = setup().await;
    add_task(&source, "u1", "Buy milk").await;
    let eggs = add_task(&source, "u1", "Buy milk and eggs").await;
    resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::Hebrew, now())
        .await
        .unwrap();

    let picked = resolver
        .resolve_with_disambiguation_handling(
            "the second one",
            "u1",
            Domain::Task,
            None,
            Language::English,
            now(),
        )
        .await
        .unwrap();
    assert_eq!(picked.entity_id(), Some(eggs.as_str()));
}

#[tokio::test]
async fn test_out_of_range_selection_resolves_fresh() {
    let (source, resolver) = setup().await;
    add_task(&source, "u1", "Buy milk").await;
    add_task(&source, "u1", "Buy milk and eggs").await;
    resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();

    let reads_before = source.reads.load(Ordering::SeqCst);
    let again = resolver
        .resolve_with_disambiguation_handling(
            "buy milk",
            "u1",
            Domain::Task,
            Some(7),
            Language::English,
            now(),
        )
        .await
        .unwrap();
    assert!(matches!(again, Resolution::Ambiguous { .. }));
    assert_eq!(source.reads.load(Ordering::SeqCst), reads_before + 1);
}

#[tokio::test]
async fn test_expired_context_treats_reply_as_text() {
    let (source, resolver) = setup().await;
    add_task(&source, "u1", "Buy milk").await;
    add_task(&source, "u1", "Buy milk and eggs").await;
    resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();

    let later = now() + Duration::minutes(31);
    let reply = resolver
        .resolve_with_disambiguation_handling("1", "u1", Domain::Task, None, Language::English, later)
        .await
        .unwrap();
    assert_eq!(reply, Resolution::NotFound);
}

#[tokio::test]
async fn test_single_exact_label_short_circuits() {
    let (source, resolver) = setup().await;
    let mom = add_task(&source, "u1", "Call mom").await;
    add_task(&source, "u1", "Call dad").await;

    let result = resolver.resolve("CALL  MOM", "u1", Domain::Task, now()).await.unwrap();
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.candidates[0].entity.id(), mom);
    assert_eq!(result.candidates[0].reason, MatchReason::Exact);
    assert!(!result.disambiguation_required);
}

#[tokio::test]
async fn test_duplicate_exact_titles_need_a_choice() {
    let (source, resolver) = setup().await;
    source.store.create_list("u1", "Groceries", vec![], true).await.unwrap();
    source.store.create_list("u1", "Groceries", vec![], false).await.unwrap();
    source.store.create_list("u1", "Work", vec![], false).await.unwrap();

    let result = resolver.resolve("groceries", "u1", Domain::List, now()).await.unwrap();
    assert_eq!(result.candidates.len(), 2);
    assert!(result.candidates.iter().all(|c| c.score == 1.0));
    assert!(result.disambiguation_required);

    let work = resolver.resolve("work", "u1", Domain::List, now()).await.unwrap();
    assert_eq!(work.candidates.len(), 1);
    assert!(!work.disambiguation_required);
}

#[tokio::test]
async fn test_candidates_are_owner_scoped() {
    let (source, resolver) = setup().await;
    add_task(&source, "u2", "Buy milk").await;

    let result = resolver.resolve("buy milk", "u1", Domain::Task, now()).await.unwrap();
    assert!(result.is_empty());
    let asked = resolver
        .resolve_one_or_ask("buy milk", "u1", Domain::Task, Language::English, now())
        .await
        .unwrap();
    assert_eq!(asked, Resolution::NotFound);
}

#[tokio::test]
async fn test_contact_matches_on_email() {
    let (source, resolver) = setup().await;
    let dana = source
        .store
        .create_contact("u1", "Dana Levi", Some("dana@example.com"), None)
        .await
        .unwrap();
    source
        .store
        .create_contact("u1", "Yossi Cohen", Some("yossi@example.com"), None)
        .await
        .unwrap();

    let result = resolver
        .resolve("dana@example.com", "u1", Domain::Contact, now())
        .await
        .unwrap();
    assert_eq!(result.top().map(|c| c.entity.id()), Some(dana.id.as_str()));
    assert!(!result.disambiguation_required);
}

async fn add_event(source: &CountingSource, id: &str, summary: &str, start: DateTime<Utc>) {
    source
        .store
        .upsert_event(&CalendarEvent {
            id: id.into(),
            owner_id: "u1".into(),
            summary: summary.into(),
            description: None,
            start_time: start,
            end_time: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_calendar_query_narrows_by_time_words() {
    let (source, resolver) = setup().await;
    add_event(&source, "e1", "Standup", Utc.with_ymd_and_hms(2025, 1, 9, 9, 0, 0).unwrap()).await;
    add_event(&source, "e2", "Standup", Utc.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap()).await;

    let all = resolver.resolve("standup", "u1", Domain::CalendarEvent, now()).await.unwrap();
    assert_eq!(all.candidates.len(), 2);
    assert!(all.disambiguation_required);

    let tomorrow = resolver
        .resolve("standup tomorrow", "u1", Domain::CalendarEvent, now())
        .await
        .unwrap();
    assert_eq!(tomorrow.candidates.len(), 1);
    assert_eq!(tomorrow.candidates[0].entity.id(), "e1");

    let next_week = resolver
        .resolve("standup בשבוע הבא", "u1", Domain::CalendarEvent, now())
        .await
        .unwrap();
    assert_eq!(next_week.candidates.len(), 1);
    assert_eq!(next_week.candidates[0].entity.id(), "e2");
}

#[tokio::test]
async fn test_time_words_alone_offer_the_whole_range() {
    let (source, resolver) = setup().await;
    add_event(&source, "e1", "Standup", Utc.with_ymd_and_hms(2025, 1, 9, 9, 0, 0).unwrap()).await;
    add_event(&source, "e2", "Dentist", Utc.with_ymd_and_hms(2025, 1, 9, 15, 0, 0).unwrap()).await;
    add_event(&source, "e3", "Review", Utc.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap()).await;

    let result = resolver.resolve("tomorrow", "u1", Domain::CalendarEvent, now()).await.unwrap();
    let ids: Vec<&str> = result.candidates.iter().map(|c| c.entity.id()).collect();
    assert_eq!(ids, vec!["e1", "e2"]);
    assert!(result.candidates.iter().all(|c| c.reason == MatchReason::InRange));
    assert!(result.disambiguation_required);
}

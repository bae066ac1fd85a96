use super::*;
use aide_core::window::Window;
use chrono::TimeZone;
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 9, 30, 0).unwrap()
}

fn patch(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_empty_filter_is_owner_only() {
    let compiled = compile_where(Domain::Task, "u1", &FilterSpec::default(), now(), Tz::UTC);
    assert_eq!(compiled.sql, "owner_id = ?1");
    assert_eq!(compiled.params, vec![QueryParam::Text("u1".into())]);
    assert!(compiled.is_owner_only());
}

#[test]
fn test_owner_condition_always_first() {
    let filter = FilterSpec::from_json(&json!({ "q": "milk", "completed": false }));
    let compiled = compile_where(Domain::Task, "u1", &filter, now(), Tz::UTC);
    assert!(compiled.sql.starts_with("owner_id = ?1 AND "));
    assert_eq!(compiled.params[0], QueryParam::Text("u1".into()));
    assert!(!compiled.is_owner_only());
}

#[test]
fn test_window_today_matches_explicit_range() {
    let range = Window::Today.resolve(now(), Tz::UTC);
    let by_window = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![FilterClause::Window(Window::Today)]),
        now(),
        Tz::UTC,
    );
    let by_range = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![
            FilterClause::DueDateFrom(range.from.unwrap()),
            FilterClause::DueDateTo(range.to),
        ]),
        now(),
        Tz::UTC,
    );
    assert_eq!(by_window, by_range);
    assert_eq!(by_window.sql, "owner_id = ?1 AND due_date >= ?2 AND due_date < ?3");
    assert_eq!(
        by_window.params[1..],
        [
            QueryParam::Text("2025-03-12 00:00:00".into()),
            QueryParam::Text("2025-03-13 00:00:00".into()),
        ]
    );
}

#[test]
fn test_window_respects_owner_timezone() {
    let tz: Tz = "Asia/Jerusalem".parse().unwrap();
    let compiled = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![FilterClause::Window(Window::Today)]),
        now(),
        tz,
    );
    // Local midnight in Jerusalem (UTC+2 in early March) is 22:00 UTC the day before.
    assert_eq!(compiled.params[1], QueryParam::Text("2025-03-11 22:00:00".into()));
}

#[test]
fn test_overdue_has_only_upper_bound() {
    let compiled = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![FilterClause::Window(Window::Overdue)]),
        now(),
        Tz::UTC,
    );
    assert_eq!(compiled.sql, "owner_id = ?1 AND due_date < ?2");
}

#[test]
fn test_window_on_calendar_uses_start_time() {
    let compiled = compile_where(
        Domain::CalendarEvent,
        "u1",
        &FilterSpec::new(vec![FilterClause::Window(Window::Tomorrow)]),
        now(),
        Tz::UTC,
    );
    assert_eq!(
        compiled.sql,
        "owner_id = ?1 AND start_time >= ?2 AND start_time < ?3"
    );
}

#[test]
fn test_inapplicable_clauses_are_skipped() {
    let filter = FilterSpec::new(vec![
        FilterClause::Completed(true),
        FilterClause::Window(Window::Today),
    ]);
    let compiled = compile_where(Domain::Contact, "u1", &filter, now(), Tz::UTC);
    assert!(compiled.is_owner_only());
}

#[test]
fn test_unknown_window_applies_no_date_restriction() {
    let filter = FilterSpec::from_json(&json!({ "window": "someday" }));
    assert!(filter.is_empty());
}

#[test]
fn test_category_single_and_many() {
    let one = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::from_json(&json!({ "category": "Work" })),
        now(),
        Tz::UTC,
    );
    assert_eq!(one.sql, "owner_id = ?1 AND lower(category) = lower(?2)");

    let many = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::from_json(&json!({ "category": ["Work", "Home"] })),
        now(),
        Tz::UTC,
    );
    assert_eq!(many.sql, "owner_id = ?1 AND lower(category) IN (?2, ?3)");
    assert_eq!(many.params[1], QueryParam::Text("work".into()));
}

#[test]
fn test_empty_id_list_matches_nothing() {
    let compiled = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![FilterClause::Ids(vec![])]),
        now(),
        Tz::UTC,
    );
    assert_eq!(compiled.sql, "owner_id = ?1 AND 0 = 1");
    assert!(!compiled.is_owner_only());
}

#[test]
fn test_string_boolean_is_rejected() {
    let filter = FilterSpec::from_json(&json!({ "completed": "true" }));
    assert!(filter.is_empty());
}

#[test]
fn test_unknown_filter_keys_never_reach_sql() {
    let filter = FilterSpec::from_json(&json!({
        "owner_id = owner_id OR 1": 1,
        "q": "x",
    }));
    assert_eq!(filter.clauses(), &[FilterClause::Query("x".into())]);
}

#[test]
fn test_free_text_is_parameterized() {
    let evil = "'; DROP TABLE tasks; --";
    let compiled = compile_where(
        Domain::Task,
        "u1",
        &FilterSpec::new(vec![FilterClause::Query(evil.into())]),
        now(),
        Tz::UTC,
    );
    assert!(!compiled.sql.contains("DROP"));
    assert_eq!(
        compiled.sql,
        "owner_id = ?1 AND (lower(text) LIKE ?2 ESCAPE '\\' OR lower(category) LIKE ?2 ESCAPE '\\')"
    );
    assert_eq!(
        compiled.params[1],
        QueryParam::Text(format!("%{}%", evil.to_lowercase()))
    );
}

#[test]
fn test_like_wildcards_are_escaped() {
    assert_eq!(builder::escape_like("50%_off\\"), "50\\%\\_off\\\\");
}

#[test]
fn test_set_uses_allow_listed_names_only() {
    let compiled = compile_set(
        &patch(json!({
            "text": "New text",
            "owner_id": "someone-else",
            "text = 'x', completed": true,
        })),
        columns::patch_columns(Domain::Task),
        1,
    );
    assert_eq!(compiled.sql, "text = ?2");
    assert_eq!(compiled.params, vec![QueryParam::Text("New text".into())]);
    assert_eq!(compiled.columns, vec![columns::task::TEXT]);
}

#[test]
fn test_set_null_clears_and_absent_is_untouched() {
    let compiled = compile_set(
        &patch(json!({ "category": null })),
        columns::patch_columns(Domain::Task),
        0,
    );
    assert_eq!(compiled.sql, "category = ?1");
    assert_eq!(compiled.params, vec![QueryParam::Null]);
    assert!(!compiled.touches(columns::task::TEXT));
}

#[test]
fn test_set_normalizes_timestamps_and_wraps_json() {
    let compiled = compile_set(
        &patch(json!({
            "due_date": "2025-03-14T10:00:00Z",
            "reminder_recurrence": { "type": "daily", "time": "08:00" },
        })),
        columns::patch_columns(Domain::Task),
        0,
    );
    assert_eq!(compiled.sql, "due_date = ?1, reminder_recurrence = json(?2)");
    assert_eq!(compiled.params[0], QueryParam::Text("2025-03-14 10:00:00".into()));
    assert!(matches!(compiled.params[1], QueryParam::Json(_)));
}

#[test]
fn test_set_drops_wrongly_typed_values() {
    let compiled = compile_set(
        &patch(json!({ "completed": "yes", "due_date": "not a date" })),
        columns::patch_columns(Domain::Task),
        0,
    );
    assert!(compiled.is_empty());
    assert_eq!(compiled.sql, "");
}

#[test]
fn test_email_mirror_is_read_only() {
    let compiled = compile_set(
        &patch(json!({ "subject": "changed" })),
        columns::patch_columns(Domain::Email),
        0,
    );
    assert!(compiled.is_empty());
}

#[test]
fn test_patch_columns_are_distinct_per_domain() {
    use std::collections::HashSet;

    for domain in Domain::ALL {
        let columns = columns::patch_columns(domain);
        let distinct: HashSet<Column> = columns.iter().copied().collect();
        assert_eq!(distinct.len(), columns.len(), "{domain:?}");
        assert!(!distinct.contains(&columns::OWNER_ID));
    }
}

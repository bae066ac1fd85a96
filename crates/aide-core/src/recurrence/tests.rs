use super::*;
use crate::parse_timestamp;

fn utc(s: &str) -> DateTime<Utc> {
    parse_timestamp(s).unwrap()
}

fn daily(time: &str) -> ReminderRecurrence {
    ReminderRecurrence {
        time: Some(time.into()),
        ..ReminderRecurrence::new(RecurrenceKind::Daily)
    }
}

fn weekly(days: &[u8], time: &str) -> ReminderRecurrence {
    ReminderRecurrence {
        time: Some(time.into()),
        days: Some(days.to_vec()),
        ..ReminderRecurrence::new(RecurrenceKind::Weekly)
    }
}

fn monthly(day: u8, time: &str) -> ReminderRecurrence {
    ReminderRecurrence {
        time: Some(time.into()),
        day_of_month: Some(day),
        ..ReminderRecurrence::new(RecurrenceKind::Monthly)
    }
}

fn nudge(interval: Option<&str>) -> ReminderRecurrence {
    ReminderRecurrence {
        interval: interval.map(String::from),
        ..ReminderRecurrence::new(RecurrenceKind::Nudge)
    }
}

// --- daily ---

#[test]
fn test_daily_later_today() {
    let next = calculate_next_reminder_at(&daily("09:00"), utc("2025-01-08 08:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-08 09:00:00"));
}

#[test]
fn test_daily_passed_rolls_to_tomorrow() {
    let next = calculate_next_reminder_at(&daily("09:00"), utc("2025-01-08 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-09 09:00:00"));
}

#[test]
fn test_daily_exactly_now_is_not_future() {
    let next = calculate_next_reminder_at(&daily("09:00"), utc("2025-01-08 09:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-09 09:00:00"));
}

#[test]
fn test_daily_in_recurrence_timezone() {
    let mut rec = daily("09:00");
    rec.timezone = Some("Asia/Jerusalem".into());
    // 05:00 UTC is 07:00 in Jerusalem (winter, UTC+2).
    let next = calculate_next_reminder_at(&rec, utc("2025-01-08 05:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-08 07:00:00"));
}

#[test]
fn test_engine_default_timezone() {
    let engine = RecurrenceEngine::new(chrono_tz::America::New_York);
    // 13:00 UTC is 08:00 in New York (UTC-5).
    let next = engine
        .next_reminder_at(&daily("09:00"), utc("2025-01-08 13:00:00"))
        .unwrap();
    assert_eq!(next, utc("2025-01-08 14:00:00"));
}

#[test]
fn test_invalid_timezone() {
    let mut rec = daily("09:00");
    rec.timezone = Some("Mars/Olympus".into());
    assert!(matches!(
        calculate_next_reminder_at(&rec, utc("2025-01-08 05:00:00")),
        Err(ValidationError::InvalidTimezone(_))
    ));
}

// --- weekly ---

#[test]
fn test_weekly_today_before_time() {
    // 2025-01-08 is a Wednesday (3).
    let next =
        calculate_next_reminder_at(&weekly(&[3], "09:00"), utc("2025-01-08 08:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-08 09:00:00"));
}

#[test]
fn test_weekly_today_passed_is_seven_days_later() {
    let next =
        calculate_next_reminder_at(&weekly(&[3], "09:00"), utc("2025-01-08 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-15 09:00:00"));
}

#[test]
fn test_weekly_picks_nearest_day() {
    // Monday and Friday; from Wednesday the next is Friday.
    let next =
        calculate_next_reminder_at(&weekly(&[1, 5], "18:30"), utc("2025-01-08 10:00:00"))
            .unwrap();
    assert_eq!(next, utc("2025-01-10 18:30:00"));
}

#[test]
fn test_weekly_wraps_past_weekend() {
    // Sunday only, from Wednesday.
    let next =
        calculate_next_reminder_at(&weekly(&[0], "07:00"), utc("2025-01-08 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-01-12 07:00:00"));
}

#[test]
fn test_weekly_requires_days() {
    assert_eq!(
        calculate_next_reminder_at(&weekly(&[], "09:00"), utc("2025-01-08 10:00:00")),
        Err(ValidationError::MissingRecurrenceField {
            kind: "weekly",
            field: "days"
        })
    );
    assert_eq!(
        calculate_next_reminder_at(&weekly(&[7], "09:00"), utc("2025-01-08 10:00:00")),
        Err(ValidationError::InvalidWeekday(7))
    );
}

// --- monthly ---

#[test]
fn test_monthly_day_31_clamps_in_30_day_month() {
    let next =
        calculate_next_reminder_at(&monthly(31, "09:00"), utc("2025-04-05 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-04-30 09:00:00"));
}

#[test]
fn test_monthly_day_31_clamps_in_february() {
    let next =
        calculate_next_reminder_at(&monthly(31, "09:00"), utc("2025-02-10 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-02-28 09:00:00"));

    let leap =
        calculate_next_reminder_at(&monthly(31, "09:00"), utc("2024-02-10 10:00:00")).unwrap();
    assert_eq!(leap, utc("2024-02-29 09:00:00"));
}

#[test]
fn test_monthly_passed_advances_and_reclamps() {
    // Jan 31 has passed; February clamps to the 28th.
    let next =
        calculate_next_reminder_at(&monthly(31, "09:00"), utc("2025-01-31 10:00:00")).unwrap();
    assert_eq!(next, utc("2025-02-28 09:00:00"));
}

#[test]
fn test_monthly_december_rolls_year() {
    let next =
        calculate_next_reminder_at(&monthly(5, "09:00"), utc("2025-12-20 10:00:00")).unwrap();
    assert_eq!(next, utc("2026-01-05 09:00:00"));
}

#[test]
fn test_monthly_requires_day() {
    let mut rec = monthly(1, "09:00");
    rec.day_of_month = None;
    assert_eq!(
        calculate_next_reminder_at(&rec, utc("2025-01-08 10:00:00")),
        Err(ValidationError::MissingRecurrenceField {
            kind: "monthly",
            field: "dayOfMonth"
        })
    );
    assert_eq!(
        calculate_next_reminder_at(&monthly(0, "09:00"), utc("2025-01-08 10:00:00")),
        Err(ValidationError::InvalidDayOfMonth(0))
    );
}

#[test]
fn test_days_in_month() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2025, 2), 28);
    assert_eq!(days_in_month(2025, 4), 30);
    assert_eq!(days_in_month(2025, 12), 31);
}

// --- nudge ---

#[test]
fn test_nudge_truncates_to_minute() {
    let next = calculate_next_reminder_at(
        &nudge(Some("15 minutes")),
        utc("2025-01-08 10:07:45"),
    )
    .unwrap();
    assert_eq!(next, utc("2025-01-08 10:22:00"));
}

#[test]
fn test_nudge_default_interval() {
    let next = calculate_next_reminder_at(&nudge(None), utc("2025-01-08 10:07:45")).unwrap();
    assert_eq!(next, utc("2025-01-08 10:17:00"));
}

#[test]
fn test_nudge_hebrew_interval() {
    let next =
        calculate_next_reminder_at(&nudge(Some("שעה")), utc("2025-01-08 10:07:45")).unwrap();
    assert_eq!(next, utc("2025-01-08 11:07:00"));
}

#[test]
fn test_nudge_below_one_minute() {
    assert!(matches!(
        calculate_next_reminder_at(&nudge(Some("20 seconds")), utc("2025-01-08 10:07:45")),
        Err(ValidationError::IntervalTooShort(_))
    ));
}

#[test]
fn test_nudge_disabled_engine() {
    let engine = RecurrenceEngine::default().without_nudge();
    assert_eq!(
        engine.next_reminder_at(&nudge(None), utc("2025-01-08 10:07:45")),
        Err(ValidationError::NudgeNotSupported)
    );
    assert!(engine
        .next_reminder_at(&daily("09:00"), utc("2025-01-08 10:07:45"))
        .is_ok());
}

// --- shared rules ---

#[test]
fn test_daily_requires_time() {
    let rec = ReminderRecurrence::new(RecurrenceKind::Daily);
    assert_eq!(
        calculate_next_reminder_at(&rec, utc("2025-01-08 10:00:00")),
        Err(ValidationError::MissingRecurrenceField {
            kind: "daily",
            field: "time"
        })
    );
    assert!(matches!(
        calculate_next_reminder_at(&daily("25:99"), utc("2025-01-08 10:00:00")),
        Err(ValidationError::InvalidTime(_))
    ));
}

#[test]
fn test_until_bound_rejects() {
    let mut rec = daily("09:00");
    rec.until = Some(utc("2025-01-08 12:00:00"));
    assert!(matches!(
        calculate_next_reminder_at(&rec, utc("2025-01-08 10:00:00")),
        Err(ValidationError::PastUntil(_))
    ));
    assert!(rec.has_ended(utc("2025-01-09 00:00:00")));
    assert!(!rec.has_ended(utc("2025-01-08 11:00:00")));
}

#[test]
fn test_next_is_always_strictly_after_now() {
    let recurrences = [
        daily("00:00"),
        daily("23:59"),
        weekly(&[0, 6], "12:00"),
        monthly(31, "00:00"),
        monthly(1, "23:59"),
        nudge(Some("1")),
    ];
    let nows = [
        "2024-02-29 23:59:59",
        "2025-01-01 00:00:00",
        "2025-01-08 12:00:00",
        "2025-03-31 23:59:00",
        "2025-12-31 23:59:59",
    ];
    for rec in &recurrences {
        for now in nows {
            let now = utc(now);
            let next = calculate_next_reminder_at(rec, now).unwrap();
            assert!(next > now, "{rec:?} at {now} gave {next}");
        }
    }
}

#[test]
fn test_recurrence_json_shape() {
    let rec: ReminderRecurrence = serde_json::from_str(
        r#"{"type":"monthly","time":"08:15","dayOfMonth":15,"until":"2025-12-31T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(rec.kind, RecurrenceKind::Monthly);
    assert_eq!(rec.day_of_month, Some(15));
    assert_eq!(rec.until, Some(utc("2025-12-31 00:00:00")));

    let json = serde_json::to_value(&weekly(&[1, 3], "09:00")).unwrap();
    assert_eq!(json["type"], "weekly");
    assert_eq!(json["days"], serde_json::json!([1, 3]));
    assert!(json.get("dayOfMonth").is_none());
}

// --- one-time ---

#[test]
fn test_one_time_reminder() {
    let at = calculate_one_time_reminder_at(utc("2025-01-10T17:00:00Z"), "30 minutes").unwrap();
    assert_eq!(at, utc("2025-01-10T16:30:00Z"));

    let at = calculate_one_time_reminder_at(utc("2025-01-10T17:00:00Z"), "1 day").unwrap();
    assert_eq!(at, utc("2025-01-09T17:00:00Z"));
}

#[test]
fn test_one_time_reminder_invalid_interval() {
    assert!(matches!(
        calculate_one_time_reminder_at(utc("2025-01-10T17:00:00Z"), "30 fortnights"),
        Err(ValidationError::InvalidInterval(_))
    ));
}

#[test]
fn test_one_time_reminder_before_representable_range() {
    assert!(matches!(
        calculate_one_time_reminder_at(utc("2025-01-10T17:00:00Z"), "1000000 years"),
        Err(ValidationError::InvalidInterval(_))
    ));
}

#[test]
fn test_nudge_past_representable_range() {
    let now = utc("2025-01-10T12:00:00Z");
    assert!(matches!(
        calculate_next_reminder_at(&nudge(Some("100000000000 hours")), now),
        Err(ValidationError::InvalidInterval(_))
    ));
}

// --- normalization ---

#[test]
fn test_normalize_rejects_both_modes() {
    let payload = ReminderPayload {
        due_date: Some(utc("2025-01-10 17:00:00")),
        reminder: Some("30 minutes".into()),
        reminder_recurrence: Some(daily("09:00")),
    };
    assert_eq!(
        normalize_reminder_payload(payload),
        Err(ValidationError::ConflictingReminderModes)
    );

    let payload = ReminderPayload {
        due_date: None,
        reminder: Some("30 minutes".into()),
        reminder_recurrence: Some(nudge(None)),
    };
    assert_eq!(
        normalize_reminder_payload(payload),
        Err(ValidationError::ConflictingReminderModes)
    );
}

#[test]
fn test_normalize_accepts_nudge_with_due_date() {
    let due = utc("2025-01-10 17:00:00");
    let payload = ReminderPayload {
        due_date: Some(due),
        reminder: None,
        reminder_recurrence: Some(nudge(Some("5 minutes"))),
    };
    let mode = normalize_reminder_payload(payload).unwrap();
    assert_eq!(mode.due_date(), Some(due));
    assert!(mode.reminder().is_none());
    assert_eq!(mode.recurrence().map(|r| r.kind), Some(RecurrenceKind::Nudge));
}

#[test]
fn test_normalize_rejects_daily_with_due_date() {
    let payload = ReminderPayload {
        due_date: Some(utc("2025-01-10 17:00:00")),
        reminder: None,
        reminder_recurrence: Some(daily("09:00")),
    };
    assert_eq!(
        normalize_reminder_payload(payload),
        Err(ValidationError::DueDateWithRecurrence("daily"))
    );
}

#[test]
fn test_normalize_applies_default_offset() {
    let due = utc("2025-01-10 17:00:00");
    let mode = normalize_reminder_payload(ReminderPayload {
        due_date: Some(due),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        mode,
        ReminderMode::OneTime {
            due_date: due,
            offset: "30 minutes".into()
        }
    );
    let at = RecurrenceEngine::default()
        .next_for_mode(&mode, utc("2025-01-01 00:00:00"))
        .unwrap();
    assert_eq!(at, Some(utc("2025-01-10 16:30:00")));
}

#[test]
fn test_normalize_rejects_bad_shapes_early() {
    assert_eq!(
        normalize_reminder_payload(ReminderPayload {
            reminder: Some("10 minutes".into()),
            ..Default::default()
        }),
        Err(ValidationError::ReminderWithoutDueDate)
    );
    assert!(matches!(
        normalize_reminder_payload(ReminderPayload {
            due_date: Some(utc("2025-01-10 17:00:00")),
            reminder: Some("30 fortnights".into()),
            ..Default::default()
        }),
        Err(ValidationError::InvalidInterval(_))
    ));
    assert_eq!(
        normalize_reminder_payload(ReminderPayload::default()),
        Ok(ReminderMode::None)
    );
}

#[test]
fn test_payload_json_accepts_both_casings() {
    let payload: ReminderPayload = serde_json::from_str(
        r#"{"due_date":"2025-01-10T17:00:00Z","reminderRecurrence":{"type":"nudge"}}"#,
    )
    .unwrap();
    assert!(payload.due_date.is_some());
    assert!(payload.reminder_recurrence.is_some());
}

// --- mode scheduling ---

#[test]
fn test_nudge_anchor_in_future_fires_at_anchor() {
    let due = utc("2025-01-10 17:00:00");
    let mode = ReminderMode::Recurring {
        recurrence: nudge(None),
        anchor: Some(due),
    };
    let engine = RecurrenceEngine::default();
    assert_eq!(
        engine.next_for_mode(&mode, utc("2025-01-10 12:00:00")).unwrap(),
        Some(due)
    );
    // Once the anchor has passed, nudges roll forward from now.
    assert_eq!(
        engine.next_for_mode(&mode, utc("2025-01-10 17:03:30")).unwrap(),
        Some(utc("2025-01-10 17:13:00"))
    );
}

#[test]
fn test_ended_recurrence_has_no_next() {
    let mut rec = daily("09:00");
    rec.until = Some(utc("2025-01-01 00:00:00"));
    let mode = ReminderMode::Recurring {
        recurrence: rec,
        anchor: None,
    };
    assert_eq!(
        RecurrenceEngine::default()
            .next_for_mode(&mode, utc("2025-01-08 10:00:00"))
            .unwrap(),
        None
    );
}

#[test]
fn test_normalize_rejects_offset_before_representable_range() {
    let payload = ReminderPayload {
        due_date: Some(utc("2025-01-10 17:00:00")),
        reminder: Some("1000000 years".into()),
        reminder_recurrence: None,
    };
    assert!(matches!(
        normalize_reminder_payload(payload),
        Err(ValidationError::InvalidInterval(_))
    ));
}

use super::types::TgResponse;
use super::*;

#[test]
fn test_split_short_message() {
    assert_eq!(split_message("hello", MAX_MESSAGE_CHARS), vec!["hello"]);
    assert_eq!(split_message("", MAX_MESSAGE_CHARS), vec![""]);
}

#[test]
fn test_split_prefers_newlines() {
    let text = "a\n".repeat(3000);
    let chunks = split_message(&text, MAX_MESSAGE_CHARS);
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_CHARS));
    assert!(chunks[0].ends_with('\n'));
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_split_counts_characters_not_bytes() {
    // Two bytes per Hebrew letter.
    let text = "ש".repeat(5000);
    let chunks = split_message(&text, MAX_MESSAGE_CHARS);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_CHARS);
    assert_eq!(chunks[1].chars().count(), 5000 - MAX_MESSAGE_CHARS);
}

#[test]
fn test_error_envelope_parses() {
    let raw = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 5","parameters":{"retry_after":5}}"#;
    let parsed: TgResponse = serde_json::from_str(raw).unwrap();
    assert!(!parsed.ok);
    assert_eq!(parsed.parameters.and_then(|p| p.retry_after), Some(5));
    assert!(parsed.description.unwrap().starts_with("Too Many"));
}

#[tokio::test]
async fn test_rejects_non_numeric_chat_id() {
    let notifier = TelegramNotifier::new("000:test");
    let notification = Notification {
        owner_id: "u1".into(),
        channel: "telegram".into(),
        reply_target: "@someone".into(),
        text: "hi".into(),
    };
    let err = notifier.send(&notification).await.unwrap_err();
    assert!(matches!(err, AideError::Channel(_)));
}

#[test]
fn test_from_config_uses_configured_token() {
    let config = TelegramConfig {
        enabled: true,
        bot_token: " 123:abc ".into(),
    };
    let notifier = TelegramNotifier::from_config(&config).unwrap();
    assert_eq!(notifier.base_url, "https://api.telegram.org/bot123:abc");
    assert_eq!(notifier.name(), "telegram");
}

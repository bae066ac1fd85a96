//! Numbered disambiguation prompts in English and Hebrew.

use aide_core::domain::{Domain, Entity};
use aide_core::message::Language;
use chrono_tz::Tz;

/// Most entries a prompt lists.
pub const MAX_LISTED: usize = 5;

fn header(domain: Domain, language: Language) -> &'static str {
    match (language, domain) {
        (Language::English, Domain::Task) => "I found several matching tasks:",
        (Language::English, Domain::Contact) => "I found several matching contacts:",
        (Language::English, Domain::List) => "I found several matching lists:",
        (Language::English, Domain::CalendarEvent) => "I found several matching events:",
        (Language::English, Domain::Email) => "I found several matching emails:",
        (Language::Hebrew, Domain::Task) => "מצאתי כמה משימות מתאימות:",
        (Language::Hebrew, Domain::Contact) => "מצאתי כמה אנשי קשר מתאימים:",
        (Language::Hebrew, Domain::List) => "מצאתי כמה רשימות מתאימות:",
        (Language::Hebrew, Domain::CalendarEvent) => "מצאתי כמה אירועים מתאימים:",
        (Language::Hebrew, Domain::Email) => "מצאתי כמה הודעות מתאימות:",
    }
}

fn instruction(language: Language) -> &'static str {
    match language {
        Language::English => "Reply with a number to choose.",
        Language::Hebrew => "השב/י עם מספר כדי לבחור.",
    }
}

/// Human label for one candidate.
pub fn candidate_label(entity: &Entity, language: Language, tz: Tz) -> String {
    match entity {
        Entity::Task(t) => t.text.clone(),
        Entity::Contact(c) => match &c.email {
            Some(email) => format!("{} <{email}>", c.name),
            None => c.name.clone(),
        },
        Entity::List(l) => l.list_name.clone(),
        Entity::CalendarEvent(e) => {
            let local = e.start_time.with_timezone(&tz);
            let when = match language {
                Language::English => local.format("%a %d %b %H:%M"),
                Language::Hebrew => local.format("%d/%m %H:%M"),
            };
            format!("{} ({when})", e.summary)
        }
        Entity::Email(m) => match language {
            Language::English => format!("{} (from {})", m.subject, m.sender),
            Language::Hebrew => format!("{} (מאת {})", m.subject, m.sender),
        },
    }
}

/// Render up to [`MAX_LISTED`] candidates as a numbered list ending with a
/// "reply with a number" line.
pub fn format_disambiguation(
    domain: Domain,
    candidates: &[Entity],
    language: Language,
    tz: Tz,
) -> String {
    let mut out = String::from(header(domain, language));
    for (i, entity) in candidates.iter().take(MAX_LISTED).enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}", i + 1, candidate_label(entity, language, tz)));
    }
    out.push('\n');
    out.push_str(instruction(language));
    out
}

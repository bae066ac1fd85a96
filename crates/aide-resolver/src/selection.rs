//! Parsing a user's reply to a numbered disambiguation prompt.

/// English and Hebrew ordinal words, 1-based.
const ORDINALS: &[(&str, usize)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("1st", 1),
    ("2nd", 2),
    ("3rd", 3),
    ("4th", 4),
    ("5th", 5),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("ראשון", 1),
    ("ראשונה", 1),
    ("שני", 2),
    ("שנייה", 2),
    ("שניה", 2),
    ("שלישי", 3),
    ("שלישית", 3),
    ("רביעי", 4),
    ("רביעית", 4),
    ("חמישי", 5),
    ("חמישית", 5),
    ("אחד", 1),
    ("אחת", 1),
    ("שתיים", 2),
    ("שלוש", 3),
    ("ארבע", 4),
    ("חמש", 5),
];

/// Filler words allowed around the number ("the second one", "number 2",
/// "ה-2", "בחירה 3").
const FILLER: &[&str] = &[
    "the", "one", "option", "number", "no", "no.", "item", "please", "ה", "את", "מספר",
    "אפשרות", "בחירה", "בבקשה",
];

/// A 1-based selection index, or `None` when the reply is not a selection.
///
/// Accepts a bare integer, `#N`, and ordinals ("2", "#2", "second",
/// "the second one", "השני").
pub fn parse_selection(reply: &str) -> Option<usize> {
    let cleaned = reply
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase()
        .replace(['-', '־'], " ");

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let mut found = None;
    for (i, raw) in tokens.iter().enumerate() {
        let token = raw.trim_start_matches('#');
        // Hebrew definite article fused onto an ordinal: "השני".
        let unprefixed = token.strip_prefix('ה').unwrap_or(token);

        let value = token
            .parse::<usize>()
            .ok()
            .or_else(|| ordinal(token))
            .or_else(|| ordinal(unprefixed));

        match value {
            // "one" is both a filler ("the second one") and a number.
            Some(_) if *raw == "one" && i > 0 => continue,
            Some(n) if found.is_none() => found = Some(n),
            Some(_) => return None,
            None if FILLER.contains(raw) => continue,
            None => return None,
        }
    }
    found.filter(|n| *n > 0)
}

fn ordinal(word: &str) -> Option<usize> {
    ORDINALS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_numbers() {
        assert_eq!(parse_selection("2"), Some(2));
        assert_eq!(parse_selection(" #3 "), Some(3));
        assert_eq!(parse_selection("1."), Some(1));
        assert_eq!(parse_selection("number 4"), Some(4));
    }

    #[test]
    fn test_english_ordinals() {
        assert_eq!(parse_selection("second"), Some(2));
        assert_eq!(parse_selection("the second one"), Some(2));
        assert_eq!(parse_selection("The 3rd"), Some(3));
        assert_eq!(parse_selection("one"), Some(1));
    }

    #[test]
    fn test_hebrew_ordinals() {
        assert_eq!(parse_selection("השני"), Some(2));
        assert_eq!(parse_selection("ראשון"), Some(1));
        assert_eq!(parse_selection("ה-3"), Some(3));
        assert_eq!(parse_selection("מספר 2"), Some(2));
    }

    #[test]
    fn test_not_a_selection() {
        assert_eq!(parse_selection("buy milk"), None);
        assert_eq!(parse_selection("1 and 2"), None);
        assert_eq!(parse_selection("0"), None);
        assert_eq!(parse_selection(""), None);
        assert_eq!(parse_selection("the milk one"), None);
    }
}

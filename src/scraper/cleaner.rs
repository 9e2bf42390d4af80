use chrono::NaiveDate;

// ── Text ──────────────────────────────────────────────────────────────────────

/// Collapse every whitespace run to one space and trim.
/// "  Boeing\n  737 " → "Boeing 737"
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join text nodes the way a cell reads on screen: each node trimmed, empty
/// nodes dropped, one space between nodes, inner whitespace collapsed.
pub fn join_text_nodes<'a, I>(nodes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = nodes
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Remove every whitespace character.
/// "EC - ABC Iberia" → "EC-ABCIberia"
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse listing dates: "12 Jan 2020", "12-JAN-2020" or ISO.
/// Partial dates ("xx Jan 2020", "date unk.") yield `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%d %b %Y", "%d-%b-%Y", "%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Boeing\n\t 737  "), "Boeing 737");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_join_text_nodes() {
        assert_eq!(join_text_nodes(["EC-ABC", " ", "\n Iberia  Express "]), "EC-ABC Iberia Express");
        assert_eq!(join_text_nodes(["", "  "]), "");
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" EC - ABC\tIberia "), "EC-ABCIberia");
    }

    #[test]
    fn test_parse_date() {
        let jan1 = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(parse_date("1 Jan 2020"), jan1);
        assert_eq!(parse_date("01-JAN-2020"), jan1);
        assert_eq!(parse_date("2020-01-01"), jan1);
        assert_eq!(parse_date("01/01/2020"), jan1);
        assert_eq!(parse_date("xx Jan 2020"), None);
        assert_eq!(parse_date("date unk."), None);
    }
}

//! Filter formulas sent to the record source.
//!
//! Identifiers coming from callers are always passed through [`quote`], so a
//! slack id like `U1' , TRUE()) , ('` stays a string literal.

/// Render `value` as a single-quoted formula string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Ships belonging to one entrant, from the High Seas project source, not deleted.
pub fn ships_for_entrant(slack_id: &str) -> String {
    format!(
        "AND({} = {{entrant__slack_id}}, {{project_source}} = 'high_seas', {{ship_status}} != 'deleted')",
        quote(slack_id)
    )
}

/// The person record for a slack id.
pub fn person_by_slack_id(slack_id: &str) -> String {
    format!("{{slack_id}} = {}", quote(slack_id))
}

/// Non-rejected shop orders for a recipient placed after `cutoff` (YYYY-MM-DD).
pub fn orders_for_recipient(slack_id: &str, cutoff: &str) -> String {
    format!(
        "AND({{recipient:slack_id}} = {}, {{status}} != 'REJECTED', IS_AFTER(CREATED_TIME(), {}))",
        quote(slack_id),
        quote(cutoff)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("U123ABC"), "'U123ABC'");
    }

    #[test]
    fn test_quote_escapes_injection() {
        assert_eq!(quote("x' , TRUE()) , ('"), r"'x\' , TRUE()) , (\''");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("a\nb"), "'a b'");
    }

    #[test]
    fn test_ships_formula() {
        assert_eq!(
            ships_for_entrant("U1"),
            "AND('U1' = {entrant__slack_id}, {project_source} = 'high_seas', {ship_status} != 'deleted')"
        );
    }

    #[test]
    fn test_orders_formula() {
        let f = orders_for_recipient("U1", "2024-10-29");
        assert!(f.starts_with("AND({recipient:slack_id} = 'U1'"));
        assert!(f.contains("{status} != 'REJECTED'"));
        assert!(f.ends_with("IS_AFTER(CREATED_TIME(), '2024-10-29'))"));
    }
}

// ordermart-core/src/domain/cleaning/status.rs

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::model::StatusClean;

fn re_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Pattern is hardcoded; the fallback is never taken.
        Regex::new(r"\s+").unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Trim, lowercase and collapse inner whitespace runs to a single space.
pub fn normalize_text(raw: &str) -> String {
    re_whitespace()
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

/// Deterministic lookup from normalized raw status to the canonical set.
#[derive(Debug, Clone)]
pub struct StatusMapper {
    aliases: BTreeMap<String, StatusClean>,
}

impl Default for StatusMapper {
    fn default() -> Self {
        let aliases = [
            ("paid", StatusClean::Paid),
            ("refund", StatusClean::Refund),
            ("refunded", StatusClean::Refund),
            ("returned", StatusClean::Refund),
            ("pending", StatusClean::Pending),
            ("failed", StatusClean::Failed),
        ]
        .into_iter()
        .map(|(raw, status)| (raw.to_string(), status))
        .collect();
        Self { aliases }
    }
}

impl StatusMapper {
    /// Built-in aliases extended (or overridden) by project-level ones.
    pub fn with_aliases<'a, I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a StatusClean)>,
    {
        let mut mapper = Self::default();
        for (raw, status) in extra {
            mapper.aliases.insert(normalize_text(raw), *status);
        }
        mapper
    }

    pub fn map(&self, raw: Option<&str>) -> StatusClean {
        raw.map(normalize_text)
            .and_then(|key| self.aliases.get(&key).copied())
            .unwrap_or(StatusClean::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Paid  "), "paid");
        assert_eq!(normalize_text("On \t Hold"), "on hold");
    }

    #[test]
    fn test_default_mapping_table() {
        let mapper = StatusMapper::default();
        let rendered: Vec<String> = [
            Some("Paid"),
            Some(" REFUNDED "),
            Some("returned"),
            Some("pending"),
            Some("Failed"),
            Some("shipped"),
            Some(""),
            None,
        ]
        .into_iter()
        .map(|raw| format!("{:?} -> {}", raw, mapper.map(raw)))
        .collect();

        insta::assert_snapshot!(rendered.join("\n"), @r#"
        Some("Paid") -> paid
        Some(" REFUNDED ") -> refund
        Some("returned") -> refund
        Some("pending") -> pending
        Some("Failed") -> failed
        Some("shipped") -> unknown
        Some("") -> unknown
        None -> unknown
        "#);
    }

    #[test]
    fn test_project_aliases_extend_the_set() {
        let extra = [("Charged Back".to_string(), StatusClean::Refund)];
        let mapper = StatusMapper::with_aliases(extra.iter().map(|(k, v)| (k, v)));
        assert_eq!(mapper.map(Some("charged   back")), StatusClean::Refund);
        assert_eq!(mapper.map(Some("paid")), StatusClean::Paid);
    }
}

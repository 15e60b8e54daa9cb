//! Production rules for forward chaining.
//!
//! Rules are data, not code: they can be loaded from JSON or a small text
//! format, or built programmatically. A rule fires when every one of its
//! conditions is a known fact, and then contributes its conclusion.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::fact::{Fact, parse_fact_list};

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A single production rule: `conditions => conclusion`.
///
/// Every field is optional in serialized form. A missing `conditions` list
/// means the rule is always satisfied; a missing or blank `conclusion` makes
/// the rule inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de> + Eq + Hash"
))]
pub struct Rule<F> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub conditions: HashSet<F>,
    #[serde(default)]
    pub conclusion: Option<F>,
}

impl<F: Fact> Rule<F> {
    /// Create a rule that derives `conclusion` once all `conditions` hold.
    pub fn new(conditions: impl IntoIterator<Item = F>, conclusion: F) -> Self {
        Self {
            name: None,
            conditions: conditions.into_iter().collect(),
            conclusion: Some(conclusion),
        }
    }

    /// Create a rule with no conditions. It fires in the first round.
    pub fn unconditional(conclusion: F) -> Self {
        Self::new(std::iter::empty(), conclusion)
    }

    /// Create a rule that never contributes a fact.
    pub fn inert(conditions: impl IntoIterator<Item = F>) -> Self {
        Self {
            name: None,
            conditions: conditions.into_iter().collect(),
            conclusion: None,
        }
    }

    /// Set the rule name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The conclusion this rule can actually contribute, if any.
    pub fn effective_conclusion(&self) -> Option<&F> {
        self.conclusion.as_ref().filter(|c| !c.is_blank())
    }

    /// Returns `true` if the rule can never contribute a fact.
    pub fn is_inert(&self) -> bool {
        self.effective_conclusion().is_none()
    }

    /// Returns `true` if every condition is in `known`.
    pub fn is_satisfied_by(&self, known: &HashSet<F>) -> bool {
        self.conditions.iter().all(|c| known.contains(c))
    }
}

impl fmt::Display for Rule<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut conditions: Vec<&str> = self.conditions.iter().map(String::as_str).collect();
        conditions.sort_unstable();
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        if conditions.is_empty() {
            write!(f, "(always) => ")?;
        } else {
            write!(f, "{} => ", conditions.join(", "))?;
        }
        match self.effective_conclusion() {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "(inert)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// A collection of rules with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de> + Eq + Hash"
))]
pub struct RuleSet<F> {
    pub name: String,
    pub rules: Vec<Rule<F>>,
    pub source: String,
}

impl<F: Fact> RuleSet<F> {
    pub fn new(name: impl Into<String>, rules: Vec<Rule<F>>) -> Self {
        Self {
            name: name.into(),
            rules,
            source: "inline".into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules that can contribute a fact.
    pub fn active_count(&self) -> usize {
        self.rules.iter().filter(|r| !r.is_inert()).count()
    }
}

impl<F: Fact + DeserializeOwned> RuleSet<F> {
    /// Parse a rule set from a JSON array of rules.
    pub fn from_json(json: &str, source: &str) -> RuleResult<Self> {
        let rules: Vec<Rule<F>> = serde_json::from_str(json).map_err(|e| RuleError::Json {
            source_name: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(source, rules).with_source(source))
    }
}

impl RuleSet<String> {
    /// Parse rules from the text format.
    ///
    /// ```text
    /// # comment
    /// @rule ab-gives-c
    ///   when: A, B
    ///   then: C
    /// ```
    ///
    /// The name after `@rule` is optional. `when:` may repeat and accumulates;
    /// `then:` takes at most one fact and may appear once.
    pub fn parse_from_text(text: &str, source: &str) -> RuleResult<Self> {
        let mut rules = Vec::new();
        // The pending rule, and whether it has seen a `then:` line.
        let mut current: Option<(Rule<String>, bool)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("@rule") {
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    return Err(parse_error(source, line_no, format!("unknown directive `{line}`")));
                }
                if let Some((rule, _)) = current.take() {
                    rules.push(rule);
                }
                let name = rest.trim();
                let mut rule = Rule::inert(std::iter::empty());
                if !name.is_empty() {
                    rule.name = Some(name.to_string());
                }
                current = Some((rule, false));
                continue;
            }

            let Some((rule, has_then)) = current.as_mut() else {
                return Err(parse_error(
                    source,
                    line_no,
                    format!("expected `@rule` before `{line}`"),
                ));
            };

            if let Some(conditions) = line.strip_prefix("when:") {
                rule.conditions.extend(parse_fact_list(conditions));
            } else if let Some(conclusion) = line.strip_prefix("then:") {
                if *has_then {
                    return Err(parse_error(source, line_no, "duplicate `then:` line".into()));
                }
                let mut facts = parse_fact_list(conclusion);
                if facts.len() > 1 {
                    return Err(parse_error(
                        source,
                        line_no,
                        format!("a rule has exactly one conclusion, found {}", facts.len()),
                    ));
                }
                rule.conclusion = facts.pop();
                *has_then = true;
            } else {
                return Err(parse_error(
                    source,
                    line_no,
                    format!("unknown key in `{line}`, expected `when:` or `then:`"),
                ));
            }
        }

        if let Some((rule, _)) = current {
            rules.push(rule);
        }

        Ok(Self::new(source, rules).with_source(source))
    }

    /// Load a rule file. `.json` files are parsed as JSON, everything else
    /// as the text format. The set is named after the file stem.
    pub fn load(path: &Path) -> RuleResult<Self> {
        let source = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| RuleError::Read {
            path: source.clone(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mut set = if is_json {
            Self::from_json(&content, &source)?
        } else {
            Self::parse_from_text(&content, &source)?
        };
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            set.name = stem.to_string();
        }

        tracing::debug!(
            path = %source,
            rules = set.len(),
            active = set.active_count(),
            "loaded rule set"
        );
        Ok(set)
    }
}

fn parse_error(source: &str, line: usize, message: String) -> RuleError {
    RuleError::Parse {
        source_name: source.to_string(),
        line,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rule_satisfaction() {
        let rule = Rule::new(["A".to_string(), "B".to_string()], "C".to_string());
        assert!(rule.is_satisfied_by(&facts(&["A", "B", "X"])));
        assert!(!rule.is_satisfied_by(&facts(&["A"])));
    }

    #[test]
    fn unconditional_rule_is_always_satisfied() {
        let rule = Rule::unconditional("D".to_string());
        assert!(rule.is_satisfied_by(&HashSet::new()));
        assert!(!rule.is_inert());
    }

    #[test]
    fn blank_conclusion_is_inert() {
        let rule = Rule::new(["A".to_string()], String::new());
        assert!(rule.is_inert());
        assert!(rule.effective_conclusion().is_none());
        assert!(Rule::<String>::inert([]).is_inert());

        let spaced = Rule::new(["A".to_string()], "  ".to_string());
        assert!(!spaced.is_inert());
        assert_eq!(spaced.effective_conclusion().map(String::as_str), Some("  "));
    }

    #[test]
    fn display_sorts_conditions() {
        let rule = Rule::new(["B".to_string(), "A".to_string()], "C".to_string()).with_name("abc");
        assert_eq!(rule.to_string(), "abc: A, B => C");
        assert_eq!(Rule::<String>::inert(["X".to_string()]).to_string(), "X => (inert)");
    }

    #[test]
    fn text_format_parsing() {
        let text = r#"
# derive C from A and B
@rule ab-gives-c
  when: A, B
  then: C

@rule
  when: C
  when: E
  then: D   # trailing comment

@rule always
  then: F

@rule no-conclusion
  when: A
"#;
        let rs = RuleSet::parse_from_text(text, "test").unwrap();
        assert_eq!(rs.len(), 4);
        assert_eq!(rs.active_count(), 3);
        assert_eq!(rs.source, "test");

        assert_eq!(rs.rules[0].name.as_deref(), Some("ab-gives-c"));
        assert_eq!(rs.rules[0].conditions, facts(&["A", "B"]));
        assert_eq!(rs.rules[0].conclusion.as_deref(), Some("C"));

        assert!(rs.rules[1].name.is_none());
        assert_eq!(rs.rules[1].conditions, facts(&["C", "E"]));

        assert!(rs.rules[2].conditions.is_empty());
        assert_eq!(rs.rules[2].conclusion.as_deref(), Some("F"));

        assert!(rs.rules[3].is_inert());
    }

    #[test]
    fn text_format_rejects_multiple_conclusions() {
        let text = "@rule r\n  when: A\n  then: B, C\n";
        let err = RuleSet::parse_from_text(text, "t").unwrap_err();
        assert!(matches!(err, RuleError::Parse { line: 3, .. }));
    }

    #[test]
    fn text_format_rejects_duplicate_then() {
        let text = "@rule r\n  then:\n  then: B\n";
        let err = RuleSet::parse_from_text(text, "t").unwrap_err();
        assert!(matches!(err, RuleError::Parse { line: 3, .. }));
    }

    #[test]
    fn text_format_rejects_stray_lines() {
        let err = RuleSet::parse_from_text("A => B\n", "t").unwrap_err();
        assert!(matches!(err, RuleError::Parse { line: 1, .. }));

        let err = RuleSet::parse_from_text("@rule r\n  because: A\n", "t").unwrap_err();
        assert!(matches!(err, RuleError::Parse { line: 2, .. }));

        let err = RuleSet::parse_from_text("@rules r\n", "t").unwrap_err();
        assert!(matches!(err, RuleError::Parse { line: 1, .. }));
    }

    #[test]
    fn json_missing_fields_default() {
        let json = r#"[
            {"name": "full", "conditions": ["A", "B"], "conclusion": "C"},
            {"conclusion": "D"},
            {"conditions": ["A"]},
            {"conditions": ["A"], "conclusion": null},
            {"conditions": ["A"], "conclusion": ""}
        ]"#;
        let rs: RuleSet<String> = RuleSet::from_json(json, "test").unwrap();
        assert_eq!(rs.len(), 5);
        assert_eq!(rs.active_count(), 2);
        assert!(rs.rules[1].conditions.is_empty());
        assert!(rs.rules[1].name.is_none());
        assert!(rs.rules[2].conclusion.is_none());
        assert!(rs.rules[4].is_inert());
    }

    #[test]
    fn json_with_integer_facts() {
        let rs: RuleSet<u32> =
            RuleSet::from_json(r#"[{"conditions": [1, 2], "conclusion": 3}]"#, "ints").unwrap();
        assert_eq!(rs.rules[0].conclusion, Some(3));
    }

    #[test]
    fn json_parse_error() {
        let err = RuleSet::<String>::from_json("{not json", "bad").unwrap_err();
        assert!(matches!(err, RuleError::Json { ref source_name, .. } if source_name == "bad"));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();

        let json_path = dir.path().join("animals.json");
        std::fs::write(&json_path, r#"[{"conditions": ["feathers"], "conclusion": "bird"}]"#)
            .unwrap();
        let rs = RuleSet::load(&json_path).unwrap();
        assert_eq!(rs.name, "animals");
        assert_eq!(rs.len(), 1);

        let text_path = dir.path().join("animals.rules");
        std::fs::write(&text_path, "@rule\n  when: feathers\n  then: bird\n").unwrap();
        let rs = RuleSet::load(&text_path).unwrap();
        assert_eq!(rs.name, "animals");
        assert_eq!(rs.rules[0].conclusion.as_deref(), Some("bird"));
    }

    #[test]
    fn load_missing_file() {
        let err = RuleSet::load(Path::new("/definitely/not/here.rules")).unwrap_err();
        assert!(matches!(err, RuleError::Read { .. }));
    }
}

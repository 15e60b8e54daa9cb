//! An accumulating source of facts and rules.
//!
//! Agents collect observations over time and pick up rules as they go. The
//! knowledge base holds both and hands them to a [`Reasoner`] on demand.

use std::collections::HashSet;

use crate::engine::Reasoner;
use crate::fact::Fact;
use crate::rules::{Rule, RuleSet};

#[derive(Debug, Clone)]
pub struct KnowledgeBase<F> {
    /// Observed facts in first-seen order, without duplicates.
    facts: Vec<F>,
    seen: HashSet<F>,
    rules: Vec<Rule<F>>,
}

impl<F: Fact> Default for KnowledgeBase<F> {
    fn default() -> Self {
        Self {
            facts: Vec::new(),
            seen: HashSet::new(),
            rules: Vec::new(),
        }
    }
}

impl<F: Fact> KnowledgeBase<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact. Returns `false` if it was already known.
    pub fn observe(&mut self, fact: F) -> bool {
        if !self.seen.insert(fact.clone()) {
            return false;
        }
        self.facts.push(fact);
        true
    }

    pub fn add_rule(&mut self, rule: Rule<F>) {
        self.rules.push(rule);
    }

    pub fn extend_rules(&mut self, rules: RuleSet<F>) {
        tracing::debug!(set = %rules.name, count = rules.len(), "adding rule set");
        self.rules.extend(rules.rules);
    }

    pub fn facts(&self) -> &[F] {
        &self.facts
    }

    pub fn rules(&self) -> &[Rule<F>] {
        &self.rules
    }

    pub fn knows(&self, fact: &F) -> bool {
        self.seen.contains(fact)
    }

    /// Run `reasoner` over the current facts and rules. Derived facts are not
    /// stored; pass them to [`absorb`](Self::absorb) to keep them.
    pub fn infer<R: Reasoner<F>>(&self, reasoner: &mut R) -> Vec<F> {
        reasoner.reason(&self.facts, &self.rules)
    }

    /// Observe every fact in `facts`. Returns how many were new.
    pub fn absorb(&mut self, facts: impl IntoIterator<Item = F>) -> usize {
        facts
            .into_iter()
            .map(|f| self.observe(f))
            .filter(|&is_new| is_new)
            .count()
    }
}

//! Forward-chaining inference engine.
//!
//! Runs production rules over a set of known facts in synchronous rounds
//! until a fixpoint is reached or the iteration cap runs out. Every rule in a
//! round sees the same snapshot of known facts, so a fact derived mid-round
//! only enables other rules in the next round.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::ConfigResult;
use crate::fact::Fact;
use crate::rules::Rule;

// ---------------------------------------------------------------------------
// Reasoner trait
// ---------------------------------------------------------------------------

/// Something that derives conclusions from facts and rules.
pub trait Reasoner<F: Fact> {
    /// Apply `rules` to `facts` and return every fact known afterwards.
    ///
    /// The returned order is unspecified.
    fn reason(&mut self, facts: &[F], rules: &[Rule<F>]) -> Vec<F>;

    /// Display name for this reasoner.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A fact added by a rule during chaining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivation<F> {
    pub fact: F,
    /// Index of the rule in the slice passed to the engine. When several
    /// rules produce the same fact in one round, the first one wins.
    pub rule_index: usize,
    pub rule_name: Option<String>,
    /// 1-based round in which the fact was added.
    pub round: usize,
}

/// Full result of one chaining run.
#[derive(Debug, Clone, Serialize)]
pub struct ChainOutcome<F> {
    /// Every fact known at the end, seeds included.
    pub facts: HashSet<F>,
    /// Newly derived facts, in derivation order.
    pub derived: Vec<Derivation<F>>,
    /// Number of rounds that added at least one fact.
    pub rounds: usize,
    /// `false` only when the iteration cap stopped chaining while some rule
    /// could still add a fact.
    pub reached_fixpoint: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Forward-chaining engine with an iteration cap.
///
/// [`reason`](Reasoner::reason) overwrites the stored conclusions, so callers
/// sharing one engine across threads must serialize access. [`chain`](Self::chain)
/// is read-only and can be shared freely.
#[derive(Debug, Clone)]
pub struct ForwardChainingEngine<F> {
    config: EngineConfig,
    conclusions: Vec<F>,
}

impl<F: Fact> Default for ForwardChainingEngine<F> {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            conclusions: Vec::new(),
        }
    }
}

impl<F: Fact> ForwardChainingEngine<F> {
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            conclusions: Vec::new(),
        })
    }

    pub fn with_max_iterations(max_iterations: usize) -> ConfigResult<Self> {
        Self::new(EngineConfig::with_max_iterations(max_iterations))
    }

    pub fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    /// Known facts after the most recent `reason` call.
    pub fn conclusions(&self) -> &[F] {
        &self.conclusions
    }

    /// Like `reason`, but returns derivations and convergence information.
    pub fn reason_detailed(&mut self, facts: &[F], rules: &[Rule<F>]) -> ChainOutcome<F> {
        let outcome = self.chain(facts, rules);
        self.conclusions = outcome.facts.iter().cloned().collect();
        outcome
    }

    /// Run forward chaining without touching the stored conclusions.
    pub fn chain(&self, facts: &[F], rules: &[Rule<F>]) -> ChainOutcome<F> {
        let max_iterations = self.config.max_iterations;
        let mut known: HashSet<F> = facts.iter().cloned().collect();
        let mut derived: Vec<Derivation<F>> = Vec::new();
        let mut rounds = 0;
        let mut reached_fixpoint = false;

        for round in 1..=max_iterations {
            // Snapshot semantics: `known` is only read while the batch is built.
            let batch: Vec<(usize, &F)> = rules
                .iter()
                .enumerate()
                .filter_map(|(i, rule)| new_conclusion(rule, &known).map(|c| (i, c)))
                .collect();

            if batch.is_empty() {
                reached_fixpoint = true;
                break;
            }

            rounds = round;
            for (rule_index, fact) in batch {
                if known.insert(fact.clone()) {
                    derived.push(Derivation {
                        fact: fact.clone(),
                        rule_index,
                        rule_name: rules[rule_index].name.clone(),
                        round,
                    });
                }
            }
            tracing::trace!(round, known = known.len(), "forward-chaining round complete");
        }

        if !reached_fixpoint {
            // The cap was hit right after a productive round. Check once,
            // without adding anything, to tell a true fixpoint from truncation.
            reached_fixpoint = !rules.iter().any(|r| new_conclusion(r, &known).is_some());
            if !reached_fixpoint {
                tracing::warn!(
                    max_iterations,
                    facts = known.len(),
                    "forward chaining hit the iteration cap before reaching a fixpoint"
                );
            }
        }

        tracing::debug!(
            seeds = facts.len(),
            rules = rules.len(),
            derived = derived.len(),
            rounds,
            reached_fixpoint,
            "forward chaining finished"
        );

        ChainOutcome {
            facts: known,
            derived,
            rounds,
            reached_fixpoint,
        }
    }
}

impl<F: Fact> Reasoner<F> for ForwardChainingEngine<F> {
    fn reason(&mut self, facts: &[F], rules: &[Rule<F>]) -> Vec<F> {
        self.reason_detailed(facts, rules);
        self.conclusions.clone()
    }

    fn name(&self) -> &str {
        "forward-chaining"
    }
}

/// The conclusion `rule` would add to `known`, if it fires and the
/// conclusion is not already known.
fn new_conclusion<'r, F: Fact>(rule: &'r Rule<F>, known: &HashSet<F>) -> Option<&'r F> {
    let conclusion = rule.effective_conclusion()?;
    (!known.contains(conclusion) && rule.is_satisfied_by(known)).then_some(conclusion)
}

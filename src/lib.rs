// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # chainer
//!
//! A forward-chaining inference engine. Seed it with known facts and a set
//! of production rules; it derives new facts in synchronous rounds until a
//! fixpoint is reached or the iteration cap runs out.
//!
//! ## Modules
//!
//! - **Facts** (`fact`): the `Fact` trait for opaque, hashable tokens
//! - **Rules** (`rules`): `conditions => conclusion` rules, JSON and text loaders
//! - **Engine** (`engine`): `ForwardChainingEngine` and the `Reasoner` trait
//! - **Knowledge base** (`knowledge`): accumulates facts and rules for an agent
//! - **Config** (`config`): TOML-backed `EngineConfig`
//!
//! ## Library usage
//!
//! ```
//! use chainer::engine::{ForwardChainingEngine, Reasoner};
//! use chainer::rules::Rule;
//!
//! let rules = vec![Rule::new(["A", "B"], "C"), Rule::new(["C"], "D")];
//! let mut engine: ForwardChainingEngine<&str> =
//!     ForwardChainingEngine::with_max_iterations(10).unwrap();
//! let facts = engine.reason(&["A", "B"], &rules);
//! assert_eq!(facts.len(), 4);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fact;
pub mod knowledge;
pub mod rules;

pub use config::EngineConfig;
pub use engine::{ChainOutcome, Derivation, ForwardChainingEngine, Reasoner};
pub use error::{ChainerError, ChainerResult, ConfigError, RuleError};
pub use fact::Fact;
pub use knowledge::KnowledgeBase;
pub use rules::{Rule, RuleSet};

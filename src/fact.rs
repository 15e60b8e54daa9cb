//! Facts: opaque, hashable tokens the engine reasons over.

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

/// An atomic piece of known information.
///
/// The engine only ever asks two things of a fact: is it equal to another
/// one, and can it live in a hash set. No ordering is assumed.
pub trait Fact: Clone + Eq + Hash + Debug {
    /// A blank fact is treated as "no conclusion" when it appears on the
    /// right-hand side of a rule.
    fn is_blank(&self) -> bool {
        false
    }
}

impl Fact for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Fact for &str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Fact for Arc<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Fact for Rc<str> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! opaque_fact {
    ($($t:ty),* $(,)?) => {
        $(impl Fact for $t {})*
    };
}

opaque_fact!(char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Parse a plain-text fact list.
///
/// Facts are separated by newlines or commas; `#` starts a comment that runs
/// to the end of the line. Empty entries are dropped, duplicates are kept
/// (the engine deduplicates).
pub fn parse_fact_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

//! Reproduces spec.md §8 scenario 6: a sub-phrase whose `starts` always proposes a null token
//! anchored at `at == 0`, every single iteration. Arbitration must reject that candidate every
//! time (§4.3.2 rule 3) rather than ever selecting it, so the engine always falls through to
//! gap-filling or the next competing candidate instead of looping on a zero-width commit forever.

use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Candidate, Parser, Phrase, PhraseRef, Stream};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_]+").unwrap());

/// Always proposes a zero-width match at the very start of whatever is left unparsed. Never a
/// legitimate candidate on its own — present purely to exercise the rejection rule.
#[derive(Debug)]
struct AlwaysNullPhrase;

impl Phrase for AlwaysNullPhrase {
    fn name(&self) -> &'static str {
        "always-null"
    }

    fn starts(&self, _stream: &Stream) -> Option<Candidate> {
        Some(Candidate::token(0, 0))
    }
}

#[derive(Debug)]
struct WordPhrase;

impl Phrase for WordPhrase {
    fn name(&self) -> &'static str {
        "word"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let m = WORD_RE.find(stream.unparsed)?;
        Some(Candidate::token(m.start(), m.end()).with_id("word"))
    }
}

#[derive(Debug)]
struct NullGuardRoot {
    children: Vec<PhraseRef>,
}

impl Phrase for NullGuardRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        &self.children
    }
}

/// Build the grammar for the scenario above: every iteration offers a rejected null candidate
/// alongside whatever `word` can match (possibly nothing at all).
pub fn nullguard_grammar() -> Parser {
    let children: Vec<PhraseRef> = vec![Rc::new(AlwaysNullPhrase), Rc::new(WordPhrase)];
    let root = Rc::new(NullGuardRoot { children });
    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::nullguard_grammar;

    /// The always-null candidate competes on every single character of a row that `word` never
    /// matches (pure punctuation); rejection forces a fall-through to gap-filling every time, so
    /// the row is consumed as one untyped run rather than the driver looping forever.
    #[test]
    fn repeated_null_rejection_still_terminates_on_a_row_word_never_matches() {
        let parser = nullguard_grammar();
        let result = parser.parse_string("!!! ,,, ???\n").unwrap();
        let only_child = result.root().children().next().unwrap();
        assert_eq!(only_child.content(), "!!! ,,, ???\n");
        assert_eq!(only_child.id(), None);
    }

    /// `word` does compete and win some iterations; the null candidate is still rejected on every
    /// one of them, so the runner-up (`word`, or the gap-fill) wins each time instead.
    #[test]
    fn repeated_null_rejection_yields_to_whichever_candidate_actually_matches() {
        let parser = nullguard_grammar();
        let result = parser.parse_string("foo!bar\n").unwrap();
        let words: Vec<_> = result
            .root()
            .children()
            .filter(|c| c.id().is_some())
            .map(|c| c.content().to_string())
            .collect();
        assert_eq!(words, vec!["foo", "bar"]);
    }
}

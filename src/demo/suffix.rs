//! Exercises `suffix_phrases`: phrases evaluated immediately after a phrase's node closes, for a
//! continuation attached directly to the closing node (e.g. a trailing quantifier on a group).
//! No other demo grammar overrides `suffix_phrases`, so this is its only coverage.

use std::rc::Rc;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::{Candidate, Parser, Phrase, PhraseRef, Stream};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_]+").unwrap());

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

/// Matches a literal `?` only when it sits at the very start of the unparsed window — i.e. only
/// when offered right after the group it quantifies has just closed, never as a general-purpose
/// root construct.
#[derive(Debug)]
struct QuantifierPhrase;

impl Phrase for QuantifierPhrase {
    fn name(&self) -> &'static str {
        "quantifier"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        if stream.unparsed.starts_with('?') {
            Some(Candidate::token(0, 1).with_id("quantifier"))
        } else {
            None
        }
    }
}

/// A parenthesized group whose close offers `QuantifierPhrase` as a one-shot continuation,
/// distinct from its own (word-only) sub-phrases.
#[derive(Debug)]
struct GroupPhrase {
    children: OnceCell<Vec<PhraseRef>>,
    suffixes: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for GroupPhrase {
    fn name(&self) -> &'static str {
        "group"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('(')?;
        Some(Candidate::open(at, at + 1))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find(')')?;
        Some(Candidate::end(at, at + 1))
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn suffix_phrases(&self) -> &[PhraseRef] {
        self.suffixes.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug)]
struct SuffixRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for SuffixRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Build the grammar described above: a group phrase whose close offers a `?` continuation for
/// exactly one pass, distinct from its `word` sub-phrase and absent from the root's own grammar.
pub fn suffix_grammar() -> Parser {
    let group = Rc::new(GroupPhrase {
        children: OnceCell::new(),
        suffixes: OnceCell::new(),
    });
    group
        .children
        .set(vec![Rc::new(WordPhrase) as PhraseRef])
        .expect("children set exactly once during construction");
    group
        .suffixes
        .set(vec![Rc::new(QuantifierPhrase) as PhraseRef])
        .expect("suffixes set exactly once during construction");

    let root = Rc::new(SuffixRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![group as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::suffix_grammar;
    use crate::Shape;

    /// The root declares no `quantifier` sub-phrase of its own; `?` is only ever recognized
    /// because it's offered as the just-closed group's `suffix_phrases`, in the single pass right
    /// after the group's end commits.
    #[test]
    fn a_suffix_phrase_is_recognized_immediately_after_its_owner_closes() {
        let parser = suffix_grammar();
        let result = parser.parse_string("(a)?b\n").unwrap();
        let children: Vec<_> = result.root().children().collect();

        let group = &children[0];
        assert_eq!(group.shape(), Shape::Node);
        assert!(group.end().is_some());

        assert_eq!(children[1].id(), Some("quantifier"));
        assert_eq!(children[1].content(), "?");

        assert_eq!(children[2].id(), None);
        assert_eq!(children[2].content(), "b\n");
    }

    /// The suffix opportunity is a one-shot window at the exact position right after the close:
    /// a space there means `quantifier` doesn't match this pass, and the window is gone — a `?`
    /// appearing later in the row is never picked up by it, since the root has no `quantifier`
    /// sub-phrase of its own.
    #[test]
    fn the_suffix_window_does_not_outlive_the_single_pass_right_after_close() {
        let parser = suffix_grammar();
        let result = parser.parse_string("(a) ?b\n").unwrap();
        let children: Vec<_> = result.root().children().collect();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].shape(), Shape::Node);
        assert_eq!(children[1].id(), None);
        assert_eq!(children[1].content(), " ?b\n");
    }
}

//! Exercises `.instant()` and `.default_end()`, neither of which any other demo grammar calls.
//! Three grammars, each isolating one rule of spec.md §4.3.2's arbitration order that would
//! otherwise go untested: a plain instant candidate pre-empting a non-instant one regardless of
//! position, an instant end pre-empting an instant node/token candidate even at a smaller `at`,
//! and a `default_end` candidate deferring to a same-pass sub-phrase start.

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

/// Matches from `#` to the end of whatever is left unparsed, instantly: it wins over a
/// competing non-instant candidate even when that candidate starts earlier.
#[derive(Debug)]
struct CommentPhrase;

impl Phrase for CommentPhrase {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('#')?;
        Some(Candidate::token(at, stream.unparsed.len()).with_id("comment").instant())
    }
}

#[derive(Debug)]
struct InstantCommentRoot {
    children: Vec<PhraseRef>,
}

impl Phrase for InstantCommentRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        &self.children
    }
}

/// A comment phrase (instant, standalone) competing against a word phrase that always starts
/// earlier in the row.
pub fn instant_comment_grammar() -> Parser {
    let children: Vec<PhraseRef> = vec![Rc::new(CommentPhrase), Rc::new(WordPhrase)];
    let root = Rc::new(InstantCommentRoot { children });
    Parser::new(root).expect("root declares sub-phrases")
}

/// A one-character standalone token wherever `#` occurs, instant, nested inside the brace block
/// below. Its `at` is always smaller than the brace's closing `}` in the scenario this grammar is
/// built for, which is exactly what `instant_end_grammar`'s test relies on.
#[derive(Debug)]
struct HashTagPhrase;

impl Phrase for HashTagPhrase {
    fn name(&self) -> &'static str {
        "hashtag"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('#')?;
        Some(Candidate::token(at, at + 1).with_id("hashtag").instant())
    }
}

/// A brace block whose close is instant. Paired with `HashTagPhrase` above to prove that an
/// instant end pre-empts a coexisting instant node/token regardless of offset.
#[derive(Debug)]
struct BraceBlockPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for BraceBlockPhrase {
    fn name(&self) -> &'static str {
        "brace"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('{')?;
        Some(Candidate::open(at, at + 1))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('}')?;
        Some(Candidate::end(at, at + 1).instant())
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug)]
struct InstantEndRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for InstantEndRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

pub fn instant_end_grammar() -> Parser {
    let brace = Rc::new(BraceBlockPhrase {
        children: OnceCell::new(),
    });
    brace
        .children
        .set(vec![Rc::new(HashTagPhrase) as PhraseRef])
        .expect("children set exactly once during construction");

    let root = Rc::new(InstantEndRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![brace as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

/// A block whose `ends` greedily claims the rest of the row, but only as a last resort
/// (`default_end`): a same-pass `word` start always wins first even though the greedy end
/// candidate would otherwise outscore it on content length.
#[derive(Debug)]
struct BlockPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for BlockPhrase {
    fn name(&self) -> &'static str {
        "block"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('[')?;
        Some(Candidate::open(at, at + 1))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        if stream.unparsed.is_empty() {
            None
        } else {
            Some(Candidate::end(0, stream.unparsed.len()).default_end())
        }
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug)]
struct DefaultEndRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for DefaultEndRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

pub fn default_end_grammar() -> Parser {
    let block = Rc::new(BlockPhrase {
        children: OnceCell::new(),
    });
    block
        .children
        .set(vec![Rc::new(WordPhrase) as PhraseRef])
        .expect("children set exactly once during construction");

    let root = Rc::new(DefaultEndRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![block as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::{default_end_grammar, instant_comment_grammar, instant_end_grammar};
    use crate::Shape;

    /// `comment` starts at byte 2 (`#`), after `word`'s match at byte 0 (`ab`); being instant,
    /// `comment` still wins, so `ab` is never committed as its own `word` token — it's gap-filled
    /// as untyped content instead.
    #[test]
    fn an_instant_standalone_candidate_wins_over_a_non_instant_one_at_a_smaller_at() {
        let parser = instant_comment_grammar();
        let result = parser.parse_string("ab# cd\n").unwrap();
        let children: Vec<_> = result.root().children().collect();
        assert_eq!(children[0].id(), None);
        assert_eq!(children[0].content(), "ab");
        assert_eq!(children[1].id(), Some("comment"));
        assert_eq!(children[1].content(), "# cd\n");
    }

    /// Inside the brace, `hashtag` (instant, at offset 1) and the brace's own close (instant, at
    /// offset 4) both exist in the same pass. Per spec.md §4.3.2 rule 1 the instant end
    /// unconditionally pre-empts the instant node/token, so the brace closes at offset 4 and
    /// `hashtag` never fires; the text in between (including the `#`) is gap-filled untyped.
    #[test]
    fn an_instant_end_pre_empts_a_same_pass_instant_node_at_a_smaller_at() {
        let parser = instant_end_grammar();
        let result = parser.parse_string("{ #x }tail\n").unwrap();
        let brace = result.root().children().next().unwrap();
        assert_eq!(brace.shape(), Shape::Node);
        assert_eq!(brace.content(), "{");
        let inner: Vec<_> = brace.children().collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].id(), None);
        assert_eq!(inner[0].content(), " #x ");
        assert_eq!(brace.end().unwrap().content(), "}");
        let tail = result.root().children().nth(1).unwrap();
        assert_eq!(tail.content(), "tail\n");
    }

    /// The block's greedy `default_end` candidate is available from the very first pass, but a
    /// `word` start also matches this pass, so the end defers and `word` wins first — even
    /// though the end's span is longer. Only once `word` stops matching does the end fire.
    #[test]
    fn a_default_end_defers_to_a_same_pass_start_even_when_longer() {
        let parser = default_end_grammar();
        let result = parser.parse_string("[ab!]\n").unwrap();
        let block = result.root().children().next().unwrap();
        assert_eq!(block.shape(), Shape::Node);
        let inner: Vec<_> = block.children().collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].id(), Some("word"));
        assert_eq!(inner[0].content(), "ab");
        assert_eq!(block.end().unwrap().content(), "!]\n");
    }
}

//! Reference grammars used only by this crate's own tests; none of this is part of the engine's
//! public contract. [`scripting_grammar`] (this module) covers the common path: masked
//! whitespace, double-quoted strings, nesting parenthesized groups, and keyword/number/variable
//! classification. [`escaped_string_grammar`] isolates mask-merge. The remaining grammars each
//! isolate one feature the common path never exercises: [`fstring_grammar`] for `SwitchPh`,
//! [`forward_grammar`] for `ForwardTo`, [`wrap_grammar`] for `Candidate::wrapping`,
//! [`directive_grammar`] for `LStrip`/`RTokenize`/`SwitchTo`, [`nullguard_grammar`] for the
//! null-candidate-at-offset-0 rejection rule, [`instant_comment_grammar`]/[`instant_end_grammar`]
//! for `.instant()` cross-shape precedence, [`default_end_grammar`] for `.default_end()`
//! deferral, and [`suffix_grammar`] for `suffix_phrases`.

mod directive;
mod forward;
mod fstring;
mod instant;
mod nullguard;
mod suffix;
mod wrap;

pub use directive::directive_grammar;
pub use forward::forward_grammar;
pub use fstring::fstring_grammar;
pub use instant::{default_end_grammar, instant_comment_grammar, instant_end_grammar};
pub use nullguard::nullguard_grammar;
pub use suffix::suffix_grammar;
pub use wrap::wrap_grammar;

use std::rc::Rc;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::{Candidate, Parser, Phrase, PhraseRef, Stream, TokenizeStream};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|[0-9]+").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n]+").unwrap());
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\.").unwrap());

const KEYWORDS: &[&str] = &["is", "not"];

#[derive(Debug)]
struct WhitespacePhrase;

impl Phrase for WhitespacePhrase {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let m = WHITESPACE_RE.find(stream.unparsed)?;
        Some(Candidate::token(m.start(), m.end()).masked())
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
        let text = m.as_str();
        let id = if KEYWORDS.contains(&text) {
            "keyword"
        } else if text.as_bytes()[0].is_ascii_digit() {
            "number"
        } else {
            "variable"
        };
        Some(Candidate::token(m.start(), m.end()).with_id(id))
    }
}

/// A double-quoted string. Has no sub-phrases of its own; everything between the quotes is
/// attributed through `tokenize`, which demonstrates gap attribution without a nested grammar.
#[derive(Debug)]
struct StringPhrase;

impl Phrase for StringPhrase {
    fn name(&self) -> &'static str {
        "string"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('"')?;
        Some(Candidate::open(at, at + 1).with_id("string"))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('"')?;
        Some(Candidate::end(at, at + 1))
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> Option<&'static str> {
        if stream.remaining().is_empty() {
            None
        } else {
            stream.eat_remain();
            Some("text")
        }
    }
}

/// Matches a backslash followed by any one character, anywhere in the stream, and masks it: its
/// two characters merge into whatever plain content surrounds it rather than surfacing as a
/// token of their own.
#[derive(Debug)]
struct EscapePhrase;

impl Phrase for EscapePhrase {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let m = ESCAPE_RE.find(stream.unparsed)?;
        Some(Candidate::token(m.start(), m.end()).masked())
    }
}

/// A single-quoted string whose only sub-phrase is the backslash escape above, reproducing the
/// mask-invisibility scenario: an escaped quote does not close the string, and the escape's
/// characters merge into the surrounding unescaped text as one inner run.
#[derive(Debug)]
struct EscapedStringPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for EscapedStringPhrase {
    fn name(&self) -> &'static str {
        "estring"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('\'')?;
        Some(Candidate::open(at, at + 1).with_id("estring"))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('\'')?;
        Some(Candidate::end(at, at + 1))
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> Option<&'static str> {
        if stream.remaining().is_empty() {
            None
        } else {
            stream.eat_remain();
            Some("text")
        }
    }
}

#[derive(Debug)]
struct EscapedStringRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for EscapedStringRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// A minimal grammar exercising only the escaped-string scenario, kept separate from
/// [`scripting_grammar`] so its single sub-phrase doesn't compete with words or brackets.
pub fn escaped_string_grammar() -> Parser {
    let string = Rc::new(EscapedStringPhrase {
        children: OnceCell::new(),
    });
    string
        .children
        .set(vec![Rc::new(EscapePhrase) as PhraseRef])
        .expect("children set exactly once during construction");

    let root = Rc::new(EscapedStringRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![string as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

/// A parenthesized group. Recurses into the same phrase set it is itself a member of, the
/// simplest shape a cyclic phrase graph can take.
#[derive(Debug)]
struct BracketPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for BracketPhrase {
    fn name(&self) -> &'static str {
        "bracket"
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
}

#[derive(Debug)]
struct ScriptRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for ScriptRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Build the reference grammar described above.
pub fn scripting_grammar() -> Parser {
    let whitespace: PhraseRef = Rc::new(WhitespacePhrase);
    let string: PhraseRef = Rc::new(StringPhrase);
    let word: PhraseRef = Rc::new(WordPhrase);
    let bracket = Rc::new(BracketPhrase {
        children: OnceCell::new(),
    });
    let root = Rc::new(ScriptRoot {
        children: OnceCell::new(),
    });

    let shared: Vec<PhraseRef> = vec![whitespace, string, bracket.clone() as PhraseRef, word];
    bracket
        .children
        .set(shared.clone())
        .expect("children set exactly once during construction");
    root.children
        .set(shared)
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use indoc::indoc;

    use super::{escaped_string_grammar, scripting_grammar};
    use crate::{ParseResult, Shape, TokenId};

    /// Depth-first content over the whole committed tree, via the same `reader().branch(root)`
    /// traversal a consumer would use — exercises §8's coverage property end to end.
    fn depth_first_content(result: &ParseResult) -> String {
        result
            .reader()
            .branch(crate::TokenIdx::ROOT)
            .iter()
            .map(|t| t.content())
            .collect()
    }

    /// Depth-first `(shape, id, content)` over the whole committed tree, for structural
    /// comparison between two parses of the same input.
    fn depth_first_shape(result: &ParseResult) -> Vec<(Shape, TokenId, String)> {
        result
            .reader()
            .branch(crate::TokenIdx::ROOT)
            .iter()
            .map(|t| (t.shape(), t.id(), t.content().to_string()))
            .collect()
    }

    /// §8's coverage property: concatenating `content` over a depth-first traversal of the
    /// returned root reproduces the original input byte-for-byte, for every grammar and a mix of
    /// closed, unclosed, nested and masked inputs.
    #[test]
    fn depth_first_traversal_covers_every_byte_of_the_input() {
        let cases: &[&str] = &[
            "foo is 42\n",
            "foo is not 42\n",
            "\"hi there\" (a (b) c)\n",
            "\"never closes",
            "(",
        ];
        for text in cases {
            let parser = scripting_grammar();
            let result = parser.parse_string(text).unwrap();
            assert_eq!(&depth_first_content(&result), text, "input: {text:?}");
        }

        let parser = escaped_string_grammar();
        let text = "'a\\'b' tail";
        let result = parser.parse_string(text).unwrap();
        assert_eq!(depth_first_content(&result), text);
    }

    /// §8's idempotence property: parsing the same input with the same configuration twice
    /// produces structurally identical trees.
    #[test]
    fn reparsing_the_same_input_yields_a_structurally_identical_tree() {
        let text = "foo is (bar 1)\nbaz is \"x\"\n";
        let parser = scripting_grammar();
        let first = parser.parse_string(text).unwrap();
        let second = parser.parse_string(text).unwrap();
        assert_eq!(depth_first_shape(&first), depth_first_shape(&second));
    }

    #[test]
    fn parses_a_multi_row_script() {
        let parser = scripting_grammar();
        let text = indoc! {"
            foo is 1
            bar is (foo 2)
        "};
        let result = parser.parse_string(text).unwrap();
        let words: Vec<_> = result
            .root()
            .children()
            .filter(|c| c.id().is_some())
            .map(|c| c.content().to_string())
            .collect();
        assert_eq!(words, vec!["foo", "is", "1", "bar", "is"]);
        let bracket = result
            .root()
            .children()
            .find(|c| c.shape() == Shape::Node)
            .expect("bracket node");
        assert!(bracket.end().is_some());
        let inner_words: Vec<_> = bracket
            .children()
            .filter(|c| c.id().is_some())
            .map(|c| c.content().to_string())
            .collect();
        assert_eq!(inner_words, vec!["foo", "2"]);
    }

    #[test]
    fn classifies_keywords_numbers_and_variables() {
        let parser = scripting_grammar();
        let result = parser.parse_string("foo is not 42\n").unwrap();
        let words: Vec<_> = result
            .root()
            .children()
            .filter(|c| c.id().is_some())
            .map(|c| (c.id(), c.content().to_string()))
            .collect();
        assert_eq!(
            words,
            vec![
                (Some("variable"), "foo".to_string()),
                (Some("keyword"), "is".to_string()),
                (Some("keyword"), "not".to_string()),
                (Some("number"), "42".to_string()),
            ]
        );
    }

    /// Masked whitespace never surfaces as its own token; it merges into the untyped content
    /// attributed to the root on either side of it (spec's mask-invisibility property).
    #[test]
    fn masked_whitespace_merges_into_surrounding_content() {
        let parser = scripting_grammar();
        let result = parser.parse_string("a b\n").unwrap();
        let all: Vec<_> = result.root().children().collect();
        let contents: Vec<_> = all.iter().map(|c| c.content()).collect();
        assert_eq!(contents, vec!["a", " ", "b", "\n"]);
        assert_eq!(all[1].id(), None);
        assert_eq!(all[3].id(), None);
    }

    /// An escaped quote inside the string: the escape sub-phrase wins arbitration over the
    /// literal closing quote (it starts earlier), is masked, and its two characters merge with
    /// the plain text before and after it into a single inner run.
    #[test]
    fn escaped_quote_merges_into_one_inner_run() {
        let parser = escaped_string_grammar();
        let result = parser.parse_string("'a\\'b'").unwrap();
        let string_node = result.root().children().next().unwrap();
        assert_eq!(string_node.id(), Some("estring"));
        let inner: Vec<_> = string_node.children().collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].content(), "a\\'b");
        assert!(string_node.end().is_some());
    }

    #[test]
    fn strings_are_opened_tokenized_and_closed() {
        let parser = scripting_grammar();
        let result = parser.parse_string("\"hi there\"\n").unwrap();
        let string_node = result.root().children().next().unwrap();
        assert_eq!(string_node.shape(), Shape::Node);
        assert_eq!(string_node.id(), Some("string"));
        let inner: Vec<_> = string_node.children().collect();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].content(), "hi there");
        assert!(string_node.end().is_some());
    }

    #[test]
    fn brackets_nest() {
        let parser = scripting_grammar();
        let result = parser.parse_string("(a (b))\n").unwrap();
        let outer = result.root().children().next().unwrap();
        assert_eq!(outer.shape(), Shape::Node);
        let inner_bracket = outer
            .children()
            .find(|c| c.shape() == Shape::Node)
            .expect("nested bracket");
        assert!(inner_bracket.end().is_some());
        assert!(outer.end().is_some());
    }

    #[test]
    fn unclosed_string_is_not_an_error() {
        let parser = scripting_grammar();
        let result = parser.parse_string("\"never closes").unwrap();
        let string_node = result.root().children().next().unwrap();
        assert!(string_node.is_open());
    }
}

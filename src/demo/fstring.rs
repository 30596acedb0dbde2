//! Reproduces spec.md §8 scenario 4: a string phrase that, on seeing an `f` prefix, switches the
//! opened node's governing phrase (and visible identity) to an `fstring` variant allowing a
//! `{...}` sub-phrase whose body re-enters the same word phrase the rest of the grammar uses.

use std::rc::Rc;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::{Candidate, Feature, Parser, Phrase, PhraseRef, Stream, TokenizeStream};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|[0-9]+").unwrap());

#[derive(Debug)]
struct WordPhrase;

impl Phrase for WordPhrase {
    fn name(&self) -> &'static str {
        "word"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let m = WORD_RE.find(stream.unparsed)?;
        let text = m.as_str();
        let id = if text.as_bytes()[0].is_ascii_digit() {
            "number"
        } else {
            "variable"
        };
        Some(Candidate::token(m.start(), m.end()).with_id(id))
    }
}

/// The `{...}` span inside an `fstring` body; its only sub-phrase is the shared word phrase.
#[derive(Debug)]
struct FormatPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for FormatPhrase {
    fn name(&self) -> &'static str {
        "format"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('{')?;
        Some(Candidate::open(at, at + 1))
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('}')?;
        Some(Candidate::end(at, at + 1))
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// The node a `string` start switches into once it has seen an `f` prefix. Its only sub-phrase
/// is [`FormatPhrase`]; everything else is attributed through `tokenize`.
#[derive(Debug)]
struct FStringPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for FStringPhrase {
    fn name(&self) -> &'static str {
        "fstring"
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

/// A single-quoted string. On an `f` prefix, its `starts` candidate carries `SwitchPh` so the
/// node it just opened is reassigned to [`FStringPhrase`] before the next iteration.
#[derive(Debug)]
struct QuoteStringPhrase {
    fstring: OnceCell<PhraseRef>,
}

impl Phrase for QuoteStringPhrase {
    fn name(&self) -> &'static str {
        "string"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        if stream.unparsed.starts_with("f'") {
            let fstring = self.fstring.get()?.clone();
            Some(
                Candidate::open(0, 2)
                    .with_id("fstring")
                    .with_feature(Feature::SwitchPh(fstring)),
            )
        } else if stream.unparsed.starts_with('\'') {
            Some(Candidate::open(0, 1).with_id("string"))
        } else {
            None
        }
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find('\'')?;
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

#[derive(Debug)]
struct FStringRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for FStringRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Build the grammar for the scenario above.
pub fn fstring_grammar() -> Parser {
    let word: PhraseRef = Rc::new(WordPhrase);

    let format = Rc::new(FormatPhrase {
        children: OnceCell::new(),
    });
    format
        .children
        .set(vec![word])
        .expect("children set exactly once during construction");

    let fstring = Rc::new(FStringPhrase {
        children: OnceCell::new(),
    });
    fstring
        .children
        .set(vec![format as PhraseRef])
        .expect("children set exactly once during construction");

    let quote = Rc::new(QuoteStringPhrase {
        fstring: OnceCell::new(),
    });
    quote
        .fstring
        .set(fstring as PhraseRef)
        .expect("fstring set exactly once during construction");

    let root = Rc::new(FStringRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![quote as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::fstring_grammar;

    #[test]
    fn f_prefixed_string_switches_phrase_and_nests_format_content() {
        let parser = fstring_grammar();
        let result = parser.parse_string("f'{42}'").unwrap();

        let fstring_node = result.root().children().next().unwrap();
        assert_eq!(fstring_node.id(), Some("fstring"));
        assert_eq!(fstring_node.phrase().unwrap().name(), "fstring");

        let format_node = fstring_node.children().next().unwrap();
        assert_eq!(format_node.phrase().unwrap().name(), "format");
        assert!(format_node.end().is_some());

        let word = format_node.children().next().unwrap();
        assert_eq!(word.id(), Some("number"));
        assert_eq!(word.content(), "42");

        assert!(fstring_node.end().is_some());
        assert_eq!(fstring_node.end().unwrap().content(), "'");
    }

    #[test]
    fn unprefixed_string_keeps_the_plain_string_phrase() {
        let parser = fstring_grammar();
        let result = parser.parse_string("'hi'").unwrap();
        let node = result.root().children().next().unwrap();
        assert_eq!(node.id(), Some("string"));
        assert_eq!(node.phrase().unwrap().name(), "string");
    }
}

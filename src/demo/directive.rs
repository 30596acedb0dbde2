//! A `!raw` marker demonstrating `LStrip`, `RTokenize` and `SwitchTo` together — the three
//! post-commit features none of the other demo grammars exercise. `LStrip(1)` carves the leading
//! `!` out of the match itself; `RTokenize(2)` forces the two bytes right after the match through
//! the still-active phrase's own `tokenize`; `SwitchTo` then reassigns the node's governing
//! phrase for everything that follows, without touching the node's visible identity.

use std::rc::Rc;

use crate::{Candidate, Feature, Parser, Phrase, PhraseRef, Stream, TokenizeStream};

/// The phrase a `!raw` directive is switched to right after it opens; governs the body once
/// `SwitchTo` has fired, but the node keeps reporting `MarkerPhrase` as its `phrase()`.
#[derive(Debug)]
struct StrictPhrase;

impl Phrase for StrictPhrase {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find(';')?;
        Some(Candidate::end(at, at + 1))
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> Option<&'static str> {
        if stream.remaining().is_empty() {
            None
        } else {
            stream.eat_remain();
            Some("strict")
        }
    }
}

#[derive(Debug)]
struct MarkerPhrase {
    strict: PhraseRef,
}

impl Phrase for MarkerPhrase {
    fn name(&self) -> &'static str {
        "directive"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find("!raw")?;
        Some(
            Candidate::open(at, at + 4)
                .with_id("directive")
                .with_feature(Feature::LStrip(1))
                .with_feature(Feature::RTokenize(2))
                .with_feature(Feature::SwitchTo(self.strict.clone())),
        )
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find(';')?;
        Some(Candidate::end(at, at + 1))
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> Option<&'static str> {
        if stream.remaining().is_empty() {
            None
        } else {
            stream.eat_remain();
            Some("pre")
        }
    }
}

#[derive(Debug)]
struct DirectiveRoot {
    children: Vec<PhraseRef>,
}

impl Phrase for DirectiveRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        &self.children
    }
}

/// Build the grammar for the scenario above.
pub fn directive_grammar() -> Parser {
    let strict: PhraseRef = Rc::new(StrictPhrase);
    let marker: PhraseRef = Rc::new(MarkerPhrase { strict });
    let root = Rc::new(DirectiveRoot { children: vec![marker] });
    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::directive_grammar;

    #[test]
    fn lstrip_rtokenize_and_switch_to_compose() {
        let parser = directive_grammar();
        let result = parser.parse_string("!rawXYhello;").unwrap();

        let prefix = result.root().children().next().unwrap();
        assert_eq!(prefix.content(), "!");
        assert_eq!(prefix.id(), None);

        let node = result.root().children().nth(1).unwrap();
        assert_eq!(node.id(), Some("directive"));
        assert_eq!(node.content(), "raw");
        // SwitchTo never touches the node's stored phrase identity, only the frame that drives it.
        assert_eq!(node.phrase().unwrap().name(), "directive");

        let body: Vec<_> = node.children().map(|c| (c.id(), c.content())).collect();
        assert_eq!(body, vec![(Some("pre"), "XY"), (Some("strict"), "hello")]);

        assert_eq!(node.end().unwrap().content(), ";");
    }
}

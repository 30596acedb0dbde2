//! A tag phrase that peeks at a fixed-width prefix to decide which of two named node phrases
//! applies, then commits that decision as a `wrapping` candidate: an empty structural node opened
//! by the peeking phrase itself, with the real tag node as its sole child. Exercises the
//! `commit_wrap` path `driver.rs` implements for `Candidate::wrapping`, untouched by the other
//! demo grammars.

use std::rc::Rc;

use crate::{Candidate, Parser, Phrase, PhraseRef, Stream};

/// A concrete `<b>...</b>` or `<i>...</i>` tag, committed as the child of the wrapper below.
#[derive(Debug)]
struct NamedTagPhrase {
    tag: &'static str,
    close: &'static str,
}

impl Phrase for NamedTagPhrase {
    fn name(&self) -> &'static str {
        self.tag
    }

    fn ends(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find(self.close)?;
        Some(Candidate::end(at, at + self.close.len()))
    }
}

/// Peeks at a `<b>`/`<i>` prefix and wraps the matching named tag phrase. Also governs the
/// wrapper node itself, which it closes immediately (zero-width) the next time it is consulted
/// as the active phrase — there is nothing further for the wrapper to hold.
#[derive(Debug)]
struct PeekTagPhrase {
    bold: PhraseRef,
    italic: PhraseRef,
}

impl Phrase for PeekTagPhrase {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        if stream.unparsed.starts_with("<b>") {
            let inner = Candidate::start(self.bold.clone(), 0, 3).with_id("bold");
            Some(Candidate::open(0, 3).wrapping(inner))
        } else if stream.unparsed.starts_with("<i>") {
            let inner = Candidate::start(self.italic.clone(), 0, 3).with_id("italic");
            Some(Candidate::open(0, 3).wrapping(inner))
        } else {
            None
        }
    }

    fn ends(&self, _stream: &Stream) -> Option<Candidate> {
        Some(Candidate::end(0, 0))
    }
}

#[derive(Debug)]
struct TagRoot {
    children: Vec<PhraseRef>,
}

impl Phrase for TagRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        &self.children
    }
}

/// Build the grammar for the scenario above.
pub fn wrap_grammar() -> Parser {
    let bold: PhraseRef = Rc::new(NamedTagPhrase {
        tag: "bold",
        close: "</b>",
    });
    let italic: PhraseRef = Rc::new(NamedTagPhrase {
        tag: "italic",
        close: "</i>",
    });
    let tag: PhraseRef = Rc::new(PeekTagPhrase { bold, italic });
    let root = Rc::new(TagRoot { children: vec![tag] });

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::wrap_grammar;

    #[test]
    fn wrapper_is_empty_and_the_wrapped_tag_carries_the_real_span() {
        let parser = wrap_grammar();
        let result = parser.parse_string("<b>hi</b>!").unwrap();

        let wrapper = result.root().children().next().unwrap();
        assert_eq!(wrapper.content(), "");
        assert_eq!(wrapper.phrase().unwrap().name(), "tag");
        assert!(wrapper.end().is_some());
        assert_eq!(wrapper.end().unwrap().content(), "");

        let bold = wrapper.children().next().unwrap();
        assert_eq!(bold.id(), Some("bold"));
        assert_eq!(bold.content(), "<b>");
        assert_eq!(bold.phrase().unwrap().name(), "bold");
        let inner_text = bold.children().next().unwrap();
        assert_eq!(inner_text.content(), "hi");
        assert_eq!(bold.end().unwrap().content(), "</b>");

        let trailing = result.root().children().nth(1).unwrap();
        assert_eq!(trailing.content(), "!");
    }

    #[test]
    fn italic_tag_wraps_the_same_way() {
        let parser = wrap_grammar();
        let result = parser.parse_string("<i>ok</i>").unwrap();
        let wrapper = result.root().children().next().unwrap();
        let italic = wrapper.children().next().unwrap();
        assert_eq!(italic.id(), Some("italic"));
        assert_eq!(italic.content(), "<i>");
        assert_eq!(italic.end().unwrap().content(), "</i>");
    }
}

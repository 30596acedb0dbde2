//! A brace-delimited block that may nest, plus a `break;` marker whose candidate carries
//! `ForwardTo` to re-anchor the active frame at its immediate parent block, abandoning whatever
//! block was innermost at the time. Exercises the re-anchoring path `driver.rs` implements for
//! `Feature::ForwardTo`, which none of the other demo grammars touch.

use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::{Candidate, Feature, Parser, Phrase, PhraseRef, Stream};

#[derive(Debug)]
struct BreakPhrase;

impl Phrase for BreakPhrase {
    fn name(&self) -> &'static str {
        "break"
    }

    fn starts(&self, stream: &Stream) -> Option<Candidate> {
        let at = stream.unparsed.find("break;")?;
        let target = stream.active_node().parent()?;
        Some(Candidate::token(at, at + 6).with_feature(Feature::ForwardTo(target.idx())))
    }
}

/// A `{ ... }` block. Recurses into itself, and accepts `break;` as a sub-phrase that forwards
/// control to the block's own parent.
#[derive(Debug)]
struct BlockPhrase {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for BlockPhrase {
    fn name(&self) -> &'static str {
        "block"
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

#[derive(Debug)]
struct ForwardRoot {
    children: OnceCell<Vec<PhraseRef>>,
}

impl Phrase for ForwardRoot {
    fn name(&self) -> &'static str {
        "root"
    }

    fn sub_phrases(&self) -> &[PhraseRef] {
        self.children.get().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Build the grammar for the scenario above.
pub fn forward_grammar() -> Parser {
    let block = Rc::new(BlockPhrase {
        children: OnceCell::new(),
    });
    let shared: Vec<PhraseRef> = vec![block.clone() as PhraseRef, Rc::new(BreakPhrase)];
    block
        .children
        .set(shared.clone())
        .expect("children set exactly once during construction");

    let root = Rc::new(ForwardRoot {
        children: OnceCell::new(),
    });
    root.children
        .set(vec![block as PhraseRef])
        .expect("children set exactly once during construction");

    Parser::new(root).expect("root declares sub-phrases")
}

#[cfg(test)]
mod __tests__ {
    use super::forward_grammar;
    use crate::Shape;

    /// `break;` inside the inner block forwards to the outer block: the outer block's closing
    /// brace (the one immediately following `break;`) now closes the *outer* block, leaving the
    /// inner block abandoned on the stack — still open when the parse finishes — and everything
    /// after the outer's close falls back to the root as plain content.
    #[test]
    fn break_forwards_to_the_parent_block_and_abandons_the_inner_one() {
        let parser = forward_grammar();
        let result = parser.parse_string("{ a { break; } b }!").unwrap();

        let outer = result.root().children().next().unwrap();
        assert_eq!(outer.shape(), Shape::Node);
        assert!(outer.end().is_some());
        assert_eq!(outer.end().unwrap().content(), "}");

        let inner = outer
            .children()
            .find(|c| c.shape() == Shape::Node)
            .expect("inner block committed before the break");
        assert!(inner.is_open());
        assert!(inner.end().is_none());

        let break_token = inner
            .children()
            .find(|c| c.content() == "break;")
            .expect("break token attributed to the inner block");
        assert_eq!(break_token.content(), "break;");

        let trailing: Vec<_> = result.root().children().skip(1).map(|c| c.content()).collect();
        assert_eq!(trailing, vec![" b }!"]);
    }
}

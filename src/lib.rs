//! Phrase parsing tool (phrase_pt) is a library for driving a user-configurable syntax parser
//! over an input text to produce a tree of tokens and nodes annotated with source coordinates.
//!
//! # Overview
//! A phrase describes how a lexical construct begins ([`Phrase::starts`]), what can appear
//! inside it ([`Phrase::sub_phrases`]), and how it ends ([`Phrase::ends`]). The engine drives a
//! set of phrases over the input row by row, arbitrating among the candidate matches those hooks
//! return with a strict priority scheme, and assembling the winners into a tree of tokens rooted
//! at a synthetic root node.
//!
//! Writing a grammar with this crate means implementing [`Phrase`] for each lexical construct of
//! the language and wiring them together through `sub_phrases`/`suffix_phrases` — the same way one
//! would wire production utilities together in a recursive-descent library — except here each
//! phrase owns the full start/end/tokenize lifecycle of the construct it describes, rather than a
//! single parse step.
//!
//! # Design
//!
//! The engine itself has no built-in grammar: it does not recognize comments, strings, or
//! numbers. It only guarantees termination and a structurally well-formed result — every
//! character of the input appears exactly once in the depth-first content of the returned tree.
//! Concrete phrase implementations (regex-driven matchers, keyword tables, ...) are an external
//! concern; [`demo`] bundles a small reference grammar used only by this crate's own tests.
//!
//! # Example
//!
//! ```
//! use phrase_pt::demo::scripting_grammar;
//!
//! let parser = scripting_grammar();
//! let result = parser.parse_string("foo is 42\n").unwrap();
//! assert!(result.root().children().count() > 0);
//! ```
//!
//! # License
//! [phrase_pt](crate) is provided under the MIT license. See [LICENSE](https://github.com/creative-forest/phrase-pt/blob/main/LICENSE).

mod candidate;
mod coord;
pub mod demo;
mod driver;
mod error;
mod index;
mod parser;
mod phrase;
mod reader;
mod stream;
mod token;
pub mod util;

use std::fmt::Debug;
use std::rc::Rc;

/// A triple identifying a position in the input: 0-based row, 0-based character column within
/// that row, and the absolute byte offset from the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub column: usize,
    pub offset: usize,
}

/// An optional, compile-time classification attached to a token (e.g. `"number"`, `"keyword"`).
pub type TokenId = Option<&'static str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// An opaque reference into the arena of committed tokens produced by a parse.
pub struct TokenIdx(pub(crate) usize);

impl TokenIdx {
    /// The synthetic root node every parse begins with.
    pub const ROOT: TokenIdx = TokenIdx(0);
}

/// The three token shapes a phrase hook can return a candidate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A leaf token representing a tokenized span of text.
    Plain,
    /// A branch token that owns an ordered list of inner children and a single end slot.
    Node,
    /// A leaf token that terminates the enclosing node.
    End,
}

/// Distinguishes a real, phrase-produced close from the two kinds of close the driver
/// synthesizes once the input runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    /// Closed by a winning end candidate.
    Real,
    /// Still open when the input ran out; this is an `OpenEndToken`.
    Open,
    /// The root's own closing token, synthesized at finalize.
    Eof,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum EndSlot {
    Open,
    Closed(TokenIdx),
}

pub(crate) struct TokenMeta {
    pub content: Box<str>,
    pub start: Coord,
    pub end: Coord,
    pub parent: Option<TokenIdx>,
    pub inner_index: usize,
    pub id: TokenId,
}

pub(crate) struct PlainData {
    pub meta: TokenMeta,
    pub o_token: bool,
}

pub(crate) struct NodeData {
    pub meta: TokenMeta,
    pub phrase: PhraseRef,
    pub extras: serde_json::Value,
    pub inner: Vec<TokenIdx>,
    pub end: EndSlot,
}

pub(crate) struct EndData {
    pub meta: TokenMeta,
    pub kind: EndKind,
}

pub(crate) enum Entry {
    Plain(PlainData),
    Node(NodeData),
    End(EndData),
}

/// The arena of committed tokens produced by a parse. Opaque; read through [`TokenView`],
/// [`TokenIndex`] or [`TokenReader`].
pub struct Document {
    pub(crate) entries: Vec<Entry>,
}

/// A read-only, row-bound window over the unparsed input passed to [`Phrase::starts`] and
/// [`Phrase::ends`]. Never mutates committed state; any advancement is expressed as a returned
/// [`Candidate`].
pub struct Stream<'d> {
    pub unparsed: &'d str,
    pub row_no: usize,
    pub column: usize,
    pub(crate) doc: &'d Document,
    pub(crate) active: TokenIdx,
}

/// A finite span handed to [`Phrase::tokenize`], consumed one slice at a time via
/// [`TokenizeStream::eat`] / [`TokenizeStream::eat_remain`].
pub struct TokenizeStream<'s> {
    pub(crate) text: &'s str,
    pub(crate) consumed: usize,
}

/// A read-only view of a single committed token, addressed by [`TokenIdx`] into a [`Document`].
#[derive(Clone, Copy)]
pub struct TokenView<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) idx: TokenIdx,
}

/// A mutable, narrow handle to a just-committed node, passed to [`Phrase::at_start`] and
/// [`Phrase::at_end`]. The only committed state a hook may change through it is the node's
/// `extras` bag.
pub struct NodeHandle<'a> {
    pub(crate) doc: &'a mut Document,
    pub(crate) idx: TokenIdx,
}

/// A user configuration object describing how a lexical construct opens, what can appear inside
/// it, and how it closes.
///
/// Phrase objects may reference one another to form cycles, to express recursive grammar; model
/// such references as shared [`Rc`]s, never as copies.
pub trait Phrase: Debug {
    /// A short name used only for diagnostics.
    fn name(&self) -> &'static str;

    /// Inspect the unparsed window and propose where this phrase could start, or a standalone
    /// plain-token match. Returns `None` if this phrase does not match at the current viewpoint.
    fn starts(&self, _stream: &Stream) -> Option<Candidate> {
        None
    }

    /// Propose a close for *this* phrase. Only consulted when this phrase is the currently
    /// active one.
    fn ends(&self, _stream: &Stream) -> Option<Candidate> {
        None
    }

    /// Classify a pending raw run of characters into a typed plain token. Called repeatedly by
    /// the driver until the tokenize stream's span is exhausted or this returns `None`, in which
    /// case the remainder of the span is attributed as an untyped plain token.
    fn tokenize(&self, _stream: &mut TokenizeStream) -> Option<&'static str> {
        None
    }

    /// Child phrases evaluated inside nodes opened by this phrase.
    fn sub_phrases(&self) -> &[PhraseRef] {
        &[]
    }

    /// Phrases evaluated immediately after this phrase has just closed, for continuations
    /// attached to the closing node.
    fn suffix_phrases(&self) -> &[PhraseRef] {
        &[]
    }

    /// Observer hook invoked right after a node opened by this phrase is committed.
    fn at_start(&self, _node: NodeHandle) {}
    /// Observer hook invoked right after a node opened by this phrase is closed.
    fn at_end(&self, _node: NodeHandle) {}
    /// Observer hook invoked right after any token produced by this phrase is committed, before
    /// feature application.
    fn at_confirmed(&self, _token: TokenView) {}
    /// Observer hook invoked right after feature application for a token produced by this phrase.
    fn at_featurized(&self, _token: TokenView) {}
}

/// A shared, possibly cyclic, reference to a [`Phrase`].
pub type PhraseRef = Rc<dyn Phrase>;

/// The single typed error the crate surfaces: a candidate or configuration violated one of the
/// engine's invariants. Hook panics are not wrapped here — they propagate to the caller
/// unchanged, and an unclosed phrase at end of input is not an error at all.
#[derive(Debug)]
pub struct ConfigError {
    pub what: &'static str,
    pub message: String,
}

/// The result of a successful parse: the committed token arena plus the index built over it.
pub struct ParseResult {
    pub(crate) index: TokenIndex,
}

/// A post-parse index over a committed [`Document`]: per-row token membership for coordinate
/// lookups, and a depth-first flat ordering for [`TokenReader`] traversal.
pub struct TokenIndex {
    pub(crate) doc: Document,
    pub(crate) rows: Vec<RowRecord>,
    pub(crate) flat: Vec<TokenIdx>,
}

pub(crate) struct RowRecord {
    pub tokens: Vec<TokenIdx>,
}

/// A read-only traversal helper over a committed [`Document`], addressing tokens by their
/// position in depth-first order.
pub struct TokenReader<'a> {
    pub(crate) index: &'a TokenIndex,
}

/// Bundles a root [`Phrase`] configuration and drives it over an input.
pub struct Parser {
    pub(crate) root: PhraseRef,
}

/// A candidate match returned by [`Phrase::starts`] or [`Phrase::ends`], relative to the
/// [`Stream`] it was produced from (`at`/`to` are byte offsets into `Stream::unparsed`).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub(crate) shape: Shape,
    pub(crate) at: usize,
    pub(crate) to: usize,
    pub(crate) id: TokenId,
    pub(crate) phrase: Option<PhraseRef>,
    pub(crate) mask: bool,
    pub(crate) instant: bool,
    pub(crate) default_end: bool,
    pub(crate) features: Vec<Feature>,
    pub(crate) wraps: Option<Box<Candidate>>,
}

/// Post-commit adjustments a candidate can request. Applied in declaration order after a
/// candidate wins arbitration and is committed.
#[derive(Debug, Clone)]
pub enum Feature {
    /// Carve an additional `n` bytes immediately before the match into their own untyped plain
    /// token, beyond the automatic `[0, at)` gap fill.
    LStrip(usize),
    /// Feed the next `n` bytes after the match into the newly active node's `tokenize` hook.
    RTokenize(usize),
    /// Reassign the active node's governing behaviour without changing its visible identity.
    SwitchTo(PhraseRef),
    /// Reassign the active node's governing behaviour and its visible phrase identity.
    SwitchPh(PhraseRef),
    /// Re-anchor the active frame to an already-open ancestor, abandoning any frames above it.
    ForwardTo(TokenIdx),
}

use crate::{Candidate, Feature, PhraseRef, Shape};

impl Candidate {
    fn bare(shape: Shape, at: usize, to: usize) -> Self {
        Self {
            shape,
            at,
            to,
            id: None,
            phrase: None,
            mask: false,
            instant: false,
            default_end: false,
            features: Vec::new(),
            wraps: None,
        }
    }

    /// A candidate opening a node governed by `phrase`, spanning `[at, to)` of the stream.
    pub fn start(phrase: PhraseRef, at: usize, to: usize) -> Self {
        let mut c = Self::bare(Shape::Node, at, to);
        c.phrase = Some(phrase);
        c
    }

    /// A candidate opening a node governed by the phrase that produced it — the common case
    /// for a phrase whose `starts()` opens one of its own nodes, letting the driver fill in the
    /// phrase reference rather than requiring a self-`Rc`.
    pub fn open(at: usize, to: usize) -> Self {
        Self::bare(Shape::Node, at, to)
    }

    /// A candidate closing the active node, spanning `[at, to)` of the stream.
    pub fn end(at: usize, to: usize) -> Self {
        Self::bare(Shape::End, at, to)
    }

    /// A standalone plain-token candidate that does not open a phrase, spanning `[at, to)`.
    pub fn token(at: usize, to: usize) -> Self {
        Self::bare(Shape::Plain, at, to)
    }

    pub fn with_id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    /// Mark this candidate as invisible: its content is still committed, but attributed
    /// directly to the parent rather than opening/standing as its own token.
    pub fn masked(mut self) -> Self {
        self.mask = true;
        self
    }

    /// Mark this candidate as dominant for this pass, pre-empting every non-instant candidate
    /// regardless of position.
    pub fn instant(mut self) -> Self {
        self.instant = true;
        self
    }

    /// Only for end candidates: defer to any start candidate this pass produces, closing the
    /// active node only when no start competes.
    pub fn default_end(mut self) -> Self {
        self.default_end = true;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Wrap `inner` in an empty structural shell opened by this (node-shaped) candidate; the
    /// wrapped candidate becomes the active node immediately after the wrapper is committed.
    pub fn wrapping(mut self, inner: Candidate) -> Self {
        self.wraps = Some(Box::new(inner));
        self
    }

    pub(crate) fn is_null(&self) -> bool {
        self.at == self.to
    }
}

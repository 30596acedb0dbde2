use crate::{Document, Stream, TokenIdx, TokenView, TokenizeStream};

impl<'d> Stream<'d> {
    pub(crate) fn new(doc: &'d Document, active: TokenIdx, unparsed: &'d str, row_no: usize, column: usize) -> Self {
        Self {
            unparsed,
            row_no,
            column,
            doc,
            active,
        }
    }

    /// A view of the node this stream's candidates would be attributed to.
    pub fn active_node(&self) -> TokenView<'d> {
        self.doc.view(self.active)
    }

    /// The last token committed as a child of the active node, if any.
    pub fn previous_sibling(&self) -> Option<TokenView<'d>> {
        self.active_node().children().last()
    }

    pub fn is_row_start(&self) -> bool {
        self.column == 0
    }
}

impl<'s> TokenizeStream<'s> {
    pub(crate) fn new(text: &'s str) -> Self {
        Self { text, consumed: 0 }
    }

    /// Bytes not yet classified.
    pub fn remaining(&self) -> &'s str {
        &self.text[self.consumed..]
    }

    /// Consume and return the next `n` bytes of the span. Panics if `n` does not land on a
    /// char boundary or would run past the span — a phrase author error.
    pub fn eat(&mut self, n: usize) -> &'s str {
        let slice = &self.remaining()[..n];
        self.consumed += n;
        slice
    }

    /// Consume and return everything left in the span.
    pub fn eat_remain(&mut self) -> &'s str {
        let slice = self.remaining();
        self.consumed = self.text.len();
        slice
    }
}

use crate::{Document, Entry, RowRecord, TokenIdx, TokenIndex, TokenView};

impl TokenIndex {
    pub(crate) fn build(doc: Document) -> Self {
        let rows = build_rows(&doc);
        let mut flat = Vec::new();
        build_flat(&doc, TokenIdx::ROOT, &mut flat);
        Self { doc, rows, flat }
    }

    pub fn root(&self) -> TokenView<'_> {
        self.doc.view(TokenIdx::ROOT)
    }

    pub fn token(&self, idx: TokenIdx) -> TokenView<'_> {
        self.doc.view(idx)
    }

    /// The innermost token whose span covers `coord`'s row and column, if the row was recorded.
    pub fn get_token_at_coord(&self, row_no: usize, column: usize) -> Option<TokenView<'_>> {
        let row = self.rows.get(row_no)?;
        row.tokens
            .iter()
            .rev()
            .find(|&&idx| {
                let meta = self.doc.meta(idx);
                let starts_before = meta.start.row < row_no
                    || (meta.start.row == row_no && meta.start.column <= column);
                let ends_after = meta.end.row > row_no
                    || (meta.end.row == row_no && meta.end.column > column);
                starts_before && ends_after
            })
            .map(|&idx| self.doc.view(idx))
    }

    /// The innermost token whose span covers the given absolute byte offset.
    pub fn get_token_at_cursor(&self, offset: usize) -> Option<TokenView<'_>> {
        let candidates = self.doc.entries.iter().enumerate().filter(|(_, e)| {
            let meta = match e {
                Entry::Plain(p) => &p.meta,
                Entry::Node(n) => &n.meta,
                Entry::End(e) => &e.meta,
            };
            meta.start.offset <= offset && offset < meta.end.offset
        });
        candidates
            .max_by_key(|(_, e)| match e {
                Entry::Plain(p) => p.meta.start.offset,
                Entry::Node(n) => n.meta.start.offset,
                Entry::End(e) => e.meta.start.offset,
            })
            .map(|(i, _)| self.doc.view(TokenIdx(i)))
    }

    /// Render the committed tree rooted at `root()` to stdout.
    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(&self.root())
    }
}

fn build_rows(doc: &Document) -> Vec<RowRecord> {
    let mut max_row = 0usize;
    for entry in &doc.entries {
        let meta = match entry {
            Entry::Plain(p) => &p.meta,
            Entry::Node(n) => &n.meta,
            Entry::End(e) => &e.meta,
        };
        max_row = max_row.max(meta.start.row).max(meta.end.row);
    }
    let mut rows: Vec<RowRecord> = (0..=max_row).map(|_| RowRecord { tokens: Vec::new() }).collect();
    for (i, entry) in doc.entries.iter().enumerate() {
        let meta = match entry {
            Entry::Plain(p) => &p.meta,
            Entry::Node(n) => &n.meta,
            Entry::End(e) => &e.meta,
        };
        for row_no in meta.start.row..=meta.end.row {
            rows[row_no].tokens.push(TokenIdx(i));
        }
    }
    rows
}

fn build_flat(doc: &Document, idx: TokenIdx, out: &mut Vec<TokenIdx>) {
    out.push(idx);
    if let Entry::Node(n) = doc.entry(idx) {
        for &child in &n.inner {
            build_flat(doc, child, out);
        }
        if let crate::EndSlot::Closed(end_idx) = n.end {
            out.push(end_idx);
        }
    }
}

#[cfg(test)]
mod __tests__ {
    use crate::demo::scripting_grammar;
    use crate::Shape;

    #[test]
    fn coord_lookup_finds_the_innermost_covering_token() {
        let parser = scripting_grammar();
        let result = parser.parse_string("foo is (bar)\n").unwrap();
        let index = result.index();

        // column 1 of row 0 is inside the `foo` word token.
        let word = index.get_token_at_coord(0, 1).expect("token at (0, 1)");
        assert_eq!(word.content(), "foo");

        // column 9 sits on `bar`, nested inside the bracket node.
        let inner = index.get_token_at_coord(0, 9).expect("token at (0, 9)");
        assert_eq!(inner.content(), "bar");
        assert_eq!(inner.parent().unwrap().shape(), Shape::Node);

        assert!(index.get_token_at_coord(5, 0).is_none());
    }

    #[test]
    fn cursor_lookup_finds_the_token_covering_a_byte_offset() {
        let parser = scripting_grammar();
        let result = parser.parse_string("foo is 42\n").unwrap();
        let index = result.index();

        let at_0 = index.get_token_at_cursor(0).expect("token at offset 0");
        assert_eq!(at_0.content(), "foo");

        let at_7 = index.get_token_at_cursor(7).expect("token at offset 7");
        assert_eq!(at_7.content(), "42");
    }
}

use crate::{Entry, TokenIdx, TokenIndex, TokenReader, TokenView};

impl<'a> TokenReader<'a> {
    pub(crate) fn new(index: &'a TokenIndex) -> Self {
        Self { index }
    }

    fn position_of(&self, idx: TokenIdx) -> usize {
        self.index
            .flat
            .iter()
            .position(|&i| i == idx)
            .expect("idx must belong to this reader's document")
    }

    /// Every token committed strictly after `idx`, in depth-first order.
    pub fn thereafter(&self, idx: TokenIdx) -> impl Iterator<Item = TokenView<'a>> + 'a {
        let index = self.index;
        let pos = self.position_of(idx);
        index.flat[pos + 1..].iter().map(move |&i| index.token(i))
    }

    /// Every token committed strictly before `idx`, in depth-first order.
    pub fn therebefore(&self, idx: TokenIdx) -> impl Iterator<Item = TokenView<'a>> + 'a {
        let index = self.index;
        let pos = self.position_of(idx);
        index.flat[..pos].iter().map(move |&i| index.token(i))
    }

    /// The direct and indirect children of a node, in depth-first order (excludes its end token).
    pub fn inner(&self, idx: TokenIdx) -> Vec<TokenView<'a>> {
        match self.index.doc.entry(idx) {
            Entry::Node(n) => {
                let mut out = Vec::new();
                for &child in &n.inner {
                    collect_subtree(self.index, child, &mut out);
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// A node together with its full subtree and its own end token.
    pub fn branch(&self, idx: TokenIdx) -> Vec<TokenView<'a>> {
        let mut out = vec![self.index.token(idx)];
        out.extend(self.inner(idx));
        if let Entry::Node(n) = self.index.doc.entry(idx) {
            if let crate::EndSlot::Closed(end_idx) = n.end {
                out.push(self.index.token(end_idx));
            }
        }
        out
    }

    /// The ancestor chain from the root down to (and including) `idx`.
    pub fn node_path(&self, idx: TokenIdx) -> Vec<TokenView<'a>> {
        let mut out = Vec::new();
        let mut cur = Some(idx);
        while let Some(i) = cur {
            out.push(self.index.token(i));
            cur = self.index.doc.meta(i).parent;
        }
        out.reverse();
        out
    }
}

fn collect_subtree<'a>(index: &'a TokenIndex, idx: TokenIdx, out: &mut Vec<TokenView<'a>>) {
    out.push(index.token(idx));
    if let Entry::Node(n) = index.doc.entry(idx) {
        for &child in &n.inner {
            collect_subtree(index, child, out);
        }
        if let crate::EndSlot::Closed(end_idx) = n.end {
            out.push(index.token(end_idx));
        }
    }
}

#[cfg(test)]
mod __tests__ {
    use crate::demo::scripting_grammar;
    use crate::Shape;

    #[test]
    fn thereafter_and_therebefore_partition_the_flat_order_around_an_anchor() {
        let parser = scripting_grammar();
        let result = parser.parse_string("foo is 42\n").unwrap();
        let reader = result.reader();

        let is_token = result
            .root()
            .children()
            .find(|c| c.content() == "is")
            .unwrap();

        let before: Vec<_> = reader.therebefore(is_token.idx()).map(|t| t.content().to_string()).collect();
        assert_eq!(before, vec!["", "foo", " "]);

        let after: Vec<_> = reader.thereafter(is_token.idx()).map(|t| t.content().to_string()).collect();
        assert_eq!(after, vec![" ", "42", "\n", ""]);
    }

    #[test]
    fn inner_and_branch_include_the_end_token_only_for_branch() {
        let parser = scripting_grammar();
        let result = parser.parse_string("(a 1)\n").unwrap();
        let bracket = result
            .root()
            .children()
            .find(|c| c.shape() == Shape::Node)
            .unwrap();
        let reader = result.reader();

        let inner: Vec<_> = reader.inner(bracket.idx()).iter().map(|t| t.content().to_string()).collect();
        assert_eq!(inner, vec!["a", " ", "1"]);

        let branch: Vec<_> = reader.branch(bracket.idx()).iter().map(|t| t.content().to_string()).collect();
        assert_eq!(branch, vec!["(", "a", " ", "1", ")"]);
    }

    #[test]
    fn node_path_walks_root_to_anchor() {
        let parser = scripting_grammar();
        let result = parser.parse_string("(a)\n").unwrap();
        let bracket = result
            .root()
            .children()
            .find(|c| c.shape() == Shape::Node)
            .unwrap();
        let inner_word = bracket.children().next().unwrap();
        let reader = result.reader();

        let path: Vec<_> = reader
            .node_path(inner_word.idx())
            .iter()
            .map(|t| t.shape())
            .collect();
        assert_eq!(path, vec![Shape::Node, Shape::Node, Shape::Plain]);
    }
}

use crate::{
    Coord, Document, EndData, EndKind, EndSlot, Entry, NodeData, NodeHandle, Phrase, PhraseRef,
    PlainData, Shape, TokenId, TokenIdx, TokenMeta, TokenView,
};

impl Document {
    pub(crate) fn new_root(phrase: PhraseRef) -> Self {
        let root = NodeData {
            meta: TokenMeta {
                content: "".into(),
                start: Coord::origin(),
                end: Coord::origin(),
                parent: None,
                inner_index: 0,
                id: None,
            },
            phrase,
            extras: serde_json::Value::Object(serde_json::Map::new()),
            inner: Vec::new(),
            end: EndSlot::Open,
        };
        Self {
            entries: vec![Entry::Node(root)],
        }
    }

    pub(crate) fn entry(&self, idx: TokenIdx) -> &Entry {
        &self.entries[idx.0]
    }

    pub(crate) fn entry_mut(&mut self, idx: TokenIdx) -> &mut Entry {
        &mut self.entries[idx.0]
    }

    pub(crate) fn meta(&self, idx: TokenIdx) -> &TokenMeta {
        match self.entry(idx) {
            Entry::Plain(p) => &p.meta,
            Entry::Node(n) => &n.meta,
            Entry::End(e) => &e.meta,
        }
    }

    pub(crate) fn shape(&self, idx: TokenIdx) -> Shape {
        match self.entry(idx) {
            Entry::Plain(_) => Shape::Plain,
            Entry::Node(_) => Shape::Node,
            Entry::End(_) => Shape::End,
        }
    }

    /// Append a new entry as the next child of `parent`, stamping its `inner_index`.
    fn attach(&mut self, parent: TokenIdx, mut entry: Entry) -> TokenIdx {
        let idx = TokenIdx(self.entries.len());
        let inner_index = match self.entry(parent) {
            Entry::Node(n) => n.inner.len(),
            _ => unreachable!("only a node can receive children"),
        };
        match &mut entry {
            Entry::Plain(p) => {
                p.meta.parent = Some(parent);
                p.meta.inner_index = inner_index;
            }
            Entry::Node(n) => {
                n.meta.parent = Some(parent);
                n.meta.inner_index = inner_index;
            }
            Entry::End(e) => {
                e.meta.parent = Some(parent);
                e.meta.inner_index = inner_index;
            }
        }
        self.entries.push(entry);
        if let Entry::Node(n) = self.entry_mut(parent) {
            n.inner.push(idx);
        }
        idx
    }

    pub(crate) fn push_plain(
        &mut self,
        parent: TokenIdx,
        content: &str,
        start: Coord,
        end: Coord,
        id: TokenId,
        o_token: bool,
    ) -> TokenIdx {
        let entry = Entry::Plain(PlainData {
            meta: TokenMeta {
                content: content.into(),
                start,
                end,
                parent: None,
                inner_index: 0,
                id,
            },
            o_token,
        });
        self.attach(parent, entry)
    }

    pub(crate) fn open_node(
        &mut self,
        parent: TokenIdx,
        phrase: PhraseRef,
        content: &str,
        start: Coord,
        end: Coord,
        id: TokenId,
    ) -> TokenIdx {
        let entry = Entry::Node(NodeData {
            meta: TokenMeta {
                content: content.into(),
                start,
                end,
                parent: None,
                inner_index: 0,
                id,
            },
            phrase,
            extras: serde_json::Value::Object(serde_json::Map::new()),
            inner: Vec::new(),
            end: EndSlot::Open,
        });
        self.attach(parent, entry)
    }

    /// Close `node` with an end token and return the end token's index.
    pub(crate) fn close_node(
        &mut self,
        node: TokenIdx,
        kind: EndKind,
        content: &str,
        start: Coord,
        end: Coord,
    ) -> TokenIdx {
        let entry = Entry::End(EndData {
            meta: TokenMeta {
                content: content.into(),
                start,
                end,
                parent: None,
                inner_index: 0,
                id: None,
            },
            kind,
        });
        let end_idx = self.attach(node, entry);
        // an end token is not a regular child: pull it back out of `inner` and into the node's
        // dedicated end slot, keeping its stamped `inner_index` (one past the last real child).
        if let Entry::Node(n) = self.entry_mut(node) {
            n.inner.pop();
            n.end = EndSlot::Closed(end_idx);
        }
        end_idx
    }

    pub(crate) fn extras_mut(&mut self, node: TokenIdx) -> &mut serde_json::Value {
        match self.entry_mut(node) {
            Entry::Node(n) => &mut n.extras,
            _ => unreachable!("extras only exist on nodes"),
        }
    }

    pub(crate) fn phrase_of(&self, node: TokenIdx) -> PhraseRef {
        match self.entry(node) {
            Entry::Node(n) => n.phrase.clone(),
            _ => unreachable!("only a node carries a phrase"),
        }
    }

    pub(crate) fn set_phrase(&mut self, node: TokenIdx, phrase: PhraseRef) {
        if let Entry::Node(n) = self.entry_mut(node) {
            n.phrase = phrase;
        }
    }

    pub(crate) fn view(&self, idx: TokenIdx) -> TokenView<'_> {
        TokenView { doc: self, idx }
    }
}

impl<'a> TokenView<'a> {
    pub fn shape(&self) -> Shape {
        self.doc.shape(self.idx)
    }

    pub fn idx(&self) -> TokenIdx {
        self.idx
    }

    pub fn content(&self) -> &'a str {
        &self.doc.meta(self.idx).content
    }

    pub fn start(&self) -> Coord {
        self.doc.meta(self.idx).start
    }

    pub fn end_coord(&self) -> Coord {
        self.doc.meta(self.idx).end
    }

    pub fn id(&self) -> TokenId {
        self.doc.meta(self.idx).id
    }

    pub fn inner_index(&self) -> usize {
        self.doc.meta(self.idx).inner_index
    }

    pub fn parent(&self) -> Option<TokenView<'a>> {
        self.doc.meta(self.idx).parent.map(|p| self.doc.view(p))
    }

    pub fn is_o_token(&self) -> bool {
        matches!(self.doc.entry(self.idx), Entry::Plain(p) if p.o_token)
    }

    /// The kind of close this is, for an `End`-shaped token; `None` for any other shape.
    pub fn end_kind(&self) -> Option<EndKind> {
        match self.doc.entry(self.idx) {
            Entry::End(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.doc.entry(self.idx),
            Entry::Node(n) if matches!(n.end, EndSlot::Open)
        )
    }

    pub fn phrase(&self) -> Option<PhraseRef> {
        match self.doc.entry(self.idx) {
            Entry::Node(n) => Some(n.phrase.clone()),
            _ => None,
        }
    }

    pub fn extras(&self) -> Option<&'a serde_json::Value> {
        match self.doc.entry(self.idx) {
            Entry::Node(n) => Some(&n.extras),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = TokenView<'a>> + 'a {
        let doc = self.doc;
        let inner = match self.doc.entry(self.idx) {
            Entry::Node(n) => n.inner.clone(),
            _ => Vec::new(),
        };
        inner.into_iter().map(move |i| doc.view(i))
    }

    pub fn end(&self) -> Option<TokenView<'a>> {
        match self.doc.entry(self.idx) {
            Entry::Node(n) => match n.end {
                EndSlot::Closed(e) => Some(self.doc.view(e)),
                EndSlot::Open => None,
            },
            _ => None,
        }
    }

    /// The sibling immediately preceding this token under the same parent, if any.
    pub fn previous(&self) -> Option<TokenView<'a>> {
        let meta = self.doc.meta(self.idx);
        if meta.inner_index == 0 {
            return None;
        }
        let parent = meta.parent?;
        match self.doc.entry(parent) {
            Entry::Node(n) => n.inner.get(meta.inner_index - 1).map(|&i| self.doc.view(i)),
            _ => None,
        }
    }

    /// The sibling immediately following this token under the same parent, if any.
    pub fn next(&self) -> Option<TokenView<'a>> {
        let meta = self.doc.meta(self.idx);
        let parent = meta.parent?;
        match self.doc.entry(parent) {
            Entry::Node(n) => n
                .inner
                .get(meta.inner_index + 1)
                .map(|&i| self.doc.view(i)),
            _ => None,
        }
    }
}

impl<'a> NodeHandle<'a> {
    pub fn extras(&self) -> &serde_json::Value {
        match self.doc.entry(self.idx) {
            Entry::Node(n) => &n.extras,
            _ => unreachable!("extras only exist on nodes"),
        }
    }

    pub fn extras_mut(&mut self) -> &mut serde_json::Value {
        self.doc.extras_mut(self.idx)
    }

    pub fn idx(&self) -> TokenIdx {
        self.idx
    }

    pub fn view(&self) -> TokenView<'_> {
        TokenView {
            doc: self.doc,
            idx: self.idx,
        }
    }
}

impl ptree::TreeItem for TokenView<'_> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self.shape() {
            Shape::Plain => write!(f, "{:?} {:?}", self.id().unwrap_or("plain"), self.content()),
            Shape::Node => write!(f, "{}", self.phrase().map(|p| p.name()).unwrap_or("node")),
            Shape::End => write!(f, "end"),
        }
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        let mut items: Vec<TokenView<'_>> = self.children().collect();
        if let Some(end) = self.end() {
            items.push(end);
        }
        std::borrow::Cow::from(items)
    }
}

use crate::util::split_rows;
use crate::{ConfigError, ParseResult, Parser, Phrase, PhraseRef, TokenIndex, TokenReader, TokenView};

impl Parser {
    /// Build a parser rooted at `root`. Fails fast if `root` declares no sub-phrases, since
    /// such a configuration could never start anything.
    pub fn new(root: PhraseRef) -> Result<Self, ConfigError> {
        if root.sub_phrases().is_empty() {
            return Err(ConfigError::new(
                "root",
                "root phrase must declare at least one sub-phrase".to_string(),
            ));
        }
        Ok(Self { root })
    }

    /// Parse a single string, splitting it into rows on line-break sequences.
    pub fn parse_string(&self, text: &str) -> Result<ParseResult, ConfigError> {
        self.parse_rows(split_rows(text))
    }

    /// Parse an already row-split input. Each item is treated as one row, including whatever
    /// line terminator it carries; no additional splitting is performed.
    pub fn parse_rows<I, S>(&self, rows: I) -> Result<ParseResult, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows: Vec<String> = rows.into_iter().map(|r| r.as_ref().to_string()).collect();
        let doc = crate::driver::run(self.root.clone(), rows)?;
        Ok(ParseResult {
            index: TokenIndex::build(doc),
        })
    }
}

impl ParseResult {
    pub fn root(&self) -> TokenView<'_> {
        self.index.root()
    }

    pub fn reader(&self) -> TokenReader<'_> {
        TokenReader::new(&self.index)
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }
}

use std::fmt;

use crate::Phrase;

impl fmt::Display for dyn Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

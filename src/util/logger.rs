use std::fmt::{Debug, Display, Formatter};

use crate::Coord;

use super::Log;
impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Function which return order of the log.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<TL: Display> Log<TL> {
    /// Trace a candidate returned from a phrase hook (`starts`/`ends`) at the given coordinate.
    pub fn log_candidate<T: Debug>(&self, coord: Coord, result: &Option<T>) {
        #[cfg(debug_assertions)]
        match result {
            Some(data) => {
                if self.order() >= Log::Success(()).order() {
                    println!("[{}; PhraseMatch]: {:?} at {}", self, data, coord)
                }
            }
            None => {
                if self.order() >= Log::Result(()).order() {
                    println!("[{}; PhraseMiss]: at {}", self, coord)
                }
            }
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = (coord, result);
        }
    }
}

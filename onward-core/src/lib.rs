#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

pub mod builtin;
pub mod dictionary;
pub mod errors;
pub mod parsing;
pub mod quotation;
pub mod state;
#[cfg(test)]
mod testing;
pub mod value;

pub use builtin::{Builtin, Keyword};
pub use dictionary::Dictionary;
pub use quotation::Quotation;
pub use state::{Flow, State, DEFAULT_STACK_CAPACITY, MAX_NESTING};
pub use value::Value;

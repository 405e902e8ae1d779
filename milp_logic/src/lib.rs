pub mod arithmetic;
pub mod conditional;
pub mod cover;
pub mod error;
pub mod logic;
pub mod model;
pub mod relational;
pub mod truncated;
pub mod util;
pub mod xor;

#[cfg(feature = "cli")]
pub mod config;

#[cfg(feature = "cli")]
pub mod lp_cli;

#[cfg(feature = "parser")]
pub mod parser;

#[cfg(test)]
mod test_util;

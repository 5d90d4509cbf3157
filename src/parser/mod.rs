// parser module
#![allow(clippy::module_inception)]

pub mod ast;
pub mod location;
pub mod parser;
pub mod tokenize;
pub mod tokens;

mod expression;
mod module;

use thiserror::Error;

use crate::ast::{Module, ModuleDecl, ModuleError};
use module::ModuleParser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Unexpected token: \"{0}\"")]
    UnexpectedToken(String),

    #[error("`{0}` was already declared")]
    DuplicateDeclaration(String),

    #[error("No such output: {0}")]
    UnknownOutput(String),

    #[error("No such variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid flip-flop name: {0}")]
    InvalidFlipflop(String),

    #[error("Flip-flop found in asynchronous circuit")]
    FlipflopInCombinational,

    #[error("Mismatched parentheses")]
    MismatchedParentheses,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("{kind} [line {line}]")]
    Syntax {
        line: usize,
        #[source]
        kind: SyntaxError,
    },

    #[error("Parsing ended prematurely")]
    UnexpectedEof,

    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// Parses circuit text into its unresolved declaration.
pub fn parse_decl(source: &str) -> Result<ModuleDecl, ParserError> {
    let mut parser = ModuleParser::new();
    for (idx, line) in source.lines().enumerate() {
        parser
            .ingest_line(line)
            .map_err(|kind| ParserError::Syntax {
                line: idx + 1,
                kind,
            })?;
    }
    parser.finish()
}

/// Parses circuit text and resolves it into an evaluable [`Module`].
pub fn parse(source: &str) -> Result<Module, ParserError> {
    Ok(Module::resolve(parse_decl(source)?)?)
}

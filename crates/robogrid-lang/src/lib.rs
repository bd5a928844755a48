//! Player-facing scripting language for Robogrid.
//!
//! This module turns player-authored source text into a flat bytecode
//! program the sandbox VM executes. The pipeline is:
//! - Lexer: source text to tokens (newline-tolerant, `//` and `/* */` comments)
//! - Parser: tokens to an AST covering a permissive modern scripting subset
//! - Compiler: AST to bytecode, down-leveling sugar (C-style `for`, compound
//!   assignment, short-circuit logic) to the baseline instruction set
//!
//! `compile` is a pure function: same input, same output or the same error;
//! it performs no I/O and knows nothing about runs or levels.

pub mod ast;
pub mod compiler;
pub mod instruction;
pub mod lexer;
pub mod parser;
pub mod program;

pub use compiler::compile;
pub use instruction::{Const, Op};
pub use program::{FnInfo, Program};

use thiserror::Error;

/// A compile-time error with the line it was detected on.
///
/// The message is surfaced verbatim to the player.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: u32,
}

impl CompileError {
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

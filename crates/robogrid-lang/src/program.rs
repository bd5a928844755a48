//! Compiled program structure.

use crate::instruction::Op;
use robogrid_core::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entry point and parameter list of one player-defined function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnInfo {
    /// Instruction index of the function body.
    pub addr: usize,
    pub params: Vec<String>,
}

/// A complete compiled program.
///
/// Top-level code runs from instruction 0 up to its `Halt`; function bodies
/// are laid out after it and are only reachable through `Call`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub code: Vec<Op>,
    pub functions: HashMap<String, FnInfo>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Serialize the program to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a program from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        bincode::deserialize(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Const, Op};

    #[test]
    fn test_program_serialization() {
        let mut program = Program::default();
        program.code = vec![Op::Push(Const::Num(1.0)), Op::Pop, Op::Halt];
        program.functions.insert(
            "go".to_string(),
            FnInfo {
                addr: 3,
                params: vec!["n".to_string()],
            },
        );

        let bytes = program.to_bytes().unwrap();
        let restored = Program::from_bytes(&bytes).unwrap();
        assert_eq!(restored, program);
    }
}

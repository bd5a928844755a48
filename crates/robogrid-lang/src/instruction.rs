//! Bytecode instruction set for the sandbox VM.

use serde::{Deserialize, Serialize};

/// A literal constant embedded in the bytecode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Const {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

/// One bytecode instruction.
///
/// The set is deliberately baseline: the compiler down-levels all surface
/// sugar (C-style `for`, compound assignment, `else if`, short-circuit
/// logic) into these instructions, so the VM stays small and auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Push a constant.
    Push(Const),
    /// Push the value of a variable; faults if it was never declared.
    Load(String),
    /// Pop a value and assign it to an existing variable, or declare it in
    /// the current frame when no binding exists (permissive dialect).
    Store(String),
    /// Pop a value and declare a new binding in the current frame.
    Declare(String),
    /// Discard the top of stack.
    Pop,
    /// Duplicate the top of stack.
    Dup,

    // Arithmetic and comparison (pop two, push one; Neg/Not pop one)
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Control flow
    Jump(usize),
    /// Pop; jump when falsy.
    JumpIfFalse(usize),
    /// Peek; jump when falsy, otherwise pop (short-circuit `&&`).
    JumpIfFalsePeek(usize),
    /// Peek; jump when truthy, otherwise pop (short-circuit `||`).
    JumpIfTruePeek(usize),

    // Aggregates
    /// Pop n elements, push an array.
    MakeArray(usize),
    /// Pop n key/value pairs, push an object.
    MakeObject(usize),
    /// Pop a value, push its named member.
    GetMember(String),
    /// Pop index then container, push the element.
    GetIndex,

    /// Call by name: a player function, the native `wait(ms)` timer, or an
    /// installed host command. Pops `argc` arguments.
    Call { callee: String, argc: usize },
    /// Return from a player function (return value on the stack).
    Return,
    /// End of the top-level program.
    Halt,
}

impl Op {
    /// Returns true if this instruction can transfer control.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            Op::Jump(_)
                | Op::JumpIfFalse(_)
                | Op::JumpIfFalsePeek(_)
                | Op::JumpIfTruePeek(_)
                | Op::Call { .. }
                | Op::Return
                | Op::Halt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flow_classification() {
        assert!(Op::Jump(0).is_control_flow());
        assert!(Op::Halt.is_control_flow());
        assert!(!Op::Add.is_control_flow());
        assert!(!Op::Push(Const::Num(1.0)).is_control_flow());
    }
}

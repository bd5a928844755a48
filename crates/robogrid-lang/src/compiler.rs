//! Compiler from the AST to baseline bytecode.

use crate::ast::{BinOp, Expr, LogicOp, Stmt, UnaryOp};
use crate::instruction::{Const, Op};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::program::{FnInfo, Program};
use crate::CompileError;

/// Compile player source text into a bytecode program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize(source)?;
    let ast = parse(tokens)?;
    Compiler::new().compile_program(ast)
}

/// Break/continue patch lists for the innermost loop.
struct LoopCtx {
    breaks: Vec<usize>,
    continues: Vec<usize>,
}

struct Compiler {
    program: Program,
    loops: Vec<LoopCtx>,
    /// Function declarations, hoisted and compiled after the top-level Halt.
    pending_fns: Vec<(String, Vec<String>, Vec<Stmt>, u32)>,
    in_function: bool,
}

impl Compiler {
    fn new() -> Self {
        Self {
            program: Program::default(),
            loops: Vec::new(),
            pending_fns: Vec::new(),
            in_function: false,
        }
    }

    fn compile_program(mut self, stmts: Vec<Stmt>) -> Result<Program, CompileError> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        self.emit(Op::Halt);

        // Function bodies live after Halt; only Call reaches them.
        while let Some((name, params, body, line)) = self.pending_fns.pop() {
            if self.program.functions.contains_key(&name) {
                return Err(CompileError::new(
                    format!("Function '{}' is defined twice", name),
                    line,
                ));
            }
            let addr = self.here();
            self.program
                .functions
                .insert(name, FnInfo { addr, params });

            self.in_function = true;
            for stmt in body {
                self.stmt(stmt)?;
            }
            self.in_function = false;

            // Implicit `return null` at the end of every body.
            self.emit(Op::Push(Const::Null));
            self.emit(Op::Return);
        }

        Ok(self.program)
    }

    fn emit(&mut self, op: Op) -> usize {
        self.program.code.push(op);
        self.program.code.len() - 1
    }

    fn here(&self) -> usize {
        self.program.code.len()
    }

    /// Emit a jump with a placeholder target, to be patched later.
    fn emit_jump(&mut self, make: fn(usize) -> Op) -> usize {
        self.emit(make(usize::MAX))
    }

    fn patch(&mut self, at: usize, target: usize) {
        let op = match self.program.code[at] {
            Op::Jump(_) => Op::Jump(target),
            Op::JumpIfFalse(_) => Op::JumpIfFalse(target),
            Op::JumpIfFalsePeek(_) => Op::JumpIfFalsePeek(target),
            Op::JumpIfTruePeek(_) => Op::JumpIfTruePeek(target),
            ref other => unreachable!("patching non-jump instruction {:?}", other),
        };
        self.program.code[at] = op;
    }

    fn stmt(&mut self, stmt: Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Declare { name, init } => {
                match init {
                    Some(expr) => self.expr(expr)?,
                    None => {
                        self.emit(Op::Push(Const::Null));
                    }
                }
                self.emit(Op::Declare(name));
            }
            Stmt::Expr(expr) => {
                self.expr(expr)?;
                self.emit(Op::Pop);
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.expr(cond)?;
                let to_else = self.emit_jump(Op::JumpIfFalse);
                for s in then_body {
                    self.stmt(s)?;
                }
                match else_body {
                    Some(body) => {
                        let to_end = self.emit_jump(Op::Jump);
                        let else_at = self.here();
                        self.patch(to_else, else_at);
                        for s in body {
                            self.stmt(s)?;
                        }
                        let end = self.here();
                        self.patch(to_end, end);
                    }
                    None => {
                        let end = self.here();
                        self.patch(to_else, end);
                    }
                }
            }
            Stmt::While { cond, body } => {
                let start = self.here();
                self.expr(cond)?;
                let to_end = self.emit_jump(Op::JumpIfFalse);

                self.loops.push(LoopCtx {
                    breaks: vec![to_end],
                    continues: Vec::new(),
                });
                for s in body {
                    self.stmt(s)?;
                }
                self.emit(Op::Jump(start));

                let end = self.here();
                let ctx = self.loops.pop().expect("loop context");
                for at in ctx.breaks {
                    self.patch(at, end);
                }
                for at in ctx.continues {
                    self.patch(at, start);
                }
            }
            // for(init; cond; step) desugars to init + while with the step
            // as the continue target.
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(*init)?;
                }
                let start = self.here();
                let to_end = match cond {
                    Some(cond) => {
                        self.expr(cond)?;
                        Some(self.emit_jump(Op::JumpIfFalse))
                    }
                    None => None,
                };

                self.loops.push(LoopCtx {
                    breaks: to_end.into_iter().collect(),
                    continues: Vec::new(),
                });
                for s in body {
                    self.stmt(s)?;
                }

                let step_at = self.here();
                if let Some(step) = step {
                    self.expr(step)?;
                    self.emit(Op::Pop);
                }
                self.emit(Op::Jump(start));

                let end = self.here();
                let ctx = self.loops.pop().expect("loop context");
                for at in ctx.breaks {
                    self.patch(at, end);
                }
                for at in ctx.continues {
                    self.patch(at, step_at);
                }
            }
            Stmt::Function {
                name,
                params,
                body,
                line,
            } => {
                if self.in_function {
                    return Err(CompileError::new(
                        "Nested function declarations are not supported",
                        line,
                    ));
                }
                self.pending_fns.push((name, params, body, line));
            }
            Stmt::Return { value, line } => {
                if !self.in_function {
                    return Err(CompileError::new("'return' outside of a function", line));
                }
                match value {
                    Some(expr) => self.expr(expr)?,
                    None => {
                        self.emit(Op::Push(Const::Null));
                    }
                }
                self.emit(Op::Return);
            }
            Stmt::Break { line } => {
                let at = self.emit_jump(Op::Jump);
                match self.loops.last_mut() {
                    Some(ctx) => ctx.breaks.push(at),
                    None => {
                        return Err(CompileError::new("'break' outside of a loop", line));
                    }
                }
            }
            Stmt::Continue { line } => {
                let at = self.emit_jump(Op::Jump);
                match self.loops.last_mut() {
                    Some(ctx) => ctx.continues.push(at),
                    None => {
                        return Err(CompileError::new("'continue' outside of a loop", line));
                    }
                }
            }
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.stmt(s)?;
                }
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Num(n) => {
                self.emit(Op::Push(Const::Num(n)));
            }
            Expr::Str(s) => {
                self.emit(Op::Push(Const::Str(s)));
            }
            Expr::Bool(b) => {
                self.emit(Op::Push(Const::Bool(b)));
            }
            Expr::Null => {
                self.emit(Op::Push(Const::Null));
            }
            Expr::Ident(name) => {
                self.emit(Op::Load(name));
            }
            Expr::Unary { op, expr } => {
                self.expr(*expr)?;
                self.emit(match op {
                    UnaryOp::Neg => Op::Neg,
                    UnaryOp::Not => Op::Not,
                });
            }
            Expr::Binary { op, lhs, rhs } => {
                self.expr(*lhs)?;
                self.expr(*rhs)?;
                self.emit(bin_op(op));
            }
            Expr::Logical { op, lhs, rhs } => {
                self.expr(*lhs)?;
                let jump = match op {
                    LogicOp::And => self.emit_jump(Op::JumpIfFalsePeek),
                    LogicOp::Or => self.emit_jump(Op::JumpIfTruePeek),
                };
                self.expr(*rhs)?;
                let end = self.here();
                self.patch(jump, end);
            }
            // Compound assignment down-levels to load-op-store; the
            // assigned value stays on the stack as the expression result.
            Expr::Assign { name, op, value } => {
                if let Some(op) = op {
                    self.emit(Op::Load(name.clone()));
                    self.expr(*value)?;
                    self.emit(bin_op(op));
                } else {
                    self.expr(*value)?;
                }
                self.emit(Op::Dup);
                self.emit(Op::Store(name));
            }
            Expr::Call { callee, args, line } => {
                let path = callee.callee_path().ok_or_else(|| {
                    CompileError::new("Only named functions can be called", line)
                })?;
                let argc = args.len();
                for arg in args {
                    self.expr(arg)?;
                }
                self.emit(Op::Call { callee: path, argc });
            }
            Expr::Member { obj, name } => {
                self.expr(*obj)?;
                self.emit(Op::GetMember(name));
            }
            Expr::Index { obj, index } => {
                self.expr(*obj)?;
                self.expr(*index)?;
                self.emit(Op::GetIndex);
            }
            Expr::Array(elements) => {
                let n = elements.len();
                for e in elements {
                    self.expr(e)?;
                }
                self.emit(Op::MakeArray(n));
            }
            Expr::Object(fields) => {
                let n = fields.len();
                for (key, value) in fields {
                    self.emit(Op::Push(Const::Str(key)));
                    self.expr(value)?;
                }
                self.emit(Op::MakeObject(n));
            }
        }
        Ok(())
    }
}

fn bin_op(op: BinOp) -> Op {
    match op {
        BinOp::Add => Op::Add,
        BinOp::Sub => Op::Sub,
        BinOp::Mul => Op::Mul,
        BinOp::Div => Op::Div,
        BinOp::Mod => Op::Mod,
        BinOp::Eq => Op::Eq,
        BinOp::Ne => Op::Ne,
        BinOp::Lt => Op::Lt,
        BinOp::Le => Op::Le,
        BinOp::Gt => Op::Gt,
        BinOp::Ge => Op::Ge,
    }
}

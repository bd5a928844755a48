//! Interruptible stack VM for compiled player programs.

use crate::host::CommandTable;
use crate::value::Value;
use robogrid_core::CommandId;
use robogrid_lang::{Op, Program};
use std::collections::HashMap;
use thiserror::Error;

/// A runtime fault inside the sandbox. Messages are surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{0} is not defined")]
    NotDefined(String),

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Interpreter is suspended on a host call")]
    Suspended,

    #[error("Interpreter state corrupted: {0}")]
    Internal(&'static str),
}

type VmResult<T> = Result<T, RuntimeError>;

/// What happened during one `step()`.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// One instruction executed; more remain.
    Ran,
    /// The program finished normally.
    Done,
    /// The program invoked a host command; the VM is suspended until
    /// `resume` delivers the command's return value.
    HostCall {
        command: CommandId,
        args: Vec<Value>,
    },
    /// The program issued a native timer wait (`wait(ms)`); the VM is
    /// suspended until `resume`.
    Sleep { ms: u64 },
}

/// One call frame. Frame 0 holds top-level (global) bindings.
struct Frame {
    locals: HashMap<String, Value>,
    return_ip: usize,
}

/// The sandbox interpreter for one run.
///
/// Executes exactly one instruction per `step()` so the driver owns all
/// scheduling: batching, step ceilings, and suspension are external policy.
pub struct Vm {
    program: Program,
    commands: CommandTable,
    ip: usize,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    suspended: bool,
    done: bool,
}

impl Vm {
    pub fn new(program: Program, commands: CommandTable) -> Self {
        Self {
            program,
            commands,
            ip: 0,
            stack: Vec::new(),
            frames: vec![Frame {
                locals: HashMap::new(),
                return_ip: 0,
            }],
            suspended: false,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Deliver the result of a host call or timer wait and unsuspend.
    pub fn resume(&mut self, value: Value) {
        if self.suspended {
            self.suspended = false;
            self.stack.push(value);
        }
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> VmResult<StepEvent> {
        if self.done {
            return Ok(StepEvent::Done);
        }
        if self.suspended {
            return Err(RuntimeError::Suspended);
        }
        if self.ip >= self.program.code.len() {
            self.done = true;
            return Ok(StepEvent::Done);
        }

        let op = self.program.code[self.ip].clone();
        self.ip += 1;

        match op {
            Op::Push(c) => self.stack.push(Value::from(&c)),
            Op::Load(name) => {
                let value = self.lookup(&name)?;
                self.stack.push(value);
            }
            Op::Store(name) => {
                let value = self.pop()?;
                self.store(name, value);
            }
            Op::Declare(name) => {
                let value = self.pop()?;
                self.current_frame().locals.insert(name, value);
            }
            Op::Pop => {
                self.pop()?;
            }
            Op::Dup => {
                let top = self
                    .stack
                    .last()
                    .cloned()
                    .ok_or(RuntimeError::Internal("dup on empty stack"))?;
                self.stack.push(top);
            }

            Op::Add => {
                let b = self.pop()?;
                let a = self.pop()?;
                let result = match (&a, &b) {
                    (Value::Str(_), _) | (_, Value::Str(_)) => {
                        Value::Str(format!("{}{}", a, b))
                    }
                    _ => Value::Num(as_num(&a)? + as_num(&b)?),
                };
                self.stack.push(result);
            }
            Op::Sub => self.num_binop(|a, b| a - b)?,
            Op::Mul => self.num_binop(|a, b| a * b)?,
            Op::Div => self.num_binop(|a, b| a / b)?,
            Op::Mod => self.num_binop(|a, b| a % b)?,
            Op::Neg => {
                let v = self.pop()?;
                self.stack.push(Value::Num(-as_num(&v)?));
            }
            Op::Not => {
                let v = self.pop()?;
                self.stack.push(Value::Bool(!v.is_truthy()));
            }
            Op::Eq => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.stack.push(Value::Bool(a == b));
            }
            Op::Ne => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.stack.push(Value::Bool(a != b));
            }
            Op::Lt => self.compare_binop(|o| o == std::cmp::Ordering::Less)?,
            Op::Le => self.compare_binop(|o| o != std::cmp::Ordering::Greater)?,
            Op::Gt => self.compare_binop(|o| o == std::cmp::Ordering::Greater)?,
            Op::Ge => self.compare_binop(|o| o != std::cmp::Ordering::Less)?,

            Op::Jump(target) => self.ip = target,
            Op::JumpIfFalse(target) => {
                let v = self.pop()?;
                if !v.is_truthy() {
                    self.ip = target;
                }
            }
            Op::JumpIfFalsePeek(target) => {
                let truthy = self
                    .stack
                    .last()
                    .map(Value::is_truthy)
                    .ok_or(RuntimeError::Internal("peek on empty stack"))?;
                if truthy {
                    self.stack.pop();
                } else {
                    self.ip = target;
                }
            }
            Op::JumpIfTruePeek(target) => {
                let truthy = self
                    .stack
                    .last()
                    .map(Value::is_truthy)
                    .ok_or(RuntimeError::Internal("peek on empty stack"))?;
                if truthy {
                    self.ip = target;
                } else {
                    self.stack.pop();
                }
            }

            Op::MakeArray(n) => {
                let items = self.pop_n(n)?;
                self.stack.push(Value::Array(items));
            }
            Op::MakeObject(n) => {
                let mut flat = self.pop_n(n * 2)?;
                let mut fields = Vec::with_capacity(n);
                while !flat.is_empty() {
                    let value = flat.pop().expect("object value");
                    let key = match flat.pop() {
                        Some(Value::Str(key)) => key,
                        _ => return Err(RuntimeError::Internal("object key is not a string")),
                    };
                    fields.push((key, value));
                }
                fields.reverse();
                self.stack.push(Value::Object(fields));
            }
            Op::GetMember(name) => {
                let v = self.pop()?;
                let member = v.member(&name).ok_or_else(|| {
                    RuntimeError::Type(format!("Cannot read property '{}' of {}", name, v))
                })?;
                self.stack.push(member);
            }
            Op::GetIndex => {
                let index = self.pop()?;
                let container = self.pop()?;
                // A negative index reads as null; `as usize` would
                // saturate it onto element 0.
                let element = match (&container, &index) {
                    (Value::Array(_), Value::Num(n)) | (Value::Str(_), Value::Num(n))
                        if *n < 0.0 =>
                    {
                        Value::Null
                    }
                    (Value::Array(items), Value::Num(n)) => items
                        .get(*n as usize)
                        .cloned()
                        .unwrap_or(Value::Null),
                    (Value::Object(_), Value::Str(key)) => {
                        container.member(key).unwrap_or(Value::Null)
                    }
                    (Value::Str(s), Value::Num(n)) => s
                        .chars()
                        .nth(*n as usize)
                        .map(|c| Value::Str(c.to_string()))
                        .unwrap_or(Value::Null),
                    _ => {
                        return Err(RuntimeError::Type(format!(
                            "Cannot index {} with {}",
                            container, index
                        )));
                    }
                };
                self.stack.push(element);
            }

            Op::Call { callee, argc } => {
                let args = self.pop_n(argc)?;
                return self.call(callee, args);
            }
            Op::Return => {
                let value = self.pop()?;
                if self.frames.len() < 2 {
                    return Err(RuntimeError::Internal("return outside of a call"));
                }
                let frame = self.frames.pop().expect("call frame");
                self.ip = frame.return_ip;
                self.stack.push(value);
            }
            Op::Halt => {
                self.done = true;
                return Ok(StepEvent::Done);
            }
        }

        Ok(StepEvent::Ran)
    }

    /// Call resolution order: player function, native `wait`, host command.
    fn call(&mut self, callee: String, args: Vec<Value>) -> VmResult<StepEvent> {
        if let Some(info) = self.program.functions.get(&callee).cloned() {
            let mut locals = HashMap::new();
            for (i, param) in info.params.iter().enumerate() {
                locals.insert(
                    param.clone(),
                    args.get(i).cloned().unwrap_or(Value::Null),
                );
            }
            self.frames.push(Frame {
                locals,
                return_ip: self.ip,
            });
            self.ip = info.addr;
            return Ok(StepEvent::Ran);
        }

        if callee == "wait" {
            let ms = match args.first() {
                Some(v) => as_num(v)?.max(0.0) as u64,
                None => 0,
            };
            self.suspended = true;
            return Ok(StepEvent::Sleep { ms });
        }

        if let Some(command) = self.commands.resolve(&callee) {
            self.suspended = true;
            return Ok(StepEvent::HostCall { command, args });
        }

        // A plain variable is not callable; anything else is undefined,
        // exactly as an interpreter without the binding would report it.
        if self.lookup(&callee).is_ok() {
            Err(RuntimeError::NotAFunction(callee))
        } else {
            Err(RuntimeError::NotDefined(callee))
        }
    }

    fn current_frame(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("at least the global frame")
    }

    fn lookup(&self, name: &str) -> VmResult<Value> {
        if let Some(frame) = self.frames.last() {
            if let Some(v) = frame.locals.get(name) {
                return Ok(v.clone());
            }
        }
        if let Some(v) = self.frames[0].locals.get(name) {
            return Ok(v.clone());
        }
        Err(RuntimeError::NotDefined(name.to_string()))
    }

    fn store(&mut self, name: String, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.locals.contains_key(&name) {
                frame.locals.insert(name, value);
                return;
            }
        }
        if self.frames[0].locals.contains_key(&name) {
            self.frames[0].locals.insert(name, value);
            return;
        }
        // Undeclared assignment declares in the current frame.
        self.current_frame().locals.insert(name, value);
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.stack
            .pop()
            .ok_or(RuntimeError::Internal("stack underflow"))
    }

    fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        if self.stack.len() < n {
            return Err(RuntimeError::Internal("stack underflow"));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    fn num_binop(&mut self, f: impl Fn(f64, f64) -> f64) -> VmResult<()> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.stack.push(Value::Num(f(as_num(&a)?, as_num(&b)?)));
        Ok(())
    }

    fn compare_binop(&mut self, f: impl Fn(std::cmp::Ordering) -> bool) -> VmResult<()> {
        let b = self.pop()?;
        let a = self.pop()?;
        let ordering = match (&a, &b) {
            (Value::Num(x), Value::Num(y)) => x
                .partial_cmp(y)
                .ok_or_else(|| RuntimeError::Type("Cannot compare NaN".to_string()))?,
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            _ => {
                return Err(RuntimeError::Type(format!(
                    "Cannot compare {} with {}",
                    a, b
                )));
            }
        };
        self.stack.push(Value::Bool(f(ordering)));
        Ok(())
    }
}

fn as_num(v: &Value) -> VmResult<f64> {
    match v {
        Value::Num(n) => Ok(*n),
        Value::Bool(b) => Ok(*b as i32 as f64),
        other => Err(RuntimeError::Type(format!("Expected a number, got {}", other))),
    }
}

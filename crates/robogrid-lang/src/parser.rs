//! Recursive-descent parser for the scripting subset.

use crate::ast::{BinOp, Expr, LogicOp, Stmt, UnaryOp};
use crate::lexer::{Token, TokenKind};
use crate::CompileError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parse a token stream into a list of top-level statements.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, CompileError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut stmts = Vec::new();
    while !parser.check(&TokenKind::Eof) {
        stmts.push(parser.statement()?);
    }
    Ok(stmts)
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), CompileError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(format!("Expected {}", what)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(message, self.line())
    }

    fn ident(&mut self, what: &str) -> Result<String, CompileError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(format!("Expected {}", what))),
        }
    }

    // Statements

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        let stmt = match self.peek() {
            TokenKind::Let | TokenKind::Const | TokenKind::Var => self.declaration()?,
            TokenKind::If => return self.if_statement(),
            TokenKind::While => return self.while_statement(),
            TokenKind::For => return self.for_statement(),
            TokenKind::Function => return self.function_statement(),
            TokenKind::Return => {
                let line = self.line();
                self.advance();
                let value = if self.check(&TokenKind::Semi)
                    || self.check(&TokenKind::RBrace)
                    || self.check(&TokenKind::Eof)
                {
                    None
                } else {
                    Some(self.expression()?)
                };
                Stmt::Return { value, line }
            }
            TokenKind::Break => {
                let line = self.line();
                self.advance();
                Stmt::Break { line }
            }
            TokenKind::Continue => {
                let line = self.line();
                self.advance();
                Stmt::Continue { line }
            }
            TokenKind::LBrace => return Ok(Stmt::Block(self.block()?)),
            _ => Stmt::Expr(self.expression()?),
        };
        self.eat(&TokenKind::Semi);
        Ok(stmt)
    }

    fn declaration(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // let / const / var
        let name = self.ident("variable name")?;
        let init = if self.eat(&TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::Declare { name, init })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.error("Expected '}'"));
            }
            stmts.push(self.statement()?);
        }
        self.advance(); // }
        Ok(stmts)
    }

    /// A block, or a single statement treated as one.
    fn body(&mut self) -> Result<Vec<Stmt>, CompileError> {
        if self.check(&TokenKind::LBrace) {
            self.block()
        } else {
            Ok(vec![self.statement()?])
        }
    }

    fn if_statement(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // if
        self.expect(TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_body = self.body()?;
        let else_body = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                // else-if chains nest as a single-statement else body
                Some(vec![self.if_statement()?])
            } else {
                Some(self.body()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // while
        self.expect(TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.body()?;
        Ok(Stmt::While { cond, body })
    }

    fn for_statement(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // for
        self.expect(TokenKind::LParen, "'(' after 'for'")?;

        let init = if self.eat(&TokenKind::Semi) {
            None
        } else {
            let stmt = match self.peek() {
                TokenKind::Let | TokenKind::Const | TokenKind::Var => self.declaration()?,
                _ => Stmt::Expr(self.expression()?),
            };
            self.expect(TokenKind::Semi, "';' after for-loop initializer")?;
            Some(Box::new(stmt))
        };

        let cond = if self.eat(&TokenKind::Semi) {
            None
        } else {
            let cond = self.expression()?;
            self.expect(TokenKind::Semi, "';' after for-loop condition")?;
            Some(cond)
        };

        let step = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = self.body()?;
        Ok(Stmt::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn function_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.line();
        self.advance(); // function
        let name = self.ident("function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.ident("parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.block()?;
        Ok(Stmt::Function {
            name,
            params,
            body,
            line,
        })
    }

    // Expressions, by descending precedence

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, CompileError> {
        let lhs = self.logic_or()?;

        let op = match self.peek() {
            TokenKind::Assign => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            _ => return Ok(lhs),
        };

        let name = match &lhs {
            Expr::Ident(name) => name.clone(),
            _ => return Err(self.error("Invalid assignment target")),
        };
        self.advance();

        // `x++` / `x--` lex as `x +=` / `x -=` with no operand: implicit 1.
        let value = if op.is_some() && !self.starts_expression() {
            Expr::Num(1.0)
        } else {
            self.assignment()?
        };

        Ok(Expr::Assign {
            name,
            op,
            value: Box::new(value),
        })
    }

    /// Tokens that can open the operand of a compound assignment. `{` is
    /// deliberately absent: after `i++` a brace opens a block statement,
    /// never an object-literal operand.
    fn starts_expression(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Num(_)
                | TokenKind::Str(_)
                | TokenKind::Ident(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Minus
                | TokenKind::Bang
        )
    }

    fn logic_or(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.logic_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.logic_and()?;
            lhs = Expr::Logical {
                op: LogicOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn logic_and(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.equality()?;
            lhs = Expr::Logical {
                op: LogicOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.comparison()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.comparison()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn additive(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        match self.peek().clone() {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(self.unary()?),
                })
            }
            TokenKind::Bang => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(self.unary()?),
                })
            }
            // Prefix ++i / --i lex as += / -=; desugar to a compound assign.
            TokenKind::PlusEq | TokenKind::MinusEq => {
                let op = if self.eat(&TokenKind::PlusEq) {
                    BinOp::Add
                } else {
                    self.advance();
                    BinOp::Sub
                };
                let name = self.ident("variable after increment operator")?;
                Ok(Expr::Assign {
                    name,
                    op: Some(op),
                    value: Box::new(Expr::Num(1.0)),
                })
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    let line = self.line();
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.expression()?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')' after arguments")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        line,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.ident("property name")?;
                    expr = Expr::Member {
                        obj: Box::new(expr),
                        name,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index {
                        obj: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        match self.peek().clone() {
            TokenKind::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.expression()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr::Array(elements))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    loop {
                        let key = match self.peek().clone() {
                            TokenKind::Ident(name) => {
                                self.advance();
                                name
                            }
                            TokenKind::Str(s) => {
                                self.advance();
                                s
                            }
                            _ => return Err(self.error("Expected property name")),
                        };
                        self.expect(TokenKind::Colon, "':' after property name")?;
                        fields.push((key, self.expression()?));
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Expr::Object(fields))
            }
            other => Err(self.error(format!("Unexpected token {:?}", other))),
        }
    }
}

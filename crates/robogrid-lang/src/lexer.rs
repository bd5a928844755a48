//! Lexer for the player scripting language.

use crate::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Str(String),
    Ident(String),

    // Keywords
    Let,
    Const,
    Var,
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Break,
    Continue,
    True,
    False,
    Null,

    // Punctuation and operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" | "undefined" => TokenKind::Null,
        _ => return None,
    })
}

/// Tokenize source text. Newlines are not tokens; statement boundaries
/// are handled permissively by the parser (semicolons optional).
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line: u32 = 1;

    macro_rules! push {
        ($kind:expr) => {
            tokens.push(Token { kind: $kind, line })
        };
    }

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            ' ' | '\t' | '\r' => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                loop {
                    if i + 1 >= chars.len() {
                        return Err(CompileError::new("Unterminated block comment", line));
                    }
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    if chars[i] == '*' && chars[i + 1] == '/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            '\'' | '"' | '`' => {
                let quote = c;
                let start_line = line;
                i += 1;
                let mut s = String::new();
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(CompileError::new("Unterminated string", start_line));
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars.get(i + 1).copied().ok_or_else(|| {
                                CompileError::new("Unterminated string", start_line)
                            })?;
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                other => other,
                            });
                            i += 2;
                        }
                        Some(&ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Str(s),
                    line: start_line,
                });
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value: f64 = text
                    .parse()
                    .map_err(|_| CompileError::new(format!("Invalid number '{}'", text), line))?;
                push!(TokenKind::Num(value));
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                match keyword(&text) {
                    Some(kind) => push!(kind),
                    None => push!(TokenKind::Ident(text)),
                }
            }
            _ => {
                let two: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let three: String = chars[i..chars.len().min(i + 3)].iter().collect();

                // Strict equality lowers to loose in the baseline dialect.
                if three == "===" {
                    push!(TokenKind::EqEq);
                    i += 3;
                    continue;
                }
                if three == "!==" {
                    push!(TokenKind::NotEq);
                    i += 3;
                    continue;
                }

                let (kind, len) = match two.as_str() {
                    "==" => (TokenKind::EqEq, 2),
                    "!=" => (TokenKind::NotEq, 2),
                    "<=" => (TokenKind::Le, 2),
                    ">=" => (TokenKind::Ge, 2),
                    "&&" => (TokenKind::AndAnd, 2),
                    "||" => (TokenKind::OrOr, 2),
                    "+=" => (TokenKind::PlusEq, 2),
                    "-=" => (TokenKind::MinusEq, 2),
                    "*=" => (TokenKind::StarEq, 2),
                    "/=" => (TokenKind::SlashEq, 2),
                    "++" => (TokenKind::PlusEq, 2), // x++ is parsed as x += 1 sugar
                    "--" => (TokenKind::MinusEq, 2),
                    _ => match c {
                        '(' => (TokenKind::LParen, 1),
                        ')' => (TokenKind::RParen, 1),
                        '{' => (TokenKind::LBrace, 1),
                        '}' => (TokenKind::RBrace, 1),
                        '[' => (TokenKind::LBracket, 1),
                        ']' => (TokenKind::RBracket, 1),
                        ',' => (TokenKind::Comma, 1),
                        ';' => (TokenKind::Semi, 1),
                        ':' => (TokenKind::Colon, 1),
                        '.' => (TokenKind::Dot, 1),
                        '+' => (TokenKind::Plus, 1),
                        '-' => (TokenKind::Minus, 1),
                        '*' => (TokenKind::Star, 1),
                        '/' => (TokenKind::Slash, 1),
                        '%' => (TokenKind::Percent, 1),
                        '=' => (TokenKind::Assign, 1),
                        '<' => (TokenKind::Lt, 1),
                        '>' => (TokenKind::Gt, 1),
                        '!' => (TokenKind::Bang, 1),
                        other => {
                            return Err(CompileError::new(
                                format!("Unexpected character '{}'", other),
                                line,
                            ));
                        }
                    },
                };
                push!(kind);
                i += len;
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
    });
    Ok(tokens)
}

//! Bounded arithmetic evaluator: numbers, `+ - * /` and parentheses only.
//!
//! A small recursive-descent parser. Input length and nesting depth are
//! capped, so evaluation always terminates quickly.

use thiserror::Error;

/// Longest expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 256;

/// Deepest nesting of parentheses and unary signs accepted.
pub const MAX_DEPTH: usize = 32;

/// Reasons an expression cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("expression is empty")]
    Empty,

    #[error("expression longer than {MAX_EXPRESSION_LEN} bytes")]
    TooLong,

    #[error("expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ArithmeticError> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            ' ' | '\t' => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' | '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &expr[start..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ArithmeticError::InvalidNumber(literal.to_string()))?;
                Token::Number(value)
            }
            other => return Err(ArithmeticError::InvalidCharacter(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), ArithmeticError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ArithmeticError::TooDeep);
        }
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ArithmeticError> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    // factor := ('+' | '-') factor | '(' expr ')' | number
    fn factor(&mut self) -> Result<f64, ArithmeticError> {
        let at = self.pos;
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Plus) => {
                self.descend()?;
                let v = self.factor()?;
                self.depth -= 1;
                Ok(v)
            }
            Some(Token::Minus) => {
                self.descend()?;
                let v = self.factor()?;
                self.depth -= 1;
                Ok(-v)
            }
            Some(Token::LParen) => {
                self.descend()?;
                let v = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => {
                        self.depth -= 1;
                        Ok(v)
                    }
                    Some(_) => Err(ArithmeticError::UnexpectedToken(self.pos - 1)),
                    None => Err(ArithmeticError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ArithmeticError::UnexpectedToken(at)),
            None => Err(ArithmeticError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, ArithmeticError> {
    if expr.len() > MAX_EXPRESSION_LEN {
        return Err(ArithmeticError::TooLong);
    }
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ArithmeticError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(ArithmeticError::UnexpectedToken(parser.pos));
    }
    if !value.is_finite() {
        return Err(ArithmeticError::NonFinite);
    }
    Ok(value)
}

/// Render a result: whole numbers without a fractional part, others in shortest form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        // Normalizes -0 to 0.
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

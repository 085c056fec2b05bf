use super::Parser;
use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Operators ----------------------------------------------

    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_conditional();
        self.leave();
        result
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;
        if self.peek() != &Token::Question {
            return Ok(condition);
        }
        self.advance();
        let then_branch = self.parse_expr()?;
        self.expect(Token::Colon)?;
        let else_branch = self.parse_expr()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.peek() == &Token::OrOr || self.is_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.peek() == &Token::AndAnd || self.is_word("and") {
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Eq,
                Token::Neq => BinaryOp::Neq,
                Token::Lt => BinaryOp::Lt,
                Token::Lte => BinaryOp::Lte,
                Token::Gt => BinaryOp::Gt,
                Token::Gte => BinaryOp::Gte,
                Token::Ident(w) if w == "in" => BinaryOp::In,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Bang => UnaryOp::Not,
            Token::Ident(w) if w == "not" => UnaryOp::Not,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.peek() != &Token::Caret {
            return Ok(base);
        }
        self.advance();
        // Right-associative, so every `^` nests one level deeper
        self.enter()?;
        let exponent = self.parse_unary();
        self.leave();
        Ok(binary(BinaryOp::Pow, base, exponent?))
    }

    // -- Postfix and primary ------------------------------------

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    if !self.config.allow_member_access {
                        return Err(self.err("member access is disabled"));
                    }
                    self.advance();
                    let property = self.take_ident()?;
                    expr = match expr {
                        Expr::Path(mut segments) => {
                            segments.push(property);
                            Expr::Path(segments)
                        }
                        other => Expr::Member {
                            object: Box::new(other),
                            property,
                        },
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Token::Ident(w) if w == "true" => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            Token::Ident(w) if w == "false" => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            Token::Ident(w) if w == "null" => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            Token::Ident(_) => {
                let name = self.take_ident()?;
                if self.peek() == &Token::LParen {
                    self.advance();
                    let args = self.parse_list(Token::RParen)?;
                    return Ok(Expr::Call {
                        function: name,
                        args,
                    });
                }
                Ok(Expr::Path(vec![name]))
            }
            Token::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(e)
            }
            Token::LBracket => {
                self.advance();
                let items = self.parse_list(Token::RBracket)?;
                Ok(Expr::Array(items))
            }
            Token::Eof => Err(self.err("unexpected end of expression")),
            other => Err(self.err(format!("expected expression, found {}", other))),
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: Token) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.peek() == &close {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if self.peek() == &Token::Comma {
                self.advance();
                continue;
            }
            self.expect(close.clone())?;
            return Ok(items);
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

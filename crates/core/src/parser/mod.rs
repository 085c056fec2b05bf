//! Expression parser.
//!
//! Turns an expression string into an [`Expr`] tree. The grammar is a small
//! arithmetic/logical/comparison/ternary language with member access:
//!
//! ```text
//! expr        := conditional
//! conditional := or ( "?" expr ":" expr )?
//! or          := and ( ("or" | "||") and )*
//! and         := comparison ( ("and" | "&&") comparison )*
//! comparison  := additive ( ("==" | "!=" | "<" | "<=" | ">" | ">=" | "in") additive )*
//! additive    := multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative := unary ( ("*" | "/" | "%") unary )*
//! unary       := ("-" | "+" | "!" | "not") unary | power
//! power       := postfix ( "^" unary )?
//! postfix     := primary ( "." ident | "[" expr "]" )*
//! primary     := number | string | "true" | "false" | "null"
//!              | ident "(" args ")" | ident | "(" expr ")" | "[" args "]"
//! ```

use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::ParseError;
use crate::lexer::{lex, Spanned, Token};

mod expressions;

/// Words that cannot be used as identifiers.
const RESERVED_WORDS: &[&str] = &["and", "or", "not", "in", "true", "false", "null"];

// ──────────────────────────────────────────────
// Configuration
// ──────────────────────────────────────────────

/// Grammar configuration. Holds no per-call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    /// Allow `.name` member access after identifiers and values.
    pub allow_member_access: bool,
    /// Maximum nesting depth before the parser gives up.
    pub max_depth: usize,
    /// Maximum number of tokens in one expression. Bounds the height of
    /// left-leaning operator chains, which do not nest.
    pub max_tokens: usize,
}

const DEFAULT_CONFIG: ParserConfig = ParserConfig {
    allow_member_access: true,
    max_depth: 64,
    max_tokens: 2048,
};

impl Default for ParserConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

/// Stateless expression parser bound to one [`ParserConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionParser {
    config: ParserConfig,
}

/// Parser used by the free functions in this module.
const DEFAULT_PARSER: ExpressionParser = ExpressionParser {
    config: DEFAULT_CONFIG,
};

/// Outcome of [`parse_expression`]: never an `Err`, so callers can collect
/// failures instead of propagating them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub success: bool,
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseError>,
}

impl ExpressionParser {
    pub fn new(config: ParserConfig) -> Self {
        ExpressionParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an expression string into a syntax tree.
    pub fn parse(&self, src: &str) -> Result<Expr, ParseError> {
        if src.trim().is_empty() {
            return Err(ParseError::new(0, "empty expression"));
        }
        let tokens = lex(src)?;
        // Eof is not counted
        if tokens.len().saturating_sub(1) > self.config.max_tokens {
            let offset = tokens
                .get(self.config.max_tokens)
                .map_or(0, |t| t.offset);
            return Err(ParseError::new(
                offset,
                format!("expression too long (limit {} tokens)", self.config.max_tokens),
            ));
        }
        let mut parser = Parser::new(&tokens, &self.config);
        let expr = parser.parse_expr()?;
        if parser.peek() != &Token::Eof {
            return Err(parser.err(format!("unexpected {}", parser.peek())));
        }
        Ok(expr)
    }

    /// Parse and extract referenced variables, folding any error into the
    /// outcome. Malformed input yields `success = false` and no variables.
    pub fn analyze(&self, src: &str) -> ParseOutcome {
        match self.parse(src) {
            Ok(expr) => ParseOutcome {
                success: true,
                variables: expr.variables(),
                error: None,
            },
            Err(e) => ParseOutcome {
                success: false,
                variables: Vec::new(),
                error: Some(e),
            },
        }
    }
}

/// Parse with the default configuration.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    DEFAULT_PARSER.parse(src)
}

/// Parse with the default configuration, reporting success, variables and
/// error as a single value.
pub fn parse_expression(src: &str) -> ParseOutcome {
    DEFAULT_PARSER.analyze(src)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    config: &'a ParserConfig,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], config: &'a ParserConfig) -> Self {
        Parser {
            tokens,
            pos: 0,
            config,
            depth: 0,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_offset(&self) -> usize {
        self.cur().offset
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.cur_offset(), msg)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Ident(x) if x == w)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {}, found {}", expected, self.peek())))
        }
    }

    fn take_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Ident(w) if !RESERVED_WORDS.contains(&w.as_str()) => {
                self.advance();
                Ok(w)
            }
            other => Err(self.err(format!("expected identifier, found {}", other))),
        }
    }

    /// Enter one nesting level, failing past the configured limit.
    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.err(format!(
                "expression nested too deeply (limit {})",
                self.config.max_depth
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

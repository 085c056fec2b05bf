use std::fmt;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords (`and`, `or`, `not`, `in`, `true`, ...) --
    /// distinguished in the parser
    Ident(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Numeric literal -- kept as string to preserve exact representation
    Number(String),
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    // Comparison operators
    EqEq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Logical operators (symbolic forms)
    AndAnd,
    OrOr,
    Bang,
    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            Token::Ident(name) => return write!(f, "identifier '{}'", name),
            Token::Str(s) => return write!(f, "string '{}'", s),
            Token::Number(n) => return write!(f, "number {}", n),
            Token::Eof => return write!(f, "end of expression"),
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Caret => "^",
            Token::EqEq => "==",
            Token::Neq => "!=",
            Token::Lt => "<",
            Token::Lte => "<=",
            Token::Gt => ">",
            Token::Gte => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
        };
        write!(f, "'{}'", sym)
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let offset = pos;
        let next = chars.get(pos + 1).copied();

        // String literal, either quote style
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                let Some(&sc) = chars.get(pos) else {
                    return Err(ParseError::new(offset, "unterminated string literal"));
                };
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    let Some(&escaped) = chars.get(pos) else {
                        return Err(ParseError::new(offset, "unterminated escape in string"));
                    };
                    match escaped {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        '\\' | '"' | '\'' => s.push(escaped),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                offset,
            });
            continue;
        }

        // Number (sign is handled by the parser as a unary operator)
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let s: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Number(s),
                offset,
            });
            continue;
        }

        if is_ident_start(c) {
            let start = pos;
            while pos < chars.len() && is_ident_continue(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Ident(word),
                offset,
            });
            continue;
        }

        // Operators and punctuation; two-character forms first
        let (token, width) = match (c, next) {
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::Neq, 2),
            ('<', Some('=')) => (Token::Lte, 2),
            ('>', Some('=')) => (Token::Gte, 2),
            ('&', Some('&')) => (Token::AndAnd, 2),
            ('|', Some('|')) => (Token::OrOr, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('!', _) => (Token::Bang, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('^', _) => (Token::Caret, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            (',', _) => (Token::Comma, 1),
            ('.', _) => (Token::Dot, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('=', _) => {
                return Err(ParseError::new(
                    offset,
                    "unsupported operator '=' (use '==' for equality)",
                ))
            }
            _ => {
                return Err(ParseError::new(
                    offset,
                    format!("unexpected character '{}'", c),
                ))
            }
        };
        tokens.push(Spanned { token, offset });
        pos += width;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: chars.len(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_comparison_over_member_path() {
        assert_eq!(
            kinds("fields.age.value >= 18"),
            vec![
                Token::Ident("fields".into()),
                Token::Dot,
                Token::Ident("age".into()),
                Token::Dot,
                Token::Ident("value".into()),
                Token::Gte,
                Token::Number("18".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn decimal_literal_kept_verbatim() {
        assert_eq!(
            kinds("0.075"),
            vec![Token::Number("0.075".into()), Token::Eof]
        );
    }

    #[test]
    fn trailing_dot_is_member_access_not_fraction() {
        assert_eq!(
            kinds("1.x"),
            vec![
                Token::Number("1".into()),
                Token::Dot,
                Token::Ident("x".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn single_and_double_quoted_strings() {
        assert_eq!(
            kinds(r#"'it\'s' "a\"b""#),
            vec![
                Token::Str("it's".into()),
                Token::Str("a\"b".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_start_offset() {
        let err = lex("x == 'abc").unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn lone_equals_is_unsupported() {
        let err = lex("a = 1").unwrap_err();
        assert_eq!(err.offset, 2);
        assert!(err.message.contains("unsupported operator"));
    }

    #[test]
    fn unknown_character_rejected() {
        let err = lex("a # b").unwrap_err();
        assert!(err.message.contains("unexpected character '#'"));
    }
}

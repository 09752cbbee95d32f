// crates/values-gate-logic/src/dsl.rs
// ============================================================================
// Module: Guard Expression DSL
// Description: Author-facing expression syntax for guard trees.
// Purpose: Turn human-readable boolean expressions into `Guard<C>` with
//          validation and atom resolution.
// Dependencies: crate::guard, crate::validate::GuardValidator
// ============================================================================

//! ## Overview
//!
//! Rule files express gating conditions as short strings rather than nested
//! tables. The DSL supports boolean composition and three atom shapes that are
//! handed to a user-supplied [`ConditionResolver`]:
//!
//! - **Symbols**: a bare key path such as `global.auth.enabled`
//! - **Calls**: a single-argument function such as `set(global.enterprise.secretName)`
//! - **Comparisons**: `global.edition == 'enterprise'` or `type != "oidc"`
//!
//! ### Grammar (informal)
//! - Infix: `a && b`, `a || b`, `!a` (also `and`, `or`, `not`)
//! - Functions: `all(a, b)`, `any(a, b)`, `not(a)`
//! - Parentheses: `( ... )` for explicit grouping
//!
//! ### Example
//!
//! ```
//! use values_gate_logic::Guard;
//! use values_gate_logic::dsl::Atom;
//! use values_gate_logic::dsl::parse_guard;
//!
//! let resolver = |atom: &Atom<'_>| match atom {
//!     Atom::Symbol(name) => Some((*name).to_string()),
//!     _ => None,
//! };
//! let guard: Guard<String> = parse_guard("enterprise && !legacy", &resolver).unwrap();
//! assert_eq!(guard.complexity(), 4);
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use crate::guard::Guard;
use crate::validate::GuardValidator;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum allowed DSL input size in bytes.
const MAX_DSL_INPUT_BYTES: usize = 1024 * 1024;
/// Maximum supported nesting depth for DSL expressions.
const MAX_DSL_NESTING: usize = 32;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Errors that can occur while parsing or validating a DSL expression.
///
/// # Invariants
/// - None. Variants capture structured parse and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    /// Input was empty or contained only whitespace.
    EmptyInput,
    /// Input exceeded the configured size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the configured nesting depth.
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Actual nesting depth when the error occurred.
        actual_depth: usize,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected token encountered during parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// A quoted literal was not closed.
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// Atom was not recognized by the resolver.
    UnknownCondition {
        /// Rendered atom text.
        name: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// DSL function name was not recognized.
    UnknownFunction {
        /// The unknown function identifier.
        name: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Structural validation failed after parsing.
    Validation(String),
    /// Unexpected trailing input after a complete expression.
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => {
                write!(f, "input exceeds size limit: {actual_bytes} bytes (max {max_bytes})")
            }
            Self::NestingTooDeep {
                max_depth,
                actual_depth,
                position,
            } => write!(
                f,
                "input nesting exceeds limit: depth {actual_depth} (max {max_depth}) at {position}"
            ),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(f, "unexpected token `{found}` at {position}, expected {expected}")
            }
            Self::UnterminatedString {
                position,
            } => write!(f, "unterminated string literal starting at {position}"),
            Self::UnknownCondition {
                name,
                position,
            } => {
                write!(f, "unknown condition `{name}` at {position}")
            }
            Self::UnknownFunction {
                name,
                position,
            } => {
                write!(f, "unknown function `{name}` at {position}")
            }
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::TrailingInput {
                position,
            } => {
                write!(f, "unexpected trailing input at {position}")
            }
        }
    }
}

impl std::error::Error for DslError {}

/// Comparison operator inside a comparison atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CompareOp {
    /// Returns the operator as written in the DSL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// Leaf expression handed to a [`ConditionResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom<'a> {
    /// Bare identifier or key path.
    Symbol(&'a str),
    /// Single-argument function call such as `set(key)`.
    Call {
        /// Function name.
        function: &'a str,
        /// Identifier passed to the function.
        argument: &'a str,
    },
    /// Comparison between a key and a literal.
    Compare {
        /// Key path on the left-hand side.
        key: &'a str,
        /// Comparison operator.
        op: CompareOp,
        /// Literal on the right-hand side, without quotes.
        literal: &'a str,
    },
}

impl fmt::Display for Atom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(name) => f.write_str(name),
            Self::Call {
                function,
                argument,
            } => write!(f, "{function}({argument})"),
            Self::Compare {
                key,
                op,
                literal,
            } => write!(f, "{key} {} {}", op.as_str(), QuotedLiteral(*literal)),
        }
    }
}

/// Renders a comparison literal in a quote the lexer reads back intact.
///
/// Single quotes are preferred; a literal containing `'` uses double quotes.
/// The DSL has no escapes, so a literal holding both quote kinds cannot
/// round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedLiteral<'a>(pub &'a str);

impl fmt::Display for QuotedLiteral<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = if self.0.contains('\'') { '"' } else { '\'' };
        write!(f, "{quote}{}{quote}", self.0)
    }
}

/// Resolves DSL atoms to the domain-specific condition type `C`.
pub trait ConditionResolver<C> {
    /// Returns a condition for the atom, or `None` if it is not recognized.
    fn resolve(&self, atom: &Atom<'_>) -> Option<C>;
}

impl<C: Clone, S: BuildHasher> ConditionResolver<C> for HashMap<String, C, S> {
    fn resolve(&self, atom: &Atom<'_>) -> Option<C> {
        match atom {
            Atom::Symbol(name) => self.get(*name).cloned(),
            Atom::Call {
                ..
            }
            | Atom::Compare {
                ..
            } => None,
        }
    }
}

impl<C: Clone> ConditionResolver<C> for BTreeMap<String, C> {
    fn resolve(&self, atom: &Atom<'_>) -> Option<C> {
        match atom {
            Atom::Symbol(name) => self.get(*name).cloned(),
            Atom::Call {
                ..
            }
            | Atom::Compare {
                ..
            } => None,
        }
    }
}

impl<C, F> ConditionResolver<C> for F
where
    F: Fn(&Atom<'_>) -> Option<C>,
{
    fn resolve(&self, atom: &Atom<'_>) -> Option<C> {
        (self)(atom)
    }
}

/// Parses a DSL expression into a validated [`Guard`] tree.
///
/// # Errors
/// Returns [`DslError`] for syntax issues, unknown atoms or functions,
/// trailing input, or post-parse validation failures.
pub fn parse_guard<C, R>(input: &str, resolver: &R) -> Result<Guard<C>, DslError>
where
    R: ConditionResolver<C>,
{
    if input.len() > MAX_DSL_INPUT_BYTES {
        return Err(DslError::InputTooLarge {
            max_bytes: MAX_DSL_INPUT_BYTES,
            actual_bytes: input.len(),
        });
    }
    let mut lexer = Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = Parser::new(tokens, resolver);
    let guard = parser.parse_expression()?;
    parser.expect_eof()?;

    GuardValidator::default()
        .validate(&guard)
        .map_err(|err| DslError::Validation(err.to_string()))?;

    Ok(guard)
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token produced from the DSL input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Identifier or key path.
    Ident(&'a str),
    /// Quoted string literal (contents only).
    Str(&'a str),
    /// Unquoted numeric literal.
    Number(&'a str),
    /// Equality operator.
    Eq,
    /// Inequality operator.
    Ne,
    /// Logical AND operator.
    And,
    /// Logical OR operator.
    Or,
    /// Logical NOT operator.
    Not,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Comma separator.
    Comma,
    /// End-of-input marker.
    Eof,
}

/// Token paired with its byte offset.
#[derive(Debug, Clone, Copy)]
struct SpannedToken<'a> {
    /// Token value.
    token: Token<'a>,
    /// Byte offset into the input.
    position: usize,
}

/// Lexer for the guard DSL.
struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    fn lex(&mut self) -> Result<Vec<SpannedToken<'a>>, DslError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while self.offset < bytes.len() {
            let ch = bytes[self.offset];
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => {
                    tokens.push(self.simple(Token::LParen));
                    self.offset += 1;
                }
                b')' => {
                    tokens.push(self.simple(Token::RParen));
                    self.offset += 1;
                }
                b',' => {
                    tokens.push(self.simple(Token::Comma));
                    self.offset += 1;
                }
                b'!' => {
                    if self.peek_char(bytes) == Some(b'=') {
                        tokens.push(self.simple(Token::Ne));
                        self.offset += 2;
                    } else {
                        tokens.push(self.simple(Token::Not));
                        self.offset += 1;
                    }
                }
                b'=' => {
                    if self.peek_char(bytes) == Some(b'=') {
                        tokens.push(self.simple(Token::Eq));
                        self.offset += 2;
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "==",
                            found: "=".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'&' => {
                    if self.peek_char(bytes) == Some(b'&') {
                        tokens.push(self.simple(Token::And));
                        self.offset += 2;
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "&&",
                            found: "&".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'|' => {
                    if self.peek_char(bytes) == Some(b'|') {
                        tokens.push(self.simple(Token::Or));
                        self.offset += 2;
                    } else {
                        return Err(DslError::UnexpectedToken {
                            expected: "||",
                            found: "|".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'\'' | b'"' => {
                    let start = self.offset;
                    let body_start = start + 1;
                    let Some(len) = bytes[body_start ..].iter().position(|&b| b == ch) else {
                        return Err(DslError::UnterminatedString {
                            position: start,
                        });
                    };
                    let body_end = body_start + len;
                    tokens.push(SpannedToken {
                        token: Token::Str(&self.input[body_start .. body_end]),
                        position: start,
                    });
                    self.offset = body_end + 1;
                }
                b'0' ..= b'9' => {
                    let start = self.offset;
                    self.consume_while(bytes, |b| b.is_ascii_digit() || b == b'.');
                    tokens.push(SpannedToken {
                        token: Token::Number(&self.input[start .. self.offset]),
                        position: start,
                    });
                }
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                    let start = self.offset;
                    self.consume_while(bytes, is_path_byte);
                    let slice = &self.input[start .. self.offset];
                    tokens.push(SpannedToken {
                        token: Self::keyword_or_ident(slice),
                        position: start,
                    });
                }
                _ => {
                    let found = self.input[self.offset ..].chars().next().unwrap_or('?');
                    return Err(DslError::UnexpectedToken {
                        expected: "identifier, literal, or operator",
                        found: found.to_string(),
                        position: self.offset,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(DslError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Builds a token at the current offset.
    const fn simple(&self, token: Token<'a>) -> SpannedToken<'a> {
        SpannedToken {
            token,
            position: self.offset,
        }
    }

    /// Returns the next byte without advancing.
    fn peek_char(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Maps a slice to a keyword token or identifier token.
    fn keyword_or_ident(slice: &'a str) -> Token<'a> {
        match slice {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Ident(slice),
        }
    }
}

/// Returns true for bytes allowed after the first byte of a key path.
const fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'[' | b']')
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser for the guard DSL.
struct Parser<'input, 'resolver, C, R> {
    /// Token stream with source positions.
    tokens: Vec<SpannedToken<'input>>,
    /// Current token index.
    index: usize,
    /// Atom resolver.
    resolver: &'resolver R,
    /// Current nesting depth for bracketed or function expressions.
    nesting: usize,
    /// Marker for the condition type.
    _marker: std::marker::PhantomData<C>,
}

impl<'input, 'resolver, C, R> Parser<'input, 'resolver, C, R>
where
    R: ConditionResolver<C>,
{
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken<'input>>, resolver: &'resolver R) -> Self {
        Self {
            tokens,
            index: 0,
            resolver,
            nesting: 0,
            _marker: std::marker::PhantomData,
        }
    }

    /// Parses a full expression.
    fn parse_expression(&mut self) -> Result<Guard<C>, DslError> {
        self.parse_or()
    }

    /// Parses OR expressions.
    fn parse_or(&mut self) -> Result<Guard<C>, DslError> {
        let mut parts = vec![self.parse_and()?];
        while self.matches(Token::Or) {
            parts.push(self.parse_and()?);
        }
        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Guard::any(parts)) }
    }

    /// Parses AND expressions.
    fn parse_and(&mut self) -> Result<Guard<C>, DslError> {
        let mut parts = vec![self.parse_unary()?];
        while self.matches(Token::And) {
            parts.push(self.parse_unary()?);
        }
        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Guard::all(parts)) }
    }

    /// Parses unary expressions, including NOT.
    fn parse_unary(&mut self) -> Result<Guard<C>, DslError> {
        if self.matches(Token::Not) {
            let position = self.current().position;
            return self.with_nesting(position, |parser| Ok(Guard::negate(parser.parse_unary()?)));
        }
        self.parse_primary()
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Guard<C>, DslError> {
        let SpannedToken {
            token,
            position,
        } = *self.current();
        match token {
            Token::Ident(name) => {
                self.advance();
                if self.matches(Token::LParen) {
                    self.parse_function(name, position)
                } else if self.matches(Token::Eq) {
                    self.parse_comparison(name, CompareOp::Eq, position)
                } else if self.matches(Token::Ne) {
                    self.parse_comparison(name, CompareOp::Ne, position)
                } else {
                    self.resolve_atom(&Atom::Symbol(name), position)
                }
            }
            Token::LParen => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let expr = parser.parse_expression()?;
                    parser.expect(Token::RParen, "`)`")?;
                    Ok(expr)
                })
            }
            Token::Str(_)
            | Token::Number(_)
            | Token::Eq
            | Token::Ne
            | Token::RParen
            | Token::Comma
            | Token::And
            | Token::Or
            | Token::Not
            | Token::Eof => Err(DslError::UnexpectedToken {
                expected: "condition or expression",
                found: self.describe_current(),
                position,
            }),
        }
    }

    /// Parses the literal side of a comparison.
    fn parse_comparison(
        &mut self,
        key: &'input str,
        op: CompareOp,
        key_pos: usize,
    ) -> Result<Guard<C>, DslError> {
        let literal = match self.current().token {
            Token::Str(value) | Token::Ident(value) | Token::Number(value) => value,
            _ => {
                return Err(DslError::UnexpectedToken {
                    expected: "literal after comparison operator",
                    found: self.describe_current(),
                    position: self.current().position,
                });
            }
        };
        self.advance();
        self.resolve_atom(
            &Atom::Compare {
                key,
                op,
                literal,
            },
            key_pos,
        )
    }

    /// Parses a function-style expression.
    fn parse_function(&mut self, name: &'input str, name_pos: usize) -> Result<Guard<C>, DslError> {
        self.with_nesting(name_pos, |parser| match name {
            "all" | "and" => Ok(Guard::all(parser.parse_argument_list()?)),
            "any" | "or" => Ok(Guard::any(parser.parse_argument_list()?)),
            "not" => {
                let mut args = parser.parse_argument_list()?;
                if args.len() != 1 {
                    return Err(DslError::UnexpectedToken {
                        expected: "exactly one argument to `not(...)`",
                        found: format!("{} arguments", args.len()),
                        position: name_pos,
                    });
                }
                let inner = args.remove(0);
                Ok(Guard::negate(inner))
            }
            _ => parser.parse_call(name, name_pos),
        })
    }

    /// Parses a domain call: zero arguments or exactly one identifier.
    fn parse_call(&mut self, name: &'input str, name_pos: usize) -> Result<Guard<C>, DslError> {
        if self.matches(Token::RParen) {
            return self.resolve_atom(&Atom::Symbol(name), name_pos);
        }
        let Token::Ident(argument) = self.current().token else {
            return Err(DslError::UnexpectedToken {
                expected: "key path argument",
                found: self.describe_current(),
                position: self.current().position,
            });
        };
        self.advance();
        self.expect(Token::RParen, "`)` after argument")?;
        let atom = Atom::Call {
            function: name,
            argument,
        };
        self.resolver.resolve(&atom).map(Guard::Condition).ok_or_else(|| {
            DslError::UnknownFunction {
                name: name.to_string(),
                position: name_pos,
            }
        })
    }

    /// Parses a comma-separated argument list.
    fn parse_argument_list(&mut self) -> Result<Vec<Guard<C>>, DslError> {
        let mut args = Vec::new();
        if self.matches(Token::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if self.matches(Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, "`)` after arguments")?;
            break;
        }
        Ok(args)
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, DslError>,
    ) -> Result<T, DslError> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_DSL_NESTING {
            return Err(DslError::NestingTooDeep {
                max_depth: MAX_DSL_NESTING,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Resolves an atom using the resolver.
    fn resolve_atom(&self, atom: &Atom<'_>, position: usize) -> Result<Guard<C>, DslError> {
        self.resolver.resolve(atom).map(Guard::Condition).ok_or_else(|| {
            DslError::UnknownCondition {
                name: atom.to_string(),
                position,
            }
        })
    }

    /// Consumes the expected token or returns an error.
    fn expect(&mut self, token: Token<'_>, expected: &'static str) -> Result<(), DslError> {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&token) {
            self.advance();
            Ok(())
        } else {
            Err(DslError::UnexpectedToken {
                expected,
                found: self.describe_current(),
                position: self.current().position,
            })
        }
    }

    /// Ensures the parser is at end-of-input.
    fn expect_eof(&self) -> Result<(), DslError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(DslError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the token if it matches the expected kind.
    fn matches(&mut self, kind: Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'input> {
        debug_assert!(self.index < self.tokens.len(), "parser index out of bounds");
        &self.tokens[self.index]
    }

    /// Advances to the next token.
    const fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }

    /// Formats the current token for diagnostics.
    fn describe_current(&self) -> String {
        match &self.current().token {
            Token::Ident(name) => (*name).to_string(),
            Token::Str(value) => format!("'{value}'"),
            Token::Number(raw) => (*raw).to_string(),
            Token::Eq => "==".to_string(),
            Token::Ne => "!=".to_string(),
            Token::And => "&&".to_string(),
            Token::Or => "||".to_string(),
            Token::Not => "!".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

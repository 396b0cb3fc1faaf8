//! Error types for RTF parsing.

use super::lexer::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// Owned snapshot of the token an error points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    /// Kind of the offending token
    pub kind: TokenKind,
    /// Raw text of the offending token (lossy UTF-8)
    pub text: String,
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl From<&Token<'_>> for TokenSpan {
    fn from(token: &Token<'_>) -> Self {
        Self {
            kind: token.kind,
            text: token.as_str().into_owned(),
            start: token.start,
            end: token.end,
        }
    }
}

impl From<Token<'_>> for TokenSpan {
    #[inline]
    fn from(token: Token<'_>) -> Self {
        Self::from(&token)
    }
}

impl fmt::Display for TokenSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{} at {}..{}", self.kind, self.start, self.end)
        } else {
            write!(f, "{} {:?} at {}..{}", self.kind, self.text, self.start, self.end)
        }
    }
}

/// RTF parsing errors.
///
/// Every error is fatal to the `parse` call that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RtfError {
    /// A grammar rule required a specific token kind
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// The kind the grammar required
        expected: TokenKind,
        /// The token actually found
        found: TokenSpan,
    },

    /// Unknown character set declaration
    #[error("unknown character set: {0}")]
    UnknownCharacterSet(TokenSpan),

    /// Control word routed to the text-format grammar but not a known format
    #[error("unknown text format: {0}")]
    UnknownTextFormat(TokenSpan),

    /// Control word not allowed in the current table context
    #[error("unexpected control word: {0}")]
    UnexpectedControlWord(TokenSpan),

    /// Numeric token could not be converted to an integer
    #[error("invalid number: {0}")]
    InvalidNumber(TokenSpan),

    /// Color channel value outside 0-255
    #[error("color component out of range: {0}")]
    ColorOutOfRange(TokenSpan),

    /// Closing brace without a matching opening brace
    #[error("unbalanced group: {0}")]
    UnbalancedGroup(TokenSpan),

    /// Group nesting exceeded the configured limit
    #[error("group nesting deeper than {limit}: {token}")]
    NestingTooDeep {
        /// Configured maximum depth
        limit: usize,
        /// The opening brace that crossed the limit
        token: TokenSpan,
    },
}

impl RtfError {
    /// Build an [`RtfError::UnexpectedToken`].
    #[inline]
    pub fn unexpected(expected: TokenKind, found: &Token<'_>) -> Self {
        RtfError::UnexpectedToken {
            expected,
            found: found.into(),
        }
    }

    /// The token the error points at.
    pub fn token(&self) -> &TokenSpan {
        match self {
            RtfError::UnexpectedToken { found, .. } => found,
            RtfError::UnknownCharacterSet(t)
            | RtfError::UnknownTextFormat(t)
            | RtfError::UnexpectedControlWord(t)
            | RtfError::InvalidNumber(t)
            | RtfError::ColorOutOfRange(t)
            | RtfError::UnbalancedGroup(t) => t,
            RtfError::NestingTooDeep { token, .. } => token,
        }
    }
}

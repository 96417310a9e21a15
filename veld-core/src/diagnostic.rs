//! Diagnostics for the Veld compiler.
//!
//! Errors are accumulated on the compilation context rather than thrown;
//! every stage appends here and the driver decides what to do with the
//! result. A diagnostic renders as `KIND: MESSAGE` followed by an optional
//! explanation line, which is the form the snapshot harness compares.

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::lexer::Token;
use crate::location::Location;

/// Classification of a diagnostic.
///
/// `Syntax` covers everything the parser rejects. `Invalid` covers the rest:
/// bytes the lexer could not classify and constructs the IR generator does
/// not lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Invalid,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SYN",
            ErrorKind::Invalid => "INVALID",
        }
    }
}

/// A single error produced by any stage of the pipeline.
///
/// The primary location is optional: parser diagnostics carry the offending
/// token's location, while generator diagnostics refer to constructs whose
/// positions were discarded with the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub explanation: String,
    pub loc: Option<Location>,
}

impl Diagnostic {
    /// Syntax error for a token the parser did not expect.
    pub fn unexpected_token(token: &Token) -> Diagnostic {
        Diagnostic::unexpected_token_with(token, "")
    }

    /// Syntax error for an unexpected token, with an explanation naming the
    /// category the parser was looking for.
    pub fn unexpected_token_with(token: &Token, explanation: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind: ErrorKind::Syntax,
            message: format!("Unexpected {}", token),
            explanation: explanation.into(),
            loc: Some(token.loc),
        }
    }

    /// Syntax error that is not tied to a single token.
    pub fn syntax(message: impl Into<String>, explanation: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind: ErrorKind::Syntax,
            message: message.into(),
            explanation: explanation.into(),
            loc: None,
        }
    }

    /// Non-syntax error: invalid input bytes or unlowerable constructs.
    pub fn unknown(message: impl Into<String>, explanation: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind: ErrorKind::Invalid,
            message: message.into(),
            explanation: explanation.into(),
            loc: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, loc: Location) -> Diagnostic {
        self.loc = Some(loc);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}\n{}", self.kind.as_str(), self.message, self.explanation)
    }
}

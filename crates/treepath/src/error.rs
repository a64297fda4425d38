use core::fmt;

/// Error codes raised by the dynamic evaluation core.
///
/// Only the subset of XPath 2.0 codes this layer can produce is modeled; the
/// function library above it is expected to map its own failures.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    XPTY0004, // type error (bad root, ill-typed boolean operand, name of a non-node)
    XPDY0002, // context item undefined
    FOER0000, // generic dynamic error (circular tree)
}

/// The two fatal error families of the evaluation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::XPTY0004 => "err:XPTY0004",
            ErrorCode::XPDY0002 => "err:XPDY0002",
            ErrorCode::FOER0000 => "err:FOER0000",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::XPTY0004 => ErrorKind::Type,
            ErrorCode::XPDY0002 | ErrorCode::FOER0000 => ErrorKind::Value,
        }
    }

    /// Parse a code string of the form `err:LOCAL`.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "err:XPTY0004" => Some(ErrorCode::XPTY0004),
            "err:XPDY0002" => Some(ErrorCode::XPDY0002),
            "err:FOER0000" => Some(ErrorCode::FOER0000),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error: {message} ({code})")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into() }
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::XPTY0004, msg)
    }

    /// Generic value/state error. Use [`Error::from_code`] with
    /// [`ErrorCode::XPDY0002`] for a missing context instead.
    pub fn value_error(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::FOER0000, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }

    pub fn is_value_error(&self) -> bool {
        self.kind() == ErrorKind::Value
    }
}

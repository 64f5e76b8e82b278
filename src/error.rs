//! A complete collection of errors.

use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;
use toml::de;

/// A convenient `Result` type whose error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The set of possible errors.
#[derive(Debug)]
pub enum Error {
    /// An I/O error resulting from an operation on a file referenced by `path`.
    Io { path: String, cause: io::Error },

    /// An unexpected command-line argument `arg`.
    UnexpectedArg { arg: String },

    /// A value is expected for a command-line argument `arg`.
    ExpectedValue { arg: String },

    /// A `value` given for a command-line argument `arg` is not valid.
    InvalidValue { arg: String, value: String },

    /// An error occurred while parsing a configuration file referenced by `path`.
    Configuration { path: String, cause: String },

    /// An error occurred while parsing a syntax file referenced by `path`.
    Syntax { path: String, cause: String },

    /// A regular expression `pattern` is invalid or too large in compiled form.
    InvalidRegex { pattern: String, cause: String },

    /// The token category `name` is not recognized.
    InvalidCategory { name: String },

    /// The formatter for `language` could not be run or reported a failure.
    Formatter { language: String, cause: String },
}

impl error::Error for Error {}

impl Error {
    pub fn io(path: &str, cause: io::Error) -> Error {
        Error::Io {
            path: path.to_string(),
            cause,
        }
    }

    pub fn unexpected_arg(arg: &str) -> Error {
        Error::UnexpectedArg {
            arg: arg.to_string(),
        }
    }

    pub fn expected_value(arg: &str) -> Error {
        Error::ExpectedValue {
            arg: arg.to_string(),
        }
    }

    pub fn invalid_value(arg: &str, value: &str) -> Error {
        Error::InvalidValue {
            arg: arg.to_string(),
            value: value.to_string(),
        }
    }

    pub fn configuration(path: &str, e: &de::Error) -> Error {
        Error::Configuration {
            path: path.to_string(),
            cause: format!("{e}"),
        }
    }

    pub fn syntax(path: &str, e: &de::Error) -> Error {
        Error::Syntax {
            path: path.to_string(),
            cause: format!("{e}"),
        }
    }

    pub fn invalid_regex(pattern: &str, e: &regex_lite::Error) -> Error {
        Error::InvalidRegex {
            pattern: pattern.to_string(),
            cause: format!("{e}"),
        }
    }

    pub fn invalid_category(name: &str) -> Error {
        Error::InvalidCategory {
            name: name.to_string(),
        }
    }

    pub fn formatter(language: &str, cause: &str) -> Error {
        Error::Formatter {
            language: language.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, cause } => write!(f, "{path}: {cause}"),
            Error::UnexpectedArg { arg } => write!(f, "{arg}: unexpected argument"),
            Error::ExpectedValue { arg } => write!(f, "{arg}: expecting value to follow"),
            Error::InvalidValue { arg, value } => {
                write!(f, "{value}: invalid value following {arg}")
            }
            Error::Configuration { path, cause } => {
                write!(f, "{path}: configuration error: {cause}")
            }
            Error::Syntax { path, cause } => {
                write!(f, "{path}: syntax configuration error: {cause}")
            }
            Error::InvalidRegex { pattern, cause } => {
                write!(f, "{pattern}: invalid regular expression: {cause}")
            }
            Error::InvalidCategory { name } => write!(f, "{name}: invalid token category"),
            Error::Formatter { language, cause } => {
                write!(f, "{language}: formatter unavailable: {cause}")
            }
        }
    }
}


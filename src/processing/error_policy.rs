//! What to do when a line cannot be parsed or handled.

use crate::error::{CidrqError, ConfigError, LineError, Result};
use crate::output::print_warning;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Per-line fault policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first fault and return it.
    #[default]
    Abort,
    /// Print a warning to stderr and carry on.
    Warn,
    /// Carry on silently.
    Skip,
    /// Write the offending line to the output stream and carry on.
    Print,
}

impl ErrorPolicy {
    /// Apply the policy to a faulting line.
    ///
    /// `raw` is the line as read, terminator excluded; `print` echoes it
    /// byte for byte. Output write failures are returned whatever the policy.
    pub fn handle<W: Write>(&self, raw: &[u8], err: LineError, out: &mut W) -> Result<()> {
        if let LineError::Write(e) = err {
            return Err(CidrqError::Io(e));
        }
        match self {
            ErrorPolicy::Abort => Err(err.into()),
            ErrorPolicy::Warn => {
                print_warning(&err);
                Ok(())
            }
            ErrorPolicy::Skip => {
                log::debug!("skipping line: {err}");
                Ok(())
            }
            ErrorPolicy::Print => {
                out.write_all(raw)?;
                out.write_all(b"\n")?;
                Ok(())
            }
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<ErrorPolicy, ConfigError> {
        match s {
            "abort" => Ok(ErrorPolicy::Abort),
            "warn" => Ok(ErrorPolicy::Warn),
            "skip" => Ok(ErrorPolicy::Skip),
            "print" => Ok(ErrorPolicy::Print),
            _ => Err(ConfigError::InvalidChoice {
                kind: "error action",
                value: s.to_string(),
                expected: "abort, warn, skip, print",
            }),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorPolicy::Abort => "abort",
            ErrorPolicy::Warn => "warn",
            ErrorPolicy::Skip => "skip",
            ErrorPolicy::Print => "print",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use std::io;

    fn fault() -> LineError {
        LineError::Parse(ParseError::FieldNotFound {
            field: 3,
            line: "a,b".to_string(),
        })
    }

    #[test]
    fn test_abort_returns_error() {
        let mut out = Vec::new();
        let result = ErrorPolicy::Abort.handle(b"a,b", fault(), &mut out);
        assert_eq!(
            result.unwrap_err().to_string(),
            "field 3 not found in line: a,b"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_recovering_policies() {
        for (policy, expected) in [
            (ErrorPolicy::Warn, ""),
            (ErrorPolicy::Skip, ""),
            (ErrorPolicy::Print, "a,b\n"),
        ] {
            let mut out = Vec::new();
            policy.handle(b"a,b", fault(), &mut out).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), expected, "policy {policy}");
        }
    }

    #[test]
    fn test_print_echoes_raw_bytes() {
        let mut out = Vec::new();
        ErrorPolicy::Print
            .handle(b"caf\xe9 bad", LineError::Parse(ParseError::InvalidUtf8), &mut out)
            .unwrap();
        assert_eq!(out, b"caf\xe9 bad\n");
    }

    #[test]
    fn test_write_errors_are_never_recovered() {
        let mut out = Vec::new();
        let err = LineError::Write(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(matches!(
            ErrorPolicy::Skip.handle(b"x", err, &mut out),
            Err(CidrqError::Io(_))
        ));
    }

    #[test]
    fn test_names() {
        for name in ["abort", "warn", "skip", "print"] {
            let policy: ErrorPolicy = name.parse().unwrap();
            assert_eq!(policy.to_string(), name);
        }
        let err = "explode".parse::<ErrorPolicy>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid error action 'explode' (expected one of: abort, warn, skip, print)"
        );
    }

    #[test]
    fn test_deserialize_lowercase() {
        let policy: ErrorPolicy = serde_json::from_str("\"print\"").unwrap();
        assert_eq!(policy, ErrorPolicy::Print);
    }
}

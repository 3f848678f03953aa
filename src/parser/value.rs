//! Value-parsing strategies: bare CIDR, `host[:port]` and URL hostname.

use crate::error::{ConfigError, ParseError};
use crate::models::{Prefix, PrefixParseError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// `[v6]:port`, `[v6]` or `host:port`. Anything else is treated as a bare host.
static HOST_PORT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Scheme, optional userinfo, a bracketed IPv6 host or a plain host, then an
/// optional numeric port ending the authority.
static URL_HOST_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_host_port_regex() -> &'static Regex {
    HOST_PORT_REGEX.get_or_init(|| {
        Regex::new(r"^\[(?P<bracketed>[^\]]*)\](?::\d+)?$|^(?P<host>[^:\[\]]*):\d+$")
            .expect("Invalid Regex")
    })
}

fn get_url_host_regex() -> &'static Regex {
    URL_HOST_REGEX.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^@/?#]*@)?(?:\[(?P<bracketed>[^\]]*)\]|(?P<host>[^:/?#]*))(?::\d*)?(?:[/?#]|$)",
        )
        .expect("Invalid Regex")
    })
}

/// How a single value (a whole line or one field) becomes a [`Prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueParser {
    /// CIDR or bare address.
    #[default]
    Bare,
    /// `host[:port]`, where the host is a CIDR or address.
    Host,
    /// URL whose hostname is an address.
    Url,
}

impl ValueParser {
    /// Pick a strategy from the `--url` / `--host` switches. URL wins.
    pub fn from_flags(url: bool, host: bool) -> ValueParser {
        if url {
            ValueParser::Url
        } else if host {
            ValueParser::Host
        } else {
            ValueParser::Bare
        }
    }

    pub fn parse(&self, value: &str) -> Result<Prefix, ParseError> {
        let prefix: Prefix = match self {
            ValueParser::Bare => value.parse()?,
            ValueParser::Host => split_host(value).parse()?,
            ValueParser::Url => url_host(value)
                .ok_or_else(|| PrefixParseError::InvalidAddress(value.to_string()))?
                .parse()?,
        };
        Ok(prefix)
    }
}

fn split_host(value: &str) -> &str {
    match get_host_port_regex().captures(value) {
        Some(caps) => caps
            .name("bracketed")
            .or_else(|| caps.name("host"))
            .map_or(value, |m| m.as_str()),
        None => value,
    }
}

fn url_host(value: &str) -> Option<&str> {
    let caps = get_url_host_regex().captures(value)?;
    let host = caps.name("bracketed").or_else(|| caps.name("host"))?;
    if host.as_str().is_empty() {
        None
    } else {
        Some(host.as_str())
    }
}

impl FromStr for ValueParser {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<ValueParser, ConfigError> {
        match s {
            "bare" => Ok(ValueParser::Bare),
            "host" => Ok(ValueParser::Host),
            "url" => Ok(ValueParser::Url),
            _ => Err(ConfigError::InvalidChoice {
                kind: "value parser",
                value: s.to_string(),
                expected: "bare, host, url",
            }),
        }
    }
}

impl fmt::Display for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueParser::Bare => write!(f, "bare"),
            ValueParser::Host => write!(f, "host"),
            ValueParser::Url => write!(f, "url"),
        }
    }
}

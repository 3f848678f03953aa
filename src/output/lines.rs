//! Prefix listings.

use crate::models::Prefix;
use std::io::{self, Write};

/// Write each prefix in canonical form on its own line.
pub fn write_prefixes<W: Write>(out: &mut W, prefixes: &[Prefix]) -> io::Result<()> {
    for prefix in prefixes {
        writeln!(out, "{prefix}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_prefixes() {
        let prefixes: Vec<Prefix> = ["10.0.0.0/8", "10.0.0.1/32", "::/0"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut out = Vec::new();
        write_prefixes(&mut out, &prefixes).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "10.0.0.0/8\n10.0.0.1\n::/0\n");
    }

    #[test]
    fn test_write_nothing() {
        let mut out = Vec::new();
        write_prefixes(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}

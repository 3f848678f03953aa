//! Loading prefix lists and iterating over input paths.

use crate::config::Context;
use crate::error::{ConfigError, Result};
use crate::parser::{LineProcessor, RecordParser};
use crate::prefix_set::PrefixSetBuilder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Path argument that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// Read a newline-delimited list of prefixes into a new builder.
///
/// Bad lines go through the context's error policy.
pub fn load_builder<R: BufRead, W: Write>(
    reader: R,
    ctx: &Context,
    out: &mut W,
) -> Result<PrefixSetBuilder> {
    let mut builder = PrefixSetBuilder::new();
    add_from_reader(&mut builder, reader, ctx, &mut *out)?;
    Ok(builder)
}

/// Add every prefix read from `reader` to `builder`, returning the line count.
pub fn add_from_reader<R: BufRead, W: Write>(
    builder: &mut PrefixSetBuilder,
    reader: R,
    ctx: &Context,
    out: &mut W,
) -> Result<usize> {
    let processor = LineProcessor::new(RecordParser::bare(), ctx.policy);
    processor.process(reader, out, |parsed, _| {
        builder.extend(parsed.prefixes().iter().copied());
        Ok(())
    })
}

/// Open a list file, mapping failures to [`ConfigError`]s.
pub fn open_file(path: &Path) -> Result<BufReader<File>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Load a list file into a new builder.
///
/// # Arguments
/// * `path` - File with one prefix or address per line
/// * `ctx` - Run context (error policy)
/// * `out` - Output stream used by the `print` policy
pub fn load_builder_from_file<W: Write>(
    path: &Path,
    ctx: &Context,
    out: &mut W,
) -> Result<PrefixSetBuilder> {
    log::info!("Loading file '{}'", path.display());
    let reader = open_file(path)?;
    load_builder(reader, ctx, out)
}

/// Check that every path names an existing file.
pub fn check_files_exist<'a, I>(paths: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    for path in paths {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.clone()));
        }
    }
    Ok(())
}

/// Call `f` with a reader for each input, in order.
///
/// No paths means standard input. `-` also means standard input, which is
/// read at most once; later occurrences are ignored with a warning.
pub fn for_each_input<F>(paths: &[PathBuf], mut f: F) -> Result<()>
where
    F: FnMut(&mut dyn BufRead) -> Result<()>,
{
    if paths.is_empty() {
        let stdin = io::stdin();
        return f(&mut stdin.lock());
    }

    let mut read_stdin = false;
    for path in paths {
        if path.as_os_str() == STDIN_PATH {
            if read_stdin {
                log::warn!("Standard input already consumed, ignoring repeated '-'");
                continue;
            }
            read_stdin = true;
            let stdin = io::stdin();
            f(&mut stdin.lock())?;
        } else {
            log::info!("Reading '{}'", path.display());
            let mut reader = open_file(path)?;
            f(&mut reader)?;
        }
    }
    Ok(())
}

/// Load every input into one builder.
pub fn load_inputs<W: Write>(
    paths: &[PathBuf],
    ctx: &Context,
    out: &mut W,
) -> Result<PrefixSetBuilder> {
    let mut builder = PrefixSetBuilder::new();
    for_each_input(paths, |reader| {
        add_from_reader(&mut builder, reader, ctx, &mut *out)?;
        Ok(())
    })?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CidrqError;
    use crate::processing::ErrorPolicy;

    fn rendered(builder: &PrefixSetBuilder) -> Vec<String> {
        builder
            .prefix_set()
            .prefixes()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_load_builder() {
        let ctx = Context::default();
        let mut out: Vec<u8> = Vec::new();
        let builder =
            load_builder("10.0.0.0/8\n10.1.0.0/16\n192.168.0.1\n".as_bytes(), &ctx, &mut out)
                .unwrap();
        assert_eq!(rendered(&builder), vec!["10.0.0.0/8", "192.168.0.1"]);
    }

    #[test]
    fn test_load_builder_policy() {
        let input = "10.0.0.0/8\nnot a cidr\n";
        let mut out: Vec<u8> = Vec::new();
        let ctx = Context::new(ErrorPolicy::Abort, false);
        assert!(load_builder(input.as_bytes(), &ctx, &mut out).is_err());

        let ctx = Context::new(ErrorPolicy::Print, false);
        let builder = load_builder(input.as_bytes(), &ctx, &mut out).unwrap();
        assert_eq!(rendered(&builder), vec!["10.0.0.0/8"]);
        assert_eq!(String::from_utf8(out).unwrap(), "not a cidr\n");
    }

    #[test]
    fn test_missing_file() {
        let ctx = Context::default();
        let mut out: Vec<u8> = Vec::new();
        let result = load_builder_from_file(Path::new("no/such/list.txt"), &ctx, &mut out);
        assert!(matches!(
            result,
            Err(CidrqError::Config(ConfigError::MissingFile(_)))
        ));
        assert!(matches!(
            check_files_exist(&[PathBuf::from("no/such/list.txt")]),
            Err(ConfigError::MissingFile(_))
        ));
        assert!(check_files_exist(&Vec::<PathBuf>::new()).is_ok());
    }

    #[test]
    fn test_for_each_input_missing_path() {
        let result = for_each_input(&[PathBuf::from("no/such/input.txt")], |_| Ok(()));
        assert!(matches!(
            result,
            Err(CidrqError::Config(ConfigError::MissingFile(_)))
        ));
    }
}

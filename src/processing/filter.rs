//! Streaming filter: keep lines whose prefixes pass match and exclude lists.

use super::loader::{for_each_input, load_builder_from_file};
use super::MembershipMode;
use crate::config::{Context, DEFAULT_EXCLUDE_MODE, DEFAULT_MATCH_MODE};
use crate::error::{LineError, Result};
use crate::models::Prefix;
use crate::parser::{LineProcessor, ParsedLine, RecordParser};
use crate::prefix_set::{PrefixSet, PrefixSetBuilder};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// How a passing line is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// The line exactly as read.
    #[default]
    Raw,
    /// The line with parsed fields rewritten in canonical form.
    Clean,
    /// Each passing prefix on its own line.
    Flat,
}

impl OutputForm {
    /// Pick the form from the `--clean` / `--flat` switches. Flat wins.
    pub fn from_flags(clean: bool, flat: bool) -> OutputForm {
        if flat {
            OutputForm::Flat
        } else if clean {
            OutputForm::Clean
        } else {
            OutputForm::Raw
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub match_path: Option<PathBuf>,
    pub exclude_path: Option<PathBuf>,
    pub match_mode: MembershipMode,
    pub exclude_mode: MembershipMode,
    /// Parse and validate only; nothing is written for good lines.
    pub quiet: bool,
    pub output: OutputForm,
}

impl Default for FilterOptions {
    fn default() -> FilterOptions {
        FilterOptions {
            match_path: None,
            exclude_path: None,
            match_mode: DEFAULT_MATCH_MODE,
            exclude_mode: DEFAULT_EXCLUDE_MODE,
            quiet: false,
            output: OutputForm::Raw,
        }
    }
}

/// Match and exclude lists plus the rules for applying them to a line.
#[derive(Debug, Clone)]
pub struct Filter {
    match_set: Option<PrefixSet>,
    exclude_set: Option<PrefixSet>,
    options: FilterOptions,
}

impl Filter {
    /// Load the lists named in `options`.
    ///
    /// Nothing is loaded in quiet mode.
    ///
    /// # Arguments
    /// * `options` - List paths, modes and output form
    /// * `ctx` - Run context (error policy for bad list lines)
    /// * `out` - Output stream used by the `print` policy
    pub fn new<W: Write>(options: FilterOptions, ctx: &Context, out: &mut W) -> Result<Filter> {
        if options.quiet {
            return Ok(Filter::from_parts(None, None, options));
        }

        let exclude_set = match &options.exclude_path {
            Some(path) => Some(load_builder_from_file(path, ctx, &mut *out)?.prefix_set()),
            None => None,
        };
        let match_builder = match &options.match_path {
            Some(path) => Some(load_builder_from_file(path, ctx, &mut *out)?),
            None => None,
        };
        Ok(Filter::from_parts(match_builder, exclude_set, options))
    }

    /// Assemble a filter from lists already in memory.
    ///
    /// Exclude entries are carved out of the match list before it is
    /// materialized. The exclude list is also checked per prefix.
    pub fn from_parts(
        match_builder: Option<PrefixSetBuilder>,
        exclude_set: Option<PrefixSet>,
        options: FilterOptions,
    ) -> Filter {
        let match_set = match_builder.map(|mut builder| {
            if let Some(exclude) = &exclude_set {
                for prefix in exclude.prefixes() {
                    builder.subtract_prefix(&prefix);
                }
            }
            builder.prefix_set()
        });
        if let Some(set) = &match_set {
            log::info!("Match list has {} entries", set.len());
        }
        if let Some(set) = &exclude_set {
            log::info!("Exclude list has {} entries", set.len());
        }
        Filter {
            match_set,
            exclude_set,
            options,
        }
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn match_set(&self) -> Option<&PrefixSet> {
        self.match_set.as_ref()
    }

    pub fn exclude_set(&self) -> Option<&PrefixSet> {
        self.exclude_set.as_ref()
    }

    /// A prefix passes unless it misses the match list or hits the exclude list.
    pub fn passes(&self, prefix: &Prefix) -> bool {
        if let Some(set) = &self.match_set {
            if !self.options.match_mode.test(set, prefix) {
                return false;
            }
        }
        if let Some(set) = &self.exclude_set {
            if self.options.exclude_mode.test(set, prefix) {
                return false;
            }
        }
        true
    }

    /// The prefixes of `parsed` that pass, in field order.
    pub fn passing(&self, parsed: &ParsedLine<'_>) -> Vec<Prefix> {
        parsed
            .prefixes()
            .iter()
            .filter(|p| self.passes(p))
            .copied()
            .collect()
    }

    /// Write `parsed` if any of its prefixes passes.
    pub fn handle_line<W: Write>(
        &self,
        parsed: &ParsedLine<'_>,
        out: &mut W,
    ) -> std::result::Result<(), LineError> {
        if self.options.quiet {
            return Ok(());
        }
        let passing = self.passing(parsed);
        if passing.is_empty() {
            return Ok(());
        }
        match self.options.output {
            OutputForm::Raw => writeln!(out, "{}", parsed.raw())?,
            OutputForm::Clean => writeln!(out, "{}", parsed.clean())?,
            OutputForm::Flat => {
                for prefix in &passing {
                    writeln!(out, "{prefix}")?;
                }
            }
        }
        Ok(())
    }

    /// Filter one stream, returning the number of lines read.
    pub fn process<R: BufRead, W: Write>(
        &self,
        processor: &LineProcessor,
        reader: R,
        out: &mut W,
    ) -> Result<usize> {
        processor.process(reader, out, |parsed, out| self.handle_line(parsed, out))
    }

    /// Filter every input in order.
    ///
    /// # Arguments
    /// * `parser` - Field selection and value strategy for input lines
    /// * `inputs` - Input paths (empty for stdin)
    /// * `ctx` - Run context
    /// * `out` - Destination for passing lines
    ///
    /// # Returns
    /// The total number of lines read
    pub fn run<W: Write>(
        &self,
        parser: RecordParser,
        inputs: &[PathBuf],
        ctx: &Context,
        out: &mut W,
    ) -> Result<usize> {
        let processor = LineProcessor::new(parser, ctx.policy);
        let mut total = 0;
        log::info!("Processing input CIDRs");
        for_each_input(inputs, |reader| {
            total += self.process(&processor, reader, &mut *out)?;
            Ok(())
        })?;
        Ok(total)
    }
}

//! Command-line interface.
//!
//! Parsing is done with clap derive; [`run`] resolves the settings, sets up
//! logging and dispatches to the evaluators in [`crate::processing`].

use crate::config::{load_settings, Context, Settings};
use crate::error::{ConfigError, Result};
use crate::logging::init_logging;
use crate::output::write_prefixes;
use crate::parser::{RecordParser, ValueParser};
use crate::processing::{
    merge_inputs, sort_inputs, CombineChain, CombineOp, CombineOperator, ErrorPolicy, Filter,
    FilterOptions, MembershipMode, OutputForm,
};
use clap::{ArgMatches, Args, Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// CIDR manipulation tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "cidrq", version, about = "CIDR manipulation tool")]
pub struct Cli {
    /// Action on a bad line: abort, warn, skip or print. Print echoes the line to stdout
    #[arg(short, long, global = true, env = "CIDRQ_ERR", value_name = "ACTION")]
    pub err: Option<ErrorPolicy>,

    /// Print verbose logs to stderr
    #[arg(short, long, global = true, env = "CIDRQ_VERBOSE")]
    pub verbose: bool,

    /// JSON settings file supplying defaults for the options above
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Combine lists of CIDRs. Operations run in the order given, starting
    /// from the input paths (or stdin). Prints a compacted list
    #[command(visible_aliases = ["c", "reduce"])]
    Combine(CombineArgs),

    /// Sort and de-duplicate CIDRs
    #[command(visible_alias = "s")]
    Sort(InputArgs),

    /// Print the minimal list of CIDRs covering the input
    #[command(visible_alias = "m")]
    Merge(InputArgs),

    /// Filter lines by the CIDRs they contain
    #[command(visible_alias = "f")]
    Filter(FilterArgs),

    /// Parse input lines and report the bad ones
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Input files; `-` or nothing reads stdin
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CombineArgs {
    /// Union of the working set with the CIDRs in FILE
    #[arg(short, long, value_name = "FILE")]
    pub union: Vec<PathBuf>,

    /// Intersection of the working set with the CIDRs in FILE
    #[arg(short, long, value_name = "FILE")]
    pub intersect: Vec<PathBuf>,

    /// Subtract the CIDRs in FILE from the working set, splitting any
    /// working-set CIDR that contains a subtracted one
    #[arg(short, long, value_name = "FILE")]
    pub subtract: Vec<PathBuf>,

    #[command(flatten)]
    pub input: InputArgs,
}

impl CombineArgs {
    /// Rebuild the operations in command-line order.
    ///
    /// Without `matches` the order is all unions, then intersections, then
    /// subtractions.
    pub fn chain(&self, matches: Option<&ArgMatches>) -> CombineChain {
        let groups = [
            ("union", CombineOperator::Union, &self.union),
            ("intersect", CombineOperator::Intersect, &self.intersect),
            ("subtract", CombineOperator::Subtract, &self.subtract),
        ];
        let mut ops: Vec<(usize, CombineOp)> = Vec::new();
        for (id, operator, paths) in groups {
            let indices: Vec<usize> = matches
                .and_then(|m| m.indices_of(id))
                .map(|i| i.collect())
                .unwrap_or_default();
            for (n, path) in paths.iter().enumerate() {
                let position = indices.get(n).copied().unwrap_or(usize::MAX);
                ops.push((position, CombineOp::new(operator, path.clone())));
            }
        }
        ops.sort_by_key(|(position, _)| *position);
        CombineChain::new(ops.into_iter().map(|(_, op)| op).collect())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// 1-indexed field holding a CIDR; repeat for several fields
    #[arg(short, long = "field", value_name = "N")]
    pub fields: Vec<usize>,

    /// Field delimiter; `\t` means tab
    #[arg(short, long, value_name = "DELIM")]
    pub delimiter: Option<String>,

    /// Values are URLs; the hostname must be an IP address
    #[arg(short, long)]
    pub url: bool,

    /// Values are `host[:port]`
    #[arg(short = 'H', long)]
    pub host: bool,
}

impl ParseArgs {
    pub fn record_parser(&self, settings: &Settings) -> Result<RecordParser, ConfigError> {
        let delimiter = self.delimiter.as_deref().or(settings.delimiter.as_deref());
        RecordParser::new(
            self.fields.clone(),
            delimiter,
            ValueParser::from_flags(self.url, self.host),
        )
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Drop CIDRs matching the CIDRs in FILE
    #[arg(short = 'x', long = "exclude", value_name = "FILE")]
    pub exclude_list: Option<PathBuf>,

    /// How --exclude matches: overlap or encompass [default: encompass]
    #[arg(long, value_name = "MODE")]
    pub exclude_mode: Option<MembershipMode>,

    /// Keep only CIDRs matching the CIDRs in FILE
    #[arg(short = 'm', long = "match", value_name = "FILE")]
    pub match_list: Option<PathBuf>,

    /// How --match matches: overlap or encompass [default: overlap]
    #[arg(long, value_name = "MODE")]
    pub match_mode: Option<MembershipMode>,

    #[command(flatten)]
    pub parse: ParseArgs,

    /// Only parse and validate; print nothing for good lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Print lines with parsed fields in canonical form
    #[arg(short, long)]
    pub clean: bool,

    /// Print each passing CIDR on its own line
    #[arg(short = 'F', long)]
    pub flat: bool,

    #[command(flatten)]
    pub input: InputArgs,
}

impl FilterArgs {
    pub fn options(&self, settings: &Settings) -> FilterOptions {
        let defaults = FilterOptions::default();
        FilterOptions {
            match_path: self.match_list.clone(),
            exclude_path: self.exclude_list.clone(),
            match_mode: self
                .match_mode
                .or(settings.match_mode)
                .unwrap_or(defaults.match_mode),
            exclude_mode: self
                .exclude_mode
                .or(settings.exclude_mode)
                .unwrap_or(defaults.exclude_mode),
            quiet: self.quiet,
            output: OutputForm::from_flags(self.clean, self.flat),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub parse: ParseArgs,

    #[command(flatten)]
    pub input: InputArgs,
}

impl Cli {
    /// Merge flags with the optional settings file. Flags win.
    pub fn resolve(&self) -> Result<(Context, Settings), ConfigError> {
        let settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };
        let policy = self.err.or(settings.err).unwrap_or_default();
        let verbose = self.verbose || settings.verbose.unwrap_or(false);
        Ok((Context::new(policy, verbose), settings))
    }

    /// Run the selected command, writing results to `out`.
    ///
    /// # Arguments
    /// * `matches` - The raw matches, used to recover combine operation order
    /// * `ctx` - Resolved run context
    /// * `settings` - Defaults from the settings file
    /// * `out` - Destination for results
    pub fn execute<W: Write>(
        &self,
        matches: Option<&ArgMatches>,
        ctx: &Context,
        settings: &Settings,
        out: &mut W,
    ) -> Result<()> {
        match &self.command {
            Command::Combine(args) => {
                let sub = matches.and_then(|m| m.subcommand_matches("combine"));
                let chain = args.chain(sub);
                let set = chain.run(&args.input.paths, ctx, out)?;
                write_prefixes(out, &set.prefixes_compact())?;
            }
            Command::Sort(args) => {
                let sorted = sort_inputs(&args.paths, ctx, out)?;
                write_prefixes(out, &sorted)?;
            }
            Command::Merge(args) => {
                let merged = merge_inputs(&args.paths, ctx, out)?;
                write_prefixes(out, &merged)?;
            }
            Command::Filter(args) => {
                let parser = args.parse.record_parser(settings)?;
                let filter = Filter::new(args.options(settings), ctx, out)?;
                filter.run(parser, &args.input.paths, ctx, out)?;
            }
            Command::Validate(args) => {
                let parser = args.parse.record_parser(settings)?;
                let options = FilterOptions {
                    quiet: true,
                    ..FilterOptions::default()
                };
                let filter = Filter::new(options, ctx, out)?;
                filter.run(parser, &args.input.paths, ctx, out)?;
            }
        }
        Ok(())
    }
}

/// Resolve settings, initialize logging and run the command against stdout.
pub fn run(cli: &Cli, matches: &ArgMatches) -> Result<()> {
    let (ctx, settings) = cli.resolve()?;
    init_logging(ctx.verbose)?;
    log::info!("#Start {:?} with error action {}", cli.command, ctx.policy);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = cli.execute(Some(matches), &ctx, &settings, &mut out);
    out.flush()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let matches = Cli::command().try_get_matches_from(args).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        (cli, matches)
    }

    fn combine_chain(args: &[&str]) -> Vec<(CombineOperator, String)> {
        let (cli, matches) = parse(args);
        let Command::Combine(combine) = &cli.command else {
            panic!("not a combine command");
        };
        combine
            .chain(matches.subcommand_matches("combine"))
            .ops()
            .iter()
            .map(|op| (op.operator, op.path.display().to_string()))
            .collect()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_combine_keeps_flag_order() {
        let ops = combine_chain(&[
            "cidrq", "combine", "-s", "a", "-u", "b", "-i", "c", "-s", "d",
        ]);
        assert_eq!(
            ops,
            vec![
                (CombineOperator::Subtract, "a".to_string()),
                (CombineOperator::Union, "b".to_string()),
                (CombineOperator::Intersect, "c".to_string()),
                (CombineOperator::Subtract, "d".to_string()),
            ]
        );
    }

    #[test]
    fn test_combine_aliases_and_paths() {
        for name in ["combine", "c", "reduce"] {
            let (cli, matches) = parse(&["cidrq", name, "--union", "u.txt", "in.txt", "-"]);
            let Command::Combine(args) = &cli.command else {
                panic!("{name} is not combine");
            };
            let expected = vec![PathBuf::from("in.txt"), PathBuf::from("-")];
            assert_eq!(args.input.paths, expected);
            let chain = args.chain(matches.subcommand_matches("combine"));
            assert_eq!(chain.ops().len(), 1);
        }
    }

    #[test]
    fn test_chain_without_matches() {
        let args = CombineArgs {
            union: vec![PathBuf::from("u")],
            subtract: vec![PathBuf::from("s")],
            ..CombineArgs::default()
        };
        let chain = args.chain(None);
        let ops: Vec<CombineOperator> = chain.ops().iter().map(|op| op.operator).collect();
        assert_eq!(ops, vec![CombineOperator::Union, CombineOperator::Subtract]);
    }

    #[test]
    fn test_filter_flags() {
        let (cli, _) = parse(&[
            "cidrq", "-e", "warn", "filter", "-x", "ex.txt", "--exclude-mode", "overlap", "-m",
            "m.txt", "-f", "2", "-f", "4", "-d", "\\t", "-c", "-H",
        ]);
        assert_eq!(cli.err, Some(ErrorPolicy::Warn));
        let Command::Filter(args) = &cli.command else {
            panic!("not a filter command");
        };
        assert_eq!(args.parse.fields, vec![2, 4]);
        let options = args.options(&Settings::default());
        assert_eq!(options.exclude_mode, MembershipMode::Overlap);
        assert_eq!(options.match_mode, MembershipMode::Overlap);
        assert_eq!(options.output, OutputForm::Clean);
        assert_eq!(options.match_path, Some(PathBuf::from("m.txt")));
        let parser = args.parse.record_parser(&Settings::default()).unwrap();
        assert_eq!(parser.delimiter(), Some("\t"));
        assert_eq!(parser.value_parser(), ValueParser::Host);
    }

    #[test]
    fn test_invalid_choices_rejected() {
        assert!(Cli::command()
            .try_get_matches_from(["cidrq", "-e", "explode", "sort"])
            .is_err());
        assert!(Cli::command()
            .try_get_matches_from(["cidrq", "filter", "--match-mode", "cover"])
            .is_err());
    }

    #[test]
    fn test_settings_fill_gaps() {
        let (cli, _) = parse(&["cidrq", "filter", "-f", "1"]);
        let settings = Settings {
            err: Some(ErrorPolicy::Skip),
            verbose: Some(true),
            match_mode: Some(MembershipMode::Encompass),
            delimiter: Some(";".to_string()),
            ..Settings::default()
        };
        let Command::Filter(args) = &cli.command else {
            panic!("not a filter command");
        };
        assert_eq!(args.options(&settings).match_mode, MembershipMode::Encompass);
        let parser = args.parse.record_parser(&settings).unwrap();
        assert_eq!(parser.delimiter(), Some(";"));
    }

    #[test]
    fn test_fields_need_delimiter() {
        let (cli, _) = parse(&["cidrq", "validate", "-f", "1"]);
        let Command::Validate(args) = &cli.command else {
            panic!("not a validate command");
        };
        assert!(matches!(
            args.parse.record_parser(&Settings::default()),
            Err(ConfigError::MissingDelimiter)
        ));
    }
}

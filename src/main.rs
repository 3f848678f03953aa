use cidrq::cli::{self, Cli};
use cidrq::output::print_error;
use clap::{CommandFactory, FromArgMatches};

fn main() {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();

    let matches = Cli::command().get_matches();
    let args = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = cli::run(&args, &matches) {
        print_error(&e);
        std::process::exit(1);
    }
}

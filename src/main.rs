use clap::Parser;
use fxdca::cli::{run, Cli};
use fxdca::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

use std::io;
use std::process::ExitCode;

use kafka_balancer::cli;

fn main() -> ExitCode {
    cli::run(std::env::args_os(), io::stdin().lock(), io::stdout().lock(), io::stderr()).into()
}

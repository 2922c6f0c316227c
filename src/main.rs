use clap::Parser;
use cssq::cli::{run, Cli};
use std::io::stdout;
use std::process::exit;

fn main() {
    let cli = Cli::parse();
    exit(run(&cli, &mut stdout()));
}

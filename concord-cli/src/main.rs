use clap::Parser;
use concord_cli::args::ConcordArgs;

fn main() {
    let args = ConcordArgs::parse();
    if let Err(e) = args.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

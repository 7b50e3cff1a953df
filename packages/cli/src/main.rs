use clap::Parser;

use kvtree_cli::Args;

fn main() {
    let args = Args::parse();

    kvtree_cli::init_logging(args.debug);

    if let Err(e) = kvtree_cli::run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use clap::Parser;
use tablero::cli::commands::Cli;
use tablero::cli::handlers;

fn main() {
    tablero::logging::init();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

use elvis_tcp::cli::initialize_from_arguments;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("elvis-tcp v{}", env!("CARGO_PKG_VERSION"));
    initialize_from_arguments()
}

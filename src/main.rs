use std::process::ExitCode;

use fianchetto::perft;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--runPerft") {
        return match perft::run_all() {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        };
    }

    eprintln!("usage: {} --runPerft", args[0]);
    ExitCode::SUCCESS
}

use std::process::ExitCode;

fn main() -> ExitCode {
    stokr_cli::run()
}

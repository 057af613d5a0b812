use std::process::ExitCode;

fn main() -> ExitCode {
    wardrobe_cli::run()
}

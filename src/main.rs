use std::process::ExitCode;

use checkout_sha::ui::output;

fn main() -> ExitCode {
    match checkout_sha::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

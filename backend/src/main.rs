//! Main entry point for the FitCoach backend.
//!
//! Configuration, routing and middleware are assembled in the library crate;
//! this binary only runs the server and reports a failed startup.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match fitcoach_backend::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fitcoach: {e}");
            ExitCode::FAILURE
        }
    }
}

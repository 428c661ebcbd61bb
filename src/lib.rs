pub mod clock;
pub mod commands;
pub mod engine;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod reminder;
pub mod reset;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod summary;
pub mod time;

#[cfg(feature = "app")]
pub mod cli;

#[cfg(test)]
mod test_support;

#[cfg(feature = "app")]
pub fn run() -> std::process::ExitCode {
    use clap::Parser;

    match cli::execute(cli::Cli::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            log::error!("cli: {error}");
            eprintln!("error: {error}");
            std::process::ExitCode::FAILURE
        }
    }
}

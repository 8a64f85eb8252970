use clap::Parser;
use saldo::args::{
    AddSubcommand, Args, AuthSubcommand, Command, DeleteSubcommand, ListSubcommand,
};
use saldo::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().saldo_home().path();

    // This allows for exercising the program without a live backend. When
    // SALDO_IN_TEST_MODE is set and non-zero in length, the mode will be
    // Mode::Test, otherwise it will be Mode::Live.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.project_url(), init_args.api_key())
                .await?
                .print()
        }

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            match auth_args.action() {
                AuthSubcommand::Login(login_args) => {
                    commands::auth_login(&config, login_args.email(), login_args.password())
                        .await?
                        .print()
                }
                AuthSubcommand::Verify => commands::auth_verify(&config, mode).await?.print(),
            }
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            match add_args.entity() {
                AddSubcommand::Transaction(args) => {
                    commands::add_transaction(config, mode, args.clone())
                        .await?
                        .print()
                }
                AddSubcommand::Allocation(args) => {
                    commands::add_allocation(config, mode, args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            match delete_args.entity() {
                DeleteSubcommand::Transaction(args) => {
                    commands::delete_transaction(config, mode, args.id())
                        .await?
                        .print()
                }
                DeleteSubcommand::Allocation(args) => {
                    commands::delete_allocation(config, mode, args.id())
                        .await?
                        .print()
                }
            }
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            match list_args.entity() {
                ListSubcommand::Transactions(period_args) => {
                    commands::list_transactions(config, mode, period_args.period()?)
                        .await?
                        .print()
                }
                ListSubcommand::Allocations => {
                    commands::list_allocations(config, mode).await?.print()
                }
            }
        }

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            commands::dashboard(config, mode, dashboard_args.period()?)
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, mode, report_args.year())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/*!
 * EasyGestion Administrative CLI Utility
 *
 * Command-line management of an EasyGestion SQLite database, for the jobs
 * that should not go through the HTTP API: bootstrapping the first accounts,
 * resetting a forgotten password, seeding the service catalogue and running
 * payroll from a cron job.
 *
 * All database work goes through the ORM functions in `easygestion_api::orm`
 * so the CLI and the server agree on validation and cascading deletes.
 *
 * For detailed usage information and available commands, run with --help.
 */

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod admin_cli;

use admin_cli::db_commands::{DbAction, handle_db_command_with_conn};
use admin_cli::package_commands::{PackageAction, handle_package_command_with_conn};
use admin_cli::salary_commands::{SalaryAction, handle_salary_command_with_conn};
use admin_cli::user_commands::{UserAction, handle_user_command_with_conn};
use admin_cli::utils::establish_connection;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "easygestion-admin")]
#[command(about = "Administrative CLI for EasyGestion database management")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage user accounts")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    #[command(about = "Manage the service catalogue")]
    Package {
        #[command(subcommand)]
        action: PackageAction,
    },
    #[command(about = "Run payroll")]
    Salary {
        #[command(subcommand)]
        action: SalaryAction,
    },
    #[command(about = "Database maintenance")]
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;
    match command {
        Commands::User { action } => handle_user_command_with_conn(&mut conn, action),
        Commands::Package { action } => handle_package_command_with_conn(&mut conn, action),
        Commands::Salary { action } => handle_salary_command_with_conn(&mut conn, action),
        Commands::Db { action } => handle_db_command_with_conn(&mut conn, action),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version_info {
        println!("easygestion-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        eprintln!("No command given. Run with --help for usage.");
        return ExitCode::FAILURE;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

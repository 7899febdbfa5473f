// easygestion-api/src/main.rs

use clap::Parser;
use rocket::error;
use rocket::info;
use std::env;
use std::process::ExitCode;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "easygestion-api")]
#[command(about = "EasyGestion API server for salon management")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,
}

#[rocket::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --version-info flag
    if cli.version_info {
        println!("easygestion-api {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return ExitCode::SUCCESS;
    }

    match env::current_dir() {
        Ok(path) => info!("Current directory: {}", path.display()),
        Err(e) => error!("Error getting current directory: {}", e),
    };

    info!("EasyGestion API v{} starting", built_info::PKG_VERSION);

    let rocket = match easygestion_api::rocket() {
        Ok(rocket) => rocket,
        Err(e) => {
            eprintln!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rocket.launch().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Rocket server failed to launch: {}", e);
            ExitCode::FAILURE
        }
    }
}

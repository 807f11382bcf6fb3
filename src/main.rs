use std::process::ExitCode;

use clap::{Parser, Subcommand};

use orgref::commands;
use orgref::diagnostics;

#[derive(Parser)]
#[command(name = "orgref", about = "Hyperlink references to organizational data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured organizations
    Orgs,
    /// Rewrite a message, hyperlinking every reference
    Post {
        /// The message text to rewrite
        message: String,
    },
    /// Resolve one reference into a markdown link
    Resolve {
        /// The reference, with or without the leading symbol
        reference: String,
    },
    /// Print completion candidates for a partial reference
    Suggest {
        /// The partially typed reference body
        reference: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Orgs => commands::cmd_orgs(),
        Commands::Post { message } => commands::cmd_post(&message),
        Commands::Resolve { reference } => commands::cmd_resolve(&reference),
        Commands::Suggest { reference } => commands::cmd_suggest(&reference),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

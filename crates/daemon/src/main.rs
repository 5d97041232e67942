// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Caps, Daemon, Get, Health, Init, Mkdir, Mv, Put, Rm, Version};

command_enum! {
    (Caps, Caps),
    (Daemon, Daemon),
    (Get, Get),
    (Health, Health),
    (Init, Init),
    (Mkdir, Mkdir),
    (Mv, Mv),
    (Put, Put),
    (Rm, Rm),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve remote URL: explicit flag > config http_port > default 8542
    let remote = cli::op::resolve_remote(args.remote.clone(), args.config_path.clone());
    let options = args.client_options();

    // Build context - always has the client initialized
    let ctx = match cli::op::OpContext::new(remote, &options, args.config_path.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create CDMI client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

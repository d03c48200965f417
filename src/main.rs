use clap::Parser;
use switchyard::cli::{
    backends, handle_completions, handle_config_init, route, Cli, Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => switchyard::cli::serve::run_serve(args).await,
        Commands::Backends(args) => backends::handle_backends(&args).map(|output| {
            println!("{}", output);
        }),
        Commands::Route(args) => route::handle_route(&args).map(|output| {
            println!("{}", output);
        }),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

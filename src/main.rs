use clap::Parser;
use componentfinder::cli::{Cli, Command, DiscoverArgs};
use componentfinder::{cmd_discover, cmd_init};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Some(Command::Discover(args)) => cmd_discover(args),
        Some(Command::Init(args)) => cmd_init(args),
        None => cmd_discover(DiscoverArgs {
            path: cli.path,
            ..Default::default()
        }),
    };

    std::process::exit(exit_code);
}

/// `RUST_LOG` wins; otherwise `-v` raises the engine to debug, `-vv` to trace.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "componentfinder=debug",
        _ => "componentfinder=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

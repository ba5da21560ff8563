use crate::demo::{run_demo, run_schemes, DemoArgs, SchemesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scheme_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scheme Portal",
    about = "Run and demonstrate the welfare scheme eligibility portal from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through eligibility, application, and edit-request flows in memory
    Demo(DemoArgs),
    /// Print the sample scheme catalog with its parsed criteria
    Schemes(SchemesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Schemes(args) => run_schemes(args),
    }
}

use args::{Args, BuildArgs, Command};
use clap::Parser;
use folio::{error::BuildError, Paths};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Build(build_args) => build(build_args).await,
    }
}

async fn build(args: BuildArgs) -> Result<()> {
    let paths = Paths {
        input: args.input,
        output: args.output,
    };
    let report = folio::build(&paths).await?;
    println!("{report}");

    if !report.is_complete() {
        return Err(BuildError::PagesSkipped {
            count: report.skipped.len(),
        }
        .into());
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

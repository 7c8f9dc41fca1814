use clap::error::ErrorKind;
use clap::Parser;
use crucible_runner::cli::Cli;
use crucible_runner::config::RunnerConfig;
use crucible_runner::error::Error;
use crucible_runner::{logging, runner};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            // Missing config argument and every other usage error: the
            // contract is exit code 1 with a message on stderr.
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli).await {
        print_error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = RunnerConfig::load(&cli.config)?;
    logging::init(cli.debug || config.meta.debug);

    let report = runner::run(&config).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Prints a fatal error to stderr. Reached only when no report could be
/// emitted; child failures never land here.
fn print_error(error: &Error) {
    match error {
        Error::Io(err) => eprintln!("crucible: I/O error: {err}"),
        Error::Json(err) => eprintln!("crucible: invalid run configuration: {err}"),
        Error::Config(msg) => eprintln!("crucible: configuration error: {msg}"),
        Error::Archive(msg) => eprintln!("crucible: archive error: {msg}"),
        Error::Anyhow(err) => eprintln!("crucible: unexpected error: {err}"),
    }
}

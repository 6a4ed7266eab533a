//! premiumize-dl CLI
//!
//! Front-end over the library: argument parsing, credential resolution and
//! the one place where the API client is created and closed.

use clap::{Arg, ArgAction, ArgMatches, Command};
use premiumize_dl::{
    clean_transfers, download_files, list_transfers, upload_links, CleanupPolicy, DownloadOptions,
    DownloadRequest, PremiumizeApi, PremiumizeError, Result,
};
use regex::RegexBuilder;
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("premiumize-dl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Download, list and clean up your premiumize.me files and transfers")
        .subcommand_required(true)
        .arg(
            Arg::new("auth")
                .short('a')
                .long("auth")
                .global(true)
                .help("Either 'user:password' or a path to a pw-file with that format"),
        )
        .subcommand(
            Command::new("download")
                .about("Download all files matching the given patterns")
                .arg(
                    Arg::new("inputs")
                        .num_args(1..)
                        .required(true)
                        .help("Regular expressions to match file names against, or direct http(s) links"),
                )
                .arg(
                    Arg::new("directory")
                        .short('o')
                        .long("directory")
                        .default_value(".")
                        .help("Directory to download the file(s) into"),
                )
                .arg(
                    Arg::new("delete-after")
                        .short('d')
                        .long("delete-after")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true)
                        .default_value("-1")
                        .help("Delete matched items this many days after download; negative keeps everything"),
                )
                .arg(
                    Arg::new("cleanup-only")
                        .long("cleanup-only")
                        .action(ArgAction::SetTrue)
                        .help("Skip the downloads and only apply the cleanup policy"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List transfers matching a pattern")
                .arg(
                    Arg::new("pattern")
                        .default_value(".*")
                        .help("Regular expression to match transfer names against"),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Delete failed and repeatedly stale transfers")
                .arg(
                    Arg::new("previous")
                        .short('p')
                        .long("previous")
                        .default_value(".premiumize_dl_prev.txt")
                        .help("Location of the previous-run transfer id file"),
                ),
        )
        .subcommand(
            Command::new("upload")
                .about("Let premiumize.me download these links into your cloud")
                .arg(Arg::new("links").num_args(1..).required(true)),
        )
}

/// The target directory must exist and be writable before any work begins
fn writable_directory(raw: &str) -> Result<PathBuf> {
    let path = PathBuf::from(raw);
    if !path.is_dir() {
        return Err(PremiumizeError::config_error(format!(
            "\"{}\" is no directory",
            raw
        )));
    }
    if std::fs::metadata(&path)?.permissions().readonly() {
        return Err(PremiumizeError::config_error(format!(
            "\"{}\" isn't writeable",
            raw
        )));
    }
    Ok(path)
}

async fn run(api: &PremiumizeApi, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("download", sub)) => {
            let directory = writable_directory(
                sub.get_one::<String>("directory")
                    .map(String::as_str)
                    .unwrap_or("."),
            )?;
            let days = sub.get_one::<i64>("delete-after").copied().unwrap_or(-1);
            let options = DownloadOptions::new(directory)
                .cleanup(CleanupPolicy::from_days(days))
                .cleanup_only(sub.get_flag("cleanup-only"));

            // All inputs are validated before the first download starts.
            let requests = sub
                .get_many::<String>("inputs")
                .into_iter()
                .flatten()
                .map(|input| DownloadRequest::parse(input))
                .collect::<Result<Vec<_>>>()?;

            for request in &requests {
                let report = download_files(api, request, &options).await?;
                log::info!(
                    "{} matched, {} fetched, {} deleted, {} failed",
                    report.matched,
                    report.fetched,
                    report.deleted,
                    report.failed
                );
            }
            Ok(())
        }
        Some(("list", sub)) => {
            let pattern = RegexBuilder::new(
                sub.get_one::<String>("pattern")
                    .map(String::as_str)
                    .unwrap_or(".*"),
            )
            .case_insensitive(true)
            .build()?;

            for line in list_transfers(api, &pattern).await? {
                println!("{}", line);
            }
            Ok(())
        }
        Some(("clean", sub)) => {
            let prev_file = PathBuf::from(
                sub.get_one::<String>("previous")
                    .map(String::as_str)
                    .unwrap_or(".premiumize_dl_prev.txt"),
            );
            let report = clean_transfers(api, &prev_file).await?;
            log::info!(
                "Deleted {} failed and {} stale transfers, remembered {}",
                report.failed_deleted,
                report.stale_deleted,
                report.remembered
            );
            Ok(())
        }
        Some(("upload", sub)) => {
            let links: Vec<String> = sub
                .get_many::<String>("links")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            upload_links(api, &links).await?;
            Ok(())
        }
        _ => unreachable!("subcommand is required"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let matches = cli().get_matches();
    let auth = matches
        .get_one::<String>("auth")
        .cloned()
        .unwrap_or_default();

    let api = match PremiumizeApi::new(&auth) {
        Ok(api) => api,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // A ctrl-c mid-batch is graceful termination, not an error; partial
    // effects of in-flight tasks are not rolled back.
    let result = tokio::select! {
        result = run(&api, &matches) => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, stopping...");
            Ok(())
        }
    };

    // Runs on every path out of the invocation, interrupted or not.
    api.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

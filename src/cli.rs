use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub fn build_cli() -> Command {
    Command::new("docqa")
        .about("Document Q&A API client")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .global(true)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("upload").about("Ingest documents into the backend").arg(
                Arg::new("paths")
                    .num_args(1..)
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Files to upload"),
            ),
        )
        .subcommand(
            Command::new("search")
                .about("Search ingested documents")
                .arg(Arg::new("query").required(true).help("Search terms")),
        )
        .subcommand(
            Command::new("ask")
                .about("Ask a question about the documents")
                .arg(Arg::new("question").required(true).help("The question")),
        )
        .subcommand(Command::new("stats").about("Show ingest statistics"))
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

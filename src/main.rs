use docqa_client::api::ApiClient;
use docqa_client::config::Config;
use docqa_client::limit::{RateLimitHub, RateLimitWatch};
use docqa_client::{cli, views};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    cli::init_logging(log_level.as_deref());

    if matches.get_flag("version") {
        println!("docqa {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Config::from_env().map_err(anyhow::Error::msg)?;
    let hub = RateLimitHub::new();
    let api = ApiClient::new(cfg, hub.clone())?;
    let watch = RateLimitWatch::new(&hub);

    match matches.subcommand() {
        Some(("upload", sub)) => {
            let paths: Vec<PathBuf> = sub
                .get_many::<PathBuf>("paths")
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default();
            views::run_upload(&api, &watch, &paths).await
        }
        Some(("search", sub)) => {
            let query = sub
                .get_one::<String>("query")
                .map(String::as_str)
                .unwrap_or_default();
            views::run_search(&api, &watch, query).await
        }
        Some(("ask", sub)) => {
            let question = sub
                .get_one::<String>("question")
                .map(String::as_str)
                .unwrap_or_default();
            views::run_ask(&api, &watch, question).await
        }
        Some(("stats", _)) => views::run_stats(&api, &watch).await,
        _ => {
            cli::build_cli().print_help()?;
            Ok(())
        }
    }
}

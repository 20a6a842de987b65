//! Terminal reader for a running newsscript server.
//!
//! Type a continent name to switch to it, `r` to refresh, `q` to quit.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use newsscript::cache::SystemClock;
use newsscript::models::Continent;
use newsscript::view::{HttpNewsFetcher, INITIAL_CONTINENT, NewsView};

#[derive(Parser, Debug)]
#[command(name = "newsscript-reader", about = "Read continent news with scripture pairings")]
struct Cli {
    /// News endpoint of the server
    #[arg(long, default_value = "http://127.0.0.1:3000/api/news")]
    endpoint: String,

    /// Continent to open with
    #[arg(long)]
    continent: Option<Continent>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut view = NewsView::new(HttpNewsFetcher::new(cli.endpoint), Arc::new(SystemClock));

    view.select_continent(cli.continent.unwrap_or(INITIAL_CONTINENT)).await;
    print_screen(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        match command {
            "" => continue,
            "q" | "quit" => break,
            "r" | "refresh" | "retry" => view.refresh().await,
            name => match name.parse::<Continent>() {
                Ok(continent) => view.select_continent(continent).await,
                Err(err) => {
                    eprintln!("{err}. Try one of: {}", continent_list());
                    continue;
                }
            },
        }
        print_screen(&view);
    }

    Ok(())
}

fn print_screen<F: newsscript::view::NewsFetcher>(view: &NewsView<F>) {
    println!("\n{}", view.screen());
    println!("[{}]  r: refresh  q: quit", continent_list());
}

fn continent_list() -> String {
    Continent::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" | ")
}

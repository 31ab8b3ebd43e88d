use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use order_book_engine::cli::{self, Cli};

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting global tracing subscriber");

    let cli = Cli::parse();
    let code = cli::run(cli);
    std::process::exit(code);
}

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "movie-roulette-server")]
#[command(about = "Random movie picker backed by TMDB", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "movie-roulette.yaml")]
    config: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_roulette=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = movie_roulette::run(&args.config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

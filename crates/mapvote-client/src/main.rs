use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use mapvote_client::{
    directory::filter_seats, view, ApiClient, CaptchaLoader, DetailSource, ElectionApi, Language,
    LoadState, PreferenceStore, PresetTokenHost, ResultsPoller, SeatDirectory, SeatLoader,
    VoteSession,
};
use mapvote_common::{utils::time::format_timestamp, ClientConfig, ConstituencyNo};

/// CLI arguments for the map-vote client
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Terminal client for the map-vote election demo",
    long_about = "Browse constituencies, cast a vote and follow the live results of the election demo API"
)]
struct Args {
    /// JSON config file
    #[clap(long, short, env = "MAPVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// API root URL
    #[clap(long)]
    api_url: Option<String>,

    /// Directory for preferences and cached results
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long)]
    log_level: Option<String>,

    /// Display language for this run (en, bn)
    #[clap(long)]
    lang: Option<Language>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List constituencies, optionally filtered by name
    Seats { query: Option<String> },

    /// Show one constituency's candidates and current tally
    Seat { no: ConstituencyNo },

    /// Cast a vote for a candidate
    Vote {
        no: ConstituencyNo,
        candidate: String,

        /// Token obtained from the captcha widget
        #[clap(long, env = "MAPVOTE_CAPTCHA_TOKEN")]
        captcha_token: Option<String>,
    },

    /// Show the results dashboard
    Results {
        /// Also show this constituency's result
        #[clap(long)]
        seat: Option<ConstituencyNo>,

        /// Keep polling until Ctrl-C
        #[clap(long)]
        watch: bool,
    },

    /// Show the latest headlines
    News,

    /// Show or set the saved language
    Lang { lang: Option<Language> },
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    let mut config = config.with_env_overrides();
    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize tracing for logs
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to set global tracing subscriber: {}", e);
    }

    let store = PreferenceStore::open(&config.data_dir)?;
    let lang = args.lang.unwrap_or_else(|| store.language());
    let api = Arc::new(ApiClient::from_config(&config)?);
    info!("Using election API at {}", config.base_url);

    match args.command {
        Command::Seats { query } => {
            let directory = SeatDirectory::new(api);
            let seats = directory.load().await;
            let hits = filter_seats(&seats, query.as_deref().unwrap_or(""));
            print!("{}", view::seat_list(&hits, lang));
        }
        Command::Seat { no } => {
            let loader = SeatLoader::new(api, DetailSource::Ballot);
            let state = loader.select(no).await;
            print!("{}", view::load_state(&state, lang));
        }
        Command::Vote {
            no,
            candidate,
            captcha_token,
        } => vote(api, no, &candidate, captcha_token, lang).await?,
        Command::Results { seat, watch } => {
            results(api, store, config.poll_interval(), seat, watch, lang).await?
        }
        Command::News => match api.news().await {
            Ok(feed) => print!("{}", view::news(&feed, lang)),
            Err(e) => warn!("Failed to load news: {}", e),
        },
        Command::Lang { lang: Some(choice) } => {
            store.set_language(choice)?;
            println!("{}", choice);
        }
        Command::Lang { lang: None } => println!("{}", store.language()),
    }

    Ok(())
}

async fn vote<A: ElectionApi>(
    api: Arc<A>,
    no: ConstituencyNo,
    candidate: &str,
    preset_token: Option<String>,
    lang: Language,
) -> Result<()> {
    let session = VoteSession::new(api);
    let state = session.select_seat(no).await;
    if !matches!(state, LoadState::Loaded(_)) {
        print!("{}", view::load_state(&state, lang));
        bail!("constituency {} could not be loaded", no);
    }
    session.choose_candidate(candidate).await?;

    let loader = CaptchaLoader::new(Arc::new(PresetTokenHost::new(
        preset_token.unwrap_or_default(),
    )));
    let provider = session.solve_captcha(&loader).await?;
    info!("Captcha provider: {}", provider);

    let feedback = session.submit_vote().await?;
    println!("{}", feedback.render(lang));

    let state = session.snapshot().await;
    if let Some(detail) = state.detail() {
        print!("{}", view::seat_detail(detail, state.tallies(), lang));
    }
    if !feedback.is_success() {
        bail!("vote was not recorded");
    }
    Ok(())
}

async fn results<A: ElectionApi>(
    api: Arc<A>,
    store: PreferenceStore,
    interval: std::time::Duration,
    seat: Option<ConstituencyNo>,
    watch: bool,
    lang: Language,
) -> Result<()> {
    if let Some(cached) = store.cached_stats() {
        info!("Cached results from {}", format_timestamp(cached.saved_at));
    }
    let poller = ResultsPoller::new(api.clone(), Some(store), interval);

    if let Some(no) = seat {
        let loader = SeatLoader::new(api, DetailSource::Results);
        let state = loader.select(no).await;
        print!("{}", view::seat_result(&state, lang));
        println!();
    }

    if !watch {
        if let Some(cached) = poller.latest().await {
            print!("{}", view::dashboard(&cached, true, lang));
            println!();
        }
        match poller.refresh().await {
            Some(stats) => print!("{}", view::dashboard(&stats, false, lang)),
            None => warn!("Results unavailable"),
        }
        return Ok(());
    }

    if let Some(cached) = poller.latest().await {
        print!("{}", view::dashboard(&cached, true, lang));
    }
    let mut updates = poller.subscribe();
    poller.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping results watch");
                break;
            }
            update = updates.recv() => match update {
                Ok(stats) => {
                    println!();
                    print!("{}", view::dashboard(&stats, false, lang));
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} results updates", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    poller.stop();
    Ok(())
}

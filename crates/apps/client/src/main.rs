use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::config::{DEFAULT_CENTER, DEFAULT_ZOOM};
use client::driver::feed_script;
use client::script::{format_event, parse_event, parse_script};
use client::{
    ClientConfig, ClientError, CommentThread, Driver, FixedLocation, HeadlessMap, PostComposer,
    Session,
};
use layers::{MarkerStyle, present_world};
use posts::{Post, PostId};
use runtime::event_bus::EventBus;
use scene::World;
use serde_json::json;
use store::{ImageUpload, MemoryStore, PostStore, content_type_for};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clustered map board of geotagged posts")]
struct Args {
    /// Store base URL (default: GEOBOARD_STORE_URL)
    #[arg(long)]
    store_url: Option<String>,

    /// Store API key (default: GEOBOARD_STORE_KEY)
    #[arg(long)]
    store_key: Option<String>,

    /// Use an in-memory store seeded from a JSON array of posts
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Number of top posts to fetch (default: GEOBOARD_TOP_LIMIT or 15)
    #[arg(long)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the top posts and print their markers and popups as JSON
    Top,

    /// Drive a headless session from a timed JSON-lines script and print the trace
    Replay { script: PathBuf },

    /// Drive a headless session from JSON-lines events on stdin
    Run,

    /// Create a post at GEOBOARD_LAT/GEOBOARD_LNG
    Post {
        #[arg(long)]
        text: String,

        #[arg(long)]
        image: PathBuf,
    },

    /// List comments on a post, newest first
    Comments { post: String },

    /// Add a comment to a post
    Comment { post: String, text: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), ClientError> {
    let mut config = ClientConfig::from_env();
    if args.store_url.is_some() {
        config.store_url = args.store_url;
    }
    if args.store_key.is_some() {
        config.store_key = args.store_key;
    }
    if let Some(limit) = args.limit {
        config.top_limit = limit;
    }
    let store = open_store(&config, args.seed.as_deref()).await?;

    match args.command {
        Command::Top => cmd_top(&config, store.as_ref()).await,
        Command::Replay { script } => cmd_replay(&config, store, &script).await,
        Command::Run => cmd_run(&config, store).await,
        Command::Post { text, image } => cmd_post(&config, store, &text, &image).await,
        Command::Comments { post } => cmd_comments(store.as_ref(), post).await,
        Command::Comment { post, text } => cmd_comment(store.as_ref(), post, text).await,
    }
}

async fn open_store(
    config: &ClientConfig,
    seed: Option<&Path>,
) -> Result<Arc<dyn PostStore>, ClientError> {
    match seed {
        Some(path) => {
            let bytes = tokio::fs::read(path).await?;
            let posts: Vec<Post> = serde_json::from_slice(&bytes)?;
            Ok(Arc::new(MemoryStore::new(posts)))
        }
        None => Ok(Arc::new(config.rest_store()?)),
    }
}

async fn cmd_top(config: &ClientConfig, store: &dyn PostStore) -> Result<(), ClientError> {
    let posts = store
        .fetch_top_posts(config.top_limit)
        .await
        .map_err(ClientError::Fetch)?;

    let mut world = World::new(config.cell_size_deg);
    world.replace_posts(posts);
    let markers: Vec<serde_json::Value> = present_world(&world, &MarkerStyle::default())
        .into_iter()
        .map(|(marker, popup)| {
            json!({
                "group": marker.group.index(),
                "lat": marker.position.lat,
                "lng": marker.position.lng,
                "badge": marker.badge,
                "color": marker.color.to_css(),
                "icon": marker.to_html(),
                "posts": popup.previews().map(|id| id.as_str()).collect::<Vec<_>>(),
                "popup": popup.to_html(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&markers)?);
    Ok(())
}

fn new_driver(config: &ClientConfig, store: Arc<dyn PostStore>) -> Driver<HeadlessMap> {
    Driver::new(
        Session::new(config),
        HeadlessMap::new(DEFAULT_CENTER, DEFAULT_ZOOM),
        store,
    )
}

async fn cmd_replay(
    config: &ClientConfig,
    store: Arc<dyn PostStore>,
    path: &Path,
) -> Result<(), ClientError> {
    let text = tokio::fs::read_to_string(path).await?;
    let script = parse_script(&text)?;

    let mut driver = new_driver(config, store);
    driver.start(&FixedLocation(config.location)).await;
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(feed_script(script, driver.started(), tx));
    driver.run(rx).await;

    print_trace(driver.session().trace());
    Ok(())
}

async fn cmd_run(config: &ClientConfig, store: Arc<dyn PostStore>) -> Result<(), ClientError> {
    let mut driver = new_driver(config, store);
    driver.start(&FixedLocation(config.location)).await;

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match parse_event(&line) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "skipping event"),
            }
        }
    });
    driver.run(rx).await;

    print_trace(driver.session().trace());
    Ok(())
}

fn print_trace(trace: &EventBus) {
    if trace.dropped() > 0 {
        println!("({} earlier events dropped)", trace.dropped());
    }
    for event in trace.iter() {
        println!("{}", format_event(event));
    }
}

async fn cmd_post(
    config: &ClientConfig,
    store: Arc<dyn PostStore>,
    text: &str,
    image: &Path,
) -> Result<(), ClientError> {
    let composer = PostComposer::at(config.location)?;
    let bytes = tokio::fs::read(image).await?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = content_type_for(image).unwrap_or("application/octet-stream");

    let mut driver = new_driver(config, store);
    driver.start(&FixedLocation(config.location)).await;
    let post = driver
        .create_post(&composer, text, Some(ImageUpload::new(bytes, file_name, content_type)))
        .await?;

    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    driver.run(rx).await;

    println!("{}", serde_json::to_string_pretty(&post)?);
    print_trace(driver.session().trace());
    Ok(())
}

async fn cmd_comments(store: &dyn PostStore, post: String) -> Result<(), ClientError> {
    let mut thread = CommentThread::new(PostId(post));
    thread.load(store).await?;
    println!("{}", serde_json::to_string_pretty(thread.comments())?);
    Ok(())
}

async fn cmd_comment(store: &dyn PostStore, post: String, text: String) -> Result<(), ClientError> {
    let mut thread = CommentThread::new(PostId(post));
    thread.set_draft(text);
    let result = thread.submit(store).await;
    if let Some(notice) = thread.dismiss_notice() {
        eprintln!("{notice}");
    }
    result?;
    println!("{}", serde_json::to_string_pretty(thread.comments())?);
    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sf_cli::{render, HttpStorefrontApi, SessionDriver, StorefrontApi};

const DEFAULT_URL: &str = "http://localhost:3000";
const ENV_URL: &str = "SF_URL";

#[derive(Parser)]
#[command(name = "sf")]
#[command(about = "Storefront demo client", long_about = None)]
struct Cli {
    /// Daemon base URL (falls back to $SF_URL, then http://localhost:3000)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch page and counters, print the rendering
    ///
    /// No read endpoint reports crash mode, so the crash control always
    /// starts as "Crash Application"; use `sf crash` to see the real flag.
    Status,

    /// Press the primary button once (add to cart or pay, depending on page)
    Buy,

    /// Run a whole purchase: reserve, pay, return to browsing
    Checkout,

    /// Toggle crash mode
    Crash,

    /// Provision the crash, inventory and bank tables
    Tables,

    /// Poll and print state repeatedly
    ///
    /// Crash mode is not polled (no read endpoint reports it); the crash
    /// control shows "Crash Application" throughout.
    Watch {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Stop after this many polls (runs forever when omitted)
        #[arg(long)]
        count: Option<u64>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (later files win)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let url = cli
        .url
        .or_else(|| std::env::var(ENV_URL).ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let timeout = Duration::from_millis(cli.timeout_ms);

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = sf_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
        Commands::Status => {
            let mut driver = connect(&url, timeout).await?;
            print_session(&mut driver);
        }
        Commands::Buy => {
            let mut driver = connect(&url, timeout).await?;
            show_pending(&mut driver);
            driver.primary_action().await?;
            print_session(&mut driver);
        }
        Commands::Checkout => {
            let mut driver = connect(&url, timeout).await?;
            checkout(&mut driver).await?;
            print_session(&mut driver);
        }
        Commands::Crash => {
            let mut driver = connect(&url, timeout).await?;
            driver.toggle_crash().await?;
            print_session(&mut driver);
        }
        Commands::Tables => {
            let mut driver = connect(&url, timeout).await?;
            driver.create_tables().await?;
            print_session(&mut driver);
        }
        Commands::Watch { interval_ms, count } => {
            let mut driver = connect(&url, timeout).await?;
            let mut n = 0u64;
            loop {
                println!("{}\n", render(driver.view()));
                n += 1;
                if count.is_some_and(|c| n >= c) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                driver.load().await?;
            }
        }
    }

    Ok(())
}

/// Build the HTTP client and do the initial load.
async fn connect(url: &str, timeout: Duration) -> Result<SessionDriver<HttpStorefrontApi>> {
    let api = HttpStorefrontApi::new(url, timeout)?;
    let mut driver = SessionDriver::new(api);
    driver
        .load()
        .await
        .with_context(|| format!("could not load storefront from {url}"))?;
    Ok(driver)
}

/// Reserve then pay. Stops early if the shelf is empty or payment fails.
async fn checkout<A: StorefrontApi>(driver: &mut SessionDriver<A>) -> Result<()> {
    if driver.view().page == sf_core::Page::Browsing {
        driver.primary_action().await?;
        if driver.view().page == sf_core::Page::Browsing {
            return Ok(());
        }
    }
    show_pending(driver);
    driver.primary_action().await?;
    Ok(())
}

/// Print the "Loading..." frame before a payment goes out.
fn show_pending<A: StorefrontApi>(driver: &mut SessionDriver<A>) {
    if let Some(view) = driver.begin_payment() {
        println!("{}\n", render(&view));
    }
}

fn print_session<A: StorefrontApi>(driver: &mut SessionDriver<A>) {
    for alert in driver.take_alerts() {
        println!("! {alert}");
    }
    println!("{}", render(driver.view()));
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

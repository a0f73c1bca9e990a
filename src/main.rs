mod cache;
mod config;
mod html;
mod i18n;
mod params;
mod request;
mod session;
mod shop;
mod storefront;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cache::{CacheStore, MemoryStore, NoopStore, SqliteStore};
use config::CacheBackend;
use session::MemorySession;
use shop::controller::{InMemoryCatalog, InMemoryWatch};

#[derive(Parser, Debug)]
#[command(name = "shopfront")]
#[command(about = "Render storefront HTML pages against the demo catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/shopfront/shopfront.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Page to render: catalog/lists, account/watch or catalog/session
  #[arg(short, long, default_value = "catalog/lists")]
  page: String,

  /// Request parameter as name=value, may be repeated
  #[arg(short = 'P', long = "param")]
  params: Vec<String>,

  /// Act as this logged-in customer
  #[arg(long)]
  customer: Option<String>,
}

fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref())?;

  let mut req = request::Request::new("cli-session", "cli-token");
  for param in &args.params {
    let (name, value) = param
      .split_once('=')
      .ok_or_else(|| eyre!("Invalid parameter (expected name=value): {}", param))?;
    req.add_param(name, value);
  }
  if let Some(customer) = args.customer {
    req.set_customer(customer);
  }

  let store: Arc<dyn CacheStore> = match config.cache.backend {
    CacheBackend::Memory => Arc::new(MemoryStore::default()),
    CacheBackend::Sqlite => Arc::new(SqliteStore::open()?),
    CacheBackend::None => Arc::new(NoopStore),
  };

  let shop = storefront::Storefront::new(
    &config,
    Arc::new(InMemoryCatalog::with_demo_data()),
    Arc::new(InMemoryWatch::default()),
    Arc::new(MemorySession::default()),
    store,
  )?;

  let page = shop.render_page(&args.page, "cli", &req)?;

  if !page.header.is_empty() {
    println!("{}", page.header);
  }
  println!("{}", page.body);

  Ok(())
}

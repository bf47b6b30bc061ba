//! event-explorer command-line client
//!
//! ```sh
//! event-explorer --api-key KEY search --city Chicago --keyword jazz
//! event-explorer show G5vYZ9fG1Wa
//! event-explorer favorites toggle G5vYZ9fG1Wa
//! event-explorer theme set dark
//! event-explorer watch --city Chicago --interval 30
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use explorer_dispatch::{ActionLogConfig, ActionLoggerMiddleware, Subscriptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use event_explorer::catalog::{CatalogClient, CatalogConfig, Event, HttpTransport, SearchParams};
use event_explorer::config::{Config, GlobalArgs};
use event_explorer::state::AppState;
use event_explorer::storage::{FileStore, KeyValueStore, MemoryStore};
use event_explorer::theme::{ColorKey, ThemeMode};
use event_explorer::{logging, Action, App};

#[derive(Parser, Debug)]
#[command(name = "event-explorer", version)]
#[command(about = "Search live events, keep favorites, pick a color theme")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct SearchArgs {
    /// Free-text keyword
    #[arg(long, short)]
    keyword: Option<String>,

    /// City filter
    #[arg(long, short)]
    city: Option<String>,

    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    page: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog and print one page of results
    Search {
        #[command(flatten)]
        query: SearchArgs,
    },
    /// Print the details of one event
    Show { id: String },
    /// Manage saved events
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },
    /// Inspect or change the color theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
    /// Keep a search on screen, revalidating it periodically.
    /// Type `n` + Enter for the next page, `r` to refetch, Ctrl-C to quit.
    Watch {
        #[command(flatten)]
        query: SearchArgs,

        /// Seconds between revalidations
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    List,
    /// Add an event by id, or remove it if already saved
    Toggle { id: String },
    Clear,
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    Show,
    /// light, dark or custom
    Set { mode: ThemeMode },
    Toggle,
    /// Set one custom color, e.g. `theme color primary "#FF00FF"`
    Color { key: ColorKey, value: String },
    /// Restore the custom palette to the light defaults
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let config = Config::from_args(&cli.global)?;
    let storage: Arc<dyn KeyValueStore> = match FileStore::open(&config.data_dir, &config.store_id) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                dir = %config.data_dir.display(),
                error = %e,
                "storage unavailable, settings will not be saved"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let catalog_config = match config.catalog() {
        Ok(catalog) => catalog,
        Err(e) if needs_catalog(&cli.command) => return Err(e.into()),
        // Favorites and theme commands never reach the catalog
        Err(_) => CatalogConfig::new("").base_url(config.base_url.clone()),
    };
    let catalog = Arc::new(CatalogClient::with_policy(
        catalog_config,
        Arc::new(HttpTransport::new()),
        config.cache,
    ));

    let logger = ActionLoggerMiddleware::with_log(ActionLogConfig {
        filter: config.action_filter.clone(),
        ..ActionLogConfig::default()
    });
    let mut app = App::with_logger(storage, catalog, logger);
    let result = run(&mut app, cli.command, &config).await;
    app.shutdown();
    result
}

fn needs_catalog(command: &Command) -> bool {
    matches!(
        command,
        Command::Search { .. }
            | Command::Show { .. }
            | Command::Watch { .. }
            | Command::Favorites {
                command: FavoritesCommand::Toggle { .. }
            }
    )
}

fn search_params(query: &SearchArgs, config: &Config) -> SearchParams {
    let mut params = SearchParams::new()
        .page(query.page)
        .size(config.page_size);
    if let Some(keyword) = &query.keyword {
        params = params.keyword(keyword);
    }
    if let Some(city) = &query.city {
        params = params.city(city);
    }
    params
}

async fn run(app: &mut App, command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Search { query } => {
            app.dispatch(Action::SearchSubmit(search_params(&query, config)));
            app.settle().await;
            if let Some(error) = &app.state().search.error {
                bail!("search failed: {error}");
            }
            print_search(app.state());
        }

        Command::Show { id } => {
            let event = load_event(app, &id).await?;
            print_event_detail(&event, app.state().favorites.is_favorite(&id));
        }

        Command::Favorites { command } => match command {
            FavoritesCommand::List => {
                let favorites = &app.state().favorites;
                if favorites.is_empty() {
                    println!("No favorites yet.");
                }
                for event in favorites.iter() {
                    print_event_line(event, true);
                }
            }
            FavoritesCommand::Toggle { id } => {
                let saved = app.state().favorites.get(&id).cloned();
                let event = match saved {
                    Some(event) => event,
                    None => load_event(app, &id).await?,
                };
                app.dispatch(Action::FavoritesToggle(event.clone()));
                let verb = if app.state().favorites.is_favorite(&id) {
                    "Saved"
                } else {
                    "Removed"
                };
                println!("{verb} {}", event.name);
            }
            FavoritesCommand::Clear => {
                app.dispatch(Action::FavoritesClear);
                println!("Favorites cleared.");
            }
        },

        Command::Theme { command } => {
            match command {
                ThemeCommand::Show => {}
                ThemeCommand::Set { mode } => {
                    app.dispatch(Action::ThemeSetMode(mode));
                }
                ThemeCommand::Toggle => {
                    app.dispatch(Action::ThemeToggle);
                }
                ThemeCommand::Color { key, value } => {
                    app.dispatch(Action::ThemeSetColor { key, value });
                }
                ThemeCommand::Reset => {
                    app.dispatch(Action::ThemeResetColors);
                }
            }
            print_theme(app.state());
        }

        Command::Watch { query, interval } => {
            watch(app, search_params(&query, config), interval).await?;
        }
    }
    Ok(())
}

async fn load_event(app: &mut App, id: &str) -> anyhow::Result<Event> {
    app.dispatch(Action::DetailOpen(id.to_string()));
    app.settle().await;
    let detail = &app.state().detail;
    if let Some(error) = &detail.error {
        bail!("could not load event {id}: {error}");
    }
    detail
        .event
        .clone()
        .with_context(|| format!("event {id} did not load"))
}

fn input_action(line: &str) -> Option<Action> {
    match line.trim() {
        "n" => Some(Action::SearchNextPage),
        "r" => Some(Action::SearchRefetch),
        "f" => Some(Action::AppDidFocus),
        _ => None,
    }
}

async fn watch(app: &mut App, params: SearchParams, interval: u64) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrl_c.cancel();
    });

    let mut subscriptions = Subscriptions::new(app.sender());
    subscriptions.interval("revalidate", Duration::from_secs(interval.max(1)), || {
        Action::AppDidFocus
    });
    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    subscriptions.stream(
        "input",
        lines.filter_map(|line| line.ok().as_deref().and_then(input_action)),
    );

    app.subscribe(|state: &AppState| {
        if !state.search.is_fetching {
            print_search(state);
        }
    });

    app.dispatch(Action::SearchSubmit(params));
    loop {
        tokio::select! {
            _ = app.process_next() => {}
            _ = shutdown.cancelled() => break,
        }
    }

    subscriptions.cancel_all();
    Ok(())
}

fn print_event_line(event: &Event, favorite: bool) {
    let marker = if favorite { "*" } else { " " };
    let time = event.formatted_time().unwrap_or_default();
    println!(
        "{marker} {:<14} {} {:<8} {} @ {}",
        event.id,
        event.formatted_date(),
        time,
        event.name,
        event.venue_name()
    );
}

fn print_search(state: &AppState) {
    let search = &state.search;
    if let Some(error) = &search.error {
        eprintln!("error: {error}");
        return;
    }
    let Some(response) = &search.response else {
        return;
    };
    if response.events.is_empty() {
        println!("No events found.");
        return;
    }
    for event in &response.events {
        print_event_line(event, state.favorites.is_favorite(&event.id));
    }
    println!(
        "page {} of {} ({} events){}",
        response.page.number + 1,
        response.page.total_pages.max(1),
        response.page.total_elements,
        if search.has_more() { ", more available" } else { "" }
    );
}

fn print_event_detail(event: &Event, favorite: bool) {
    println!("{}{}", event.name, if favorite { "  [favorite]" } else { "" });
    println!("  id:       {}", event.id);
    match event.formatted_time() {
        Some(time) => println!("  when:     {} at {time}", event.formatted_date()),
        None => println!("  when:     {}", event.formatted_date()),
    }
    println!("  venue:    {}", event.venue_name());
    if let Some(address) = event.venue_address() {
        println!("  address:  {address}");
    }
    if let Some((lat, lon)) = event.coordinates() {
        println!("  location: {lat:.4}, {lon:.4}");
    }
    if let Some(category) = event.category_label() {
        println!("  category: {category}");
    }
    if let Some(price) = event.price_label() {
        println!("  price:    {price}");
    }
    if let Some(info) = &event.info {
        println!("  info:     {info}");
    }
    if let Some(note) = &event.please_note {
        println!("  note:     {note}");
    }
    if !event.url.is_empty() {
        println!("  tickets:  {}", event.url);
    }
    if let Some(image) = event.primary_image_url() {
        println!("  image:    {image}");
    }
}

fn print_theme(state: &AppState) {
    let theme = &state.theme;
    println!("mode: {}", theme.mode());
    for (key, value) in theme.colors().entries() {
        let custom = theme.custom_colors().get(key);
        if custom != value {
            println!("  {:<18} {:<22} (custom: {custom})", key.label(), value);
        } else {
            println!("  {:<18} {}", key.label(), value);
        }
    }
}

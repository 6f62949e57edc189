mod browser;
mod config;
mod files;
mod theme;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use linkstack_core::render::domain_of;
use linkstack_core::{
    normalize_url, parse_tags, App, Entries, FileSource, JsonFileStore, Locator, MemStore,
    NewFile, NewLink, Outcome, Selector, SqliteStore, Store, ToggleField, UiEvent, ViewMode,
    ViewState,
};
use tracing_subscriber::EnvFilter;

use crate::config::Storage;

#[derive(Parser)]
#[command(name = "linkstack", version, about = "Keep links and files in one place")]
struct Cli {
    /// Storage backend, overriding settings.toml
    #[arg(long, global = true, value_enum)]
    store: Option<StoreKind>,
    /// Database file (sqlite) or data directory (json)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Sqlite,
    Json,
    Mem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a link
    Add {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        folder: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Store a local file
    AddFile {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// List items under a tab and optional search
    List {
        /// "All Items", "Favourites", "Link Later", "Pinned" or a folder name
        #[arg(long)]
        tab: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        view: Option<ViewMode>,
        #[arg(long)]
        json: bool,
    },
    /// Show one item in detail
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Replace an item's note
    Note { id: String, text: String },
    /// Set a flag: fav, pinned or later
    Set {
        id: String,
        field: ToggleField,
        #[arg(value_enum)]
        state: Switch,
    },
    Delete { id: String },
    /// Write a stored file back to disk
    Download {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Folder names in use
    Folders,
    /// Tags in use
    Tags,
    /// Print resolved settings and paths
    Config {
        #[arg(long)]
        json: bool,
    },
    /// Interactive browser (default)
    Pick,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Pick);
    // before settings, so a bad settings.toml is reported
    init_logging(matches!(command, Commands::Pick));
    let settings = config::load_settings();

    if let Commands::Config { json } = command {
        return print_config(&cli, &settings, json);
    }

    let store = open_store(cli.store, cli.db.clone(), &settings)?;
    let mut app = App::with_view(
        store,
        ViewState {
            mode: settings.view_mode(),
            ..Default::default()
        },
    );
    if let Some(reason) = app.library().load_error() {
        if !matches!(command, Commands::Pick) {
            eprintln!("warning: stored items unreadable, starting empty: {reason}");
        }
    }

    match command {
        Commands::Add {
            url,
            title,
            folder,
            tags,
        } => {
            let title = title.unwrap_or_else(|| domain_of(&normalize_url(&url)));
            let out = app.dispatch(UiEvent::CreateLinkSubmitted(NewLink {
                title,
                url,
                folder,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            }))?;
            print_created(out);
        }
        Commands::AddFile {
            path,
            title,
            folder,
            tags,
            mime,
        } => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("path has no file name")?;
            let file_type = mime.unwrap_or_else(|| files::guess_mime(&path));
            let out = app.dispatch(UiEvent::CreateFileSubmitted {
                input: NewFile {
                    title,
                    folder,
                    tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                    file_name,
                    file_type,
                    file_size: None,
                },
                source: FileSource::Path(path),
            })?;
            print_created(out);
        }
        Commands::List {
            tab,
            search,
            view,
            json,
        } => {
            if let Some(tab) = tab {
                app.dispatch(UiEvent::TabSelected(Selector::from_label(&tab)))?;
            }
            if let Some(q) = search {
                app.dispatch(UiEvent::SearchChanged(q))?;
            }
            if let Some(mode) = view {
                app.dispatch(UiEvent::ViewModeSelected(mode))?;
            }
            let feed = app.feed();
            if json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else {
                match &feed.entries {
                    Entries::Empty => eprintln!("no items under {}", feed.heading),
                    Entries::Grid(cards) => {
                        for c in cards {
                            println!("{}\t{}\t{}\t{}", c.id, star(c.fav), c.title, c.subtitle);
                        }
                    }
                    Entries::List(rows) => {
                        for r in rows {
                            println!("{}\t{}\t{}\t{}", r.id, star(r.fav), r.title, r.detail);
                        }
                    }
                }
            }
        }
        Commands::Show { id, json } => {
            app.dispatch(UiEvent::ItemSelected(id.clone()))?;
            let Some(insp) = app.inspector() else {
                bail!("no item with id {id}");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&insp)?);
            } else {
                println!("{}", insp.title);
                match &insp.locator {
                    Locator::Link { url } => println!("url: {url}"),
                    Locator::File { file_name, size } => println!("file: {file_name} ({size})"),
                }
                println!("folder: {}", insp.folder);
                if insp.tags.is_empty() {
                    println!("tags: No tags");
                } else {
                    println!("tags: {}", insp.tags.join(", "));
                }
                println!(
                    "fav: {} pinned: {} later: {}",
                    insp.fav, insp.pinned, insp.later
                );
                println!("added: {}", insp.created_at);
                if !insp.note.is_empty() {
                    println!("note: {}", insp.note);
                }
            }
        }
        Commands::Note { id, text } => {
            ensure_exists(&app, &id)?;
            app.dispatch(UiEvent::NoteBlurred {
                id: id.clone(),
                text,
            })?;
            println!("noted {id}");
        }
        Commands::Set { id, field, state } => {
            ensure_exists(&app, &id)?;
            let value = state == Switch::On;
            app.dispatch(UiEvent::FieldToggled {
                id: id.clone(),
                field,
                value,
            })?;
            println!("{field} {} {id}", if value { "on" } else { "off" });
        }
        Commands::Delete { id } => match app.dispatch(UiEvent::DeleteConfirmed(id.clone()))? {
            Outcome::Deleted(Some(_)) => println!("deleted {id}"),
            _ => bail!("no item with id {id}"),
        },
        Commands::Download { id, out } => {
            ensure_exists(&app, &id)?;
            let Some(dl) = app.download(&id)? else {
                bail!("{id} is a link, only files can be downloaded");
            };
            let dir = out.unwrap_or_else(|| settings.download_dir());
            let path = files::save_download(&dir, &dl)?;
            println!("{}", path.display());
        }
        Commands::Folders => {
            for f in app.sidebar().folders {
                println!("{f}");
            }
        }
        Commands::Tags => {
            for t in app.sidebar().tags {
                println!("{t}");
            }
        }
        Commands::Pick => {
            let ctx = browser::BrowserContext {
                theme: theme::TuiTheme::from_colors(settings.theme_colors()),
                download_dir: settings.download_dir(),
            };
            browser::run_browser(&mut app, &ctx)?;
        }
        Commands::Config { json } => print_config(&cli, &settings, json)?,
    }

    Ok(())
}

/// CLI commands log to stderr; the browser logs to a file so the screen stays clean.
fn init_logging(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if interactive {
        let dir = config::state_dir();
        let file = std::fs::create_dir_all(&dir)
            .and_then(|_| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join("linkstack.log"))
            });
        if let Ok(file) = file {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init();
        }
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_store(
    kind: Option<StoreKind>,
    db: Option<PathBuf>,
    settings: &config::Settings,
) -> Result<Box<dyn Store>> {
    let kind = kind.unwrap_or(match settings.storage {
        Storage::Sqlite { .. } => StoreKind::Sqlite,
        Storage::Json { .. } => StoreKind::Json,
    });
    let store: Box<dyn Store> = match kind {
        StoreKind::Sqlite => {
            let path = db.unwrap_or_else(|| match &settings.storage {
                Storage::Sqlite { db_path: Some(p) } => p.clone(),
                _ => config::default_db_path(),
            });
            tracing::debug!(path = %path.display(), "opening sqlite store");
            Box::new(
                SqliteStore::new(&path)
                    .with_context(|| format!("opening database {}", path.display()))?,
            )
        }
        StoreKind::Json => {
            let dir = db.unwrap_or_else(|| match &settings.storage {
                Storage::Json { dir: Some(d) } => d.clone(),
                _ => config::default_json_dir(),
            });
            tracing::debug!(dir = %dir.display(), "opening json store");
            Box::new(JsonFileStore::new(dir))
        }
        StoreKind::Mem => Box::new(MemStore::new()),
    };
    Ok(store)
}

fn print_config(cli: &Cli, settings: &config::Settings, json: bool) -> Result<()> {
    let store = match cli.store {
        Some(StoreKind::Sqlite) => "sqlite",
        Some(StoreKind::Json) => "json",
        Some(StoreKind::Mem) => "mem",
        None => match settings.storage {
            Storage::Sqlite { .. } => "sqlite",
            Storage::Json { .. } => "json",
        },
    };
    if json {
        let v = serde_json::json!({
            "store": store,
            "storage": settings.storage,
            "tui": settings.tui,
            "config_dir": config::config_dir(),
            "settings_path": config::settings_path(),
            "state_dir": config::state_dir(),
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("store: {store}");
        println!("config dir: {}", config::config_dir().display());
        println!("settings: {}", config::settings_path().display());
        println!("state dir: {}", config::state_dir().display());
        println!("view mode: {}", settings.view_mode());
    }
    Ok(())
}

fn ensure_exists(app: &App, id: &str) -> Result<()> {
    if app.library().get(id).is_none() {
        bail!("no item with id {id}");
    }
    Ok(())
}

fn print_created(out: Outcome) {
    if let Outcome::Created(id) = out {
        println!("added {id}");
    }
}

fn star(fav: bool) -> &'static str {
    if fav {
        "*"
    } else {
        " "
    }
}

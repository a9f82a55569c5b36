//! Command handlers - build a session, drive it, render the result

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::{generate_sample_config, Config};
use crate::fetch::{FetchState, HttpTransport, UploadFile, ViewSession};
use crate::insights::{library_stats, most_searched, recent_searches, recently_added};
use crate::normalize::Normalizer;
use crate::prefs::{self, FileStorage, PreferenceStore, RootPresentation, Theme, ViewMode};
use crate::query::{filter_items, filter_results, SortKey, ViewQuery};

use super::render::{self, print_state};
use super::{
    AddLinkArgs, ConfigArgs, DashboardArgs, ListArgs, LogsArgs, PrefsArgs, SearchArgs, ShowArgs,
    UploadArgs,
};

pub type HttpSession = ViewSession<HttpTransport>;

/// Everything a command needs
pub struct AppContext {
    pub config: Config,
    pub json: bool,
    pub session: Arc<HttpSession>,
    pub prefs: &'static PreferenceStore,
}

impl AppContext {
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let transport = Arc::new(HttpTransport::from_config(&config.backend));
        let normalizer = Normalizer::new(config.display.date_locale);
        let session = Arc::new(ViewSession::new(transport, config.endpoints.clone(), normalizer));

        let store = PreferenceStore::new(
            Box::new(FileStorage::new(FileStorage::default_path())),
            Arc::new(RootPresentation::new()),
        );
        let prefs = prefs::install_global(store)?;
        prefs.initialize();

        info!(backend = %config.backend.base_url, "session ready");
        Ok(Self {
            config,
            json,
            session,
            prefs,
        })
    }

    fn view_mode(&self, requested: Option<ViewMode>) -> ViewMode {
        if let Some(mode) = requested {
            self.prefs.set_view_mode(mode);
        }
        self.prefs.view_mode()
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail_on_error<T>(what: &str, state: &FetchState<T>) -> Result<()> {
    if let Some(message) = state.error() {
        bail!("Could not load {}: {}", what, message);
    }
    Ok(())
}

// ============================================================================
// Read commands
// ============================================================================

pub async fn dashboard(ctx: &AppContext, args: &DashboardArgs) -> Result<()> {
    ctx.session.activate(args.query.as_deref()).await;
    let snapshot = ctx.session.snapshot();
    let display = &ctx.config.display;

    let recent = snapshot
        .documents
        .value()
        .map(|docs| recently_added(docs, display.recent_documents).to_vec());
    let top = snapshot.logs.value().map(|logs| most_searched(logs, display.most_searched));
    let history = snapshot
        .logs
        .value()
        .map(|logs| recent_searches(logs, display.recent_searches));
    let stats = library_stats(snapshot.documents.items(), snapshot.links.items());

    if ctx.json {
        return print_json(&serde_json::json!({
            "recentlyAdded": recent,
            "mostSearched": top,
            "recentSearches": history,
            "stats": stats,
            "search": snapshot.search,
            "errors": {
                "documents": snapshot.documents.error(),
                "links": snapshot.links.error(),
                "searchLogs": snapshot.logs.error(),
            },
        }));
    }

    render::print_header("Knowledge Lens");
    render::print_subheader("Library");
    render::print_stats(&stats);

    print_state("Recently Added", &snapshot.documents, |docs| {
        render::print_documents(recently_added(docs, display.recent_documents), ViewMode::List)
    });
    print_state("Most Searched", &snapshot.logs, |logs| {
        render::print_most_searched(&most_searched(logs, display.most_searched))
    });
    if let Some(history) = &history {
        render::print_subheader("Recent Searches");
        render::print_recent_searches(history);
    }
    if !snapshot.search.is_idle() {
        print_state("Search", &snapshot.search, |results| {
            render::print_results(results, results.len())
        });
    }
    Ok(())
}

pub async fn library(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    ctx.session.load_documents().await;
    let state = ctx.session.documents();
    fail_on_error("documents", &state)?;

    let sort = args.sort.map(SortKey::from).unwrap_or(ctx.config.display.default_sort);
    let docs = ViewQuery::new(args.filter.clone(), sort).apply(state.items());

    if ctx.json {
        return print_json(&docs);
    }

    render::print_subheader(&format!("Documents ({}, sorted by {})", docs.len(), sort.label()));
    render::print_documents(&docs, ctx.view_mode(args.view.map(Into::into)));
    Ok(())
}

pub async fn links(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    ctx.session.load_links().await;
    let state = ctx.session.links();
    fail_on_error("links", &state)?;

    let sort = args.sort.map(SortKey::from).unwrap_or(ctx.config.display.default_sort);
    let links = ViewQuery::new(args.filter.clone(), sort).apply(state.items());

    if ctx.json {
        return print_json(&links);
    }

    render::print_subheader(&format!("Links ({}, sorted by {})", links.len(), sort.label()));
    render::print_links(&links, ctx.view_mode(args.view.map(Into::into)));
    Ok(())
}

pub async fn search(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    ctx.session.search(&args.query).await;
    let state = ctx.session.search_results();
    fail_on_error("search results", &state)?;

    let Some(results) = state.value() else {
        bail!("Search query is empty");
    };
    let narrowed = filter_results(results, args.kind.into(), args.range.into(), Utc::now());

    if ctx.json {
        return print_json(&narrowed);
    }

    render::print_subheader("Search");
    render::print_results(&narrowed, results.len());
    Ok(())
}

pub async fn logs(ctx: &AppContext, args: &LogsArgs) -> Result<()> {
    ctx.session.load_logs().await;
    let state = ctx.session.logs();
    fail_on_error("search history", &state)?;

    let logs = filter_items(state.items(), &args.filter);

    if ctx.json {
        return print_json(&logs);
    }

    render::print_subheader(&format!("Search History ({})", logs.len()));
    render::print_logs(&logs, args.results);
    Ok(())
}

pub async fn show(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    ctx.session.load_document(&args.id).await;
    let state = ctx.session.document();
    fail_on_error("document", &state)?;

    let Some(doc) = state.value() else {
        bail!("Document {} was not loaded", args.id);
    };

    if ctx.json {
        return print_json(doc);
    }

    render::print_subheader("Document");
    render::print_document_detail(doc);
    Ok(())
}

// ============================================================================
// Mutations
// ============================================================================

pub async fn upload(ctx: &AppContext, args: &UploadArgs) -> Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = UploadFile::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let count = ctx.session.upload_documents(files).await?;
    if ctx.json {
        return print_json(&serde_json::json!({ "uploaded": count }));
    }
    render::print_success(&format!("Uploaded {} file(s)", count));
    Ok(())
}

pub async fn add_link(ctx: &AppContext, args: &AddLinkArgs) -> Result<()> {
    ctx.session.add_link(&args.url, args.title.as_deref()).await?;
    if ctx.json {
        return print_json(&serde_json::json!({ "saved": args.url }));
    }
    render::print_success(&format!("Saved {}", args.url));
    Ok(())
}

// ============================================================================
// Local commands
// ============================================================================

pub fn prefs(ctx: &AppContext, args: &PrefsArgs) -> Result<()> {
    let store = ctx.prefs;

    if let Some(theme) = args.theme {
        store.set_theme(Theme::from(theme))?;
    } else if args.toggle_theme {
        store.toggle_theme()?;
    }
    if let Some(accent) = &args.accent {
        store.set_accent(accent)?;
    }

    let current = store.preferences();
    if ctx.json {
        return print_json(&current);
    }

    render::print_subheader("Preferences");
    render::print_preferences(&current);
    if args.palette {
        render::print_subheader("Accent Palette");
        render::print_palette(&current.accent);
    }
    Ok(())
}

pub fn config(args: &ConfigArgs, config: &Config, path: &Path) -> Result<()> {
    if args.sample {
        print!("{}", generate_sample_config());
        return Ok(());
    }

    if args.init {
        if path.exists() {
            render::print_info(&format!("Config already exists at {}", path.display()));
        } else {
            Config::default().save_to(path)?;
            render::print_success(&format!("Created config at {}", path.display()));
        }
        return Ok(());
    }

    if path.exists() {
        render::print_info(&format!("Using config at {}", path.display()));
    } else {
        render::print_info(&format!(
            "No config at {} (defaults in use, run `knowledge-lens config --init`)",
            path.display()
        ));
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

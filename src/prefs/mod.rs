//! Preference Store - theme, accent color and layout choices
//!
//! Supports:
//! - Load-or-default from persisted storage at an explicit `initialize` step
//! - Applying theme and accent to the global presentation state
//! - Persisting every change made after initialization
//! - Sidebar and grid/list layout, kept in memory only

mod presentation;
mod storage;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use presentation::{PresentationSink, RootPresentation, PRIMARY_PROPERTY};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage, ACCENT_KEY, THEME_KEY};

// ============================================================================
// Theme & Accent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// A named entry of the accent palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccentSwatch {
    pub name: &'static str,
    pub value: &'static str,
}

pub const ACCENT_PALETTE: [AccentSwatch; 6] = [
    AccentSwatch { name: "Blue", value: "hsl(221, 83%, 53%)" },
    AccentSwatch { name: "Green", value: "hsl(142, 76%, 36%)" },
    AccentSwatch { name: "Orange", value: "hsl(24, 95%, 53%)" },
    AccentSwatch { name: "Purple", value: "hsl(262, 83%, 58%)" },
    AccentSwatch { name: "Pink", value: "hsl(326, 78%, 56%)" },
    AccentSwatch { name: "Red", value: "hsl(0, 84%, 60%)" },
];

pub fn default_accent() -> &'static str {
    ACCENT_PALETTE[0].value
}

/// Palette name ("green") or exact palette value to its color token
pub fn resolve_accent(input: &str) -> Option<&'static str> {
    let input = input.trim();
    ACCENT_PALETTE
        .iter()
        .find(|swatch| swatch.name.eq_ignore_ascii_case(input) || swatch.value == input)
        .map(|swatch| swatch.value)
}

pub fn is_color_token(input: &str) -> bool {
    let input = input.trim().to_ascii_lowercase();
    let functional = ["hsl(", "hsla(", "rgb(", "rgba("]
        .iter()
        .any(|prefix| input.starts_with(prefix))
        && input.ends_with(')');
    let hex = input.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
    });
    functional || hex
}

/// Palette name for a stored token, if it is one of ours
pub fn accent_name(value: &str) -> Option<&'static str> {
    ACCENT_PALETTE
        .iter()
        .find(|swatch| swatch.value == value)
        .map(|swatch| swatch.name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(anyhow!("unknown view mode '{}' (expected grid or list)", other)),
        }
    }
}

// ============================================================================
// Preference Store
// ============================================================================

/// Current preference values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub theme: Theme,
    pub accent: String,
    pub sidebar_open: bool,
    pub view_mode: ViewMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            accent: default_accent().to_string(),
            sidebar_open: true,
            view_mode: ViewMode::default(),
        }
    }
}

pub struct PreferenceStore {
    storage: Box<dyn PreferenceStorage>,
    sink: Arc<dyn PresentationSink>,
    state: RwLock<Preferences>,
    initialized: AtomicBool,
}

impl PreferenceStore {
    pub fn new(storage: Box<dyn PreferenceStorage>, sink: Arc<dyn PresentationSink>) -> Self {
        Self {
            storage,
            sink,
            state: RwLock::new(Preferences::default()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Load persisted values over the defaults and apply them.
    ///
    /// Nothing is written here; writes start with the first change after it.
    pub fn initialize(&self) -> Preferences {
        if self.is_initialized() {
            return self.preferences();
        }

        {
            let mut state = self.state.write();

            match self.storage.get(THEME_KEY) {
                Ok(Some(saved)) => match saved.parse::<Theme>() {
                    Ok(theme) => state.theme = theme,
                    Err(e) => warn!("Ignoring saved theme: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("Could not read saved theme: {:#}", e),
            }

            match self.storage.get(ACCENT_KEY) {
                Ok(Some(saved)) if !saved.trim().is_empty() => state.accent = saved,
                Ok(_) => {}
                Err(e) => warn!("Could not read saved accent color: {:#}", e),
            }
        }

        let prefs = self.preferences();
        self.apply_theme(prefs.theme);
        self.apply_accent(&prefs.accent);
        self.initialized.store(true, Ordering::Release);
        info!(theme = %prefs.theme, accent = %prefs.accent, "preferences initialized");
        prefs
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn preferences(&self) -> Preferences {
        self.state.read().clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.read().theme
    }

    pub fn accent(&self) -> String {
        self.state.read().accent.clone()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.state.write().theme = theme;
        self.apply_theme(theme);
        self.persist(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Accepts a palette name, or any `hsl(..)`, `rgb(..)` or `#hex` token
    pub fn set_accent(&self, input: &str) -> Result<String> {
        let value = match resolve_accent(input) {
            Some(value) => value.to_string(),
            None if is_color_token(input) => input.trim().to_string(),
            None => {
                let names: Vec<&str> = ACCENT_PALETTE.iter().map(|s| s.name).collect();
                bail!("unknown accent color '{}' (choose one of {})", input.trim(), names.join(", "));
            }
        };

        self.state.write().accent = value.clone();
        self.apply_accent(&value);
        self.persist(ACCENT_KEY, &value)?;
        Ok(value)
    }

    pub fn sidebar_open(&self) -> bool {
        self.state.read().sidebar_open
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.state.write().sidebar_open = open;
    }

    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.state.write();
        state.sidebar_open = !state.sidebar_open;
        state.sidebar_open
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.read().view_mode
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.state.write().view_mode = mode;
    }

    fn apply_theme(&self, theme: Theme) {
        self.sink.set_root_class("dark", theme == Theme::Dark);
        self.sink.set_root_class("light", theme == Theme::Light);
    }

    fn apply_accent(&self, value: &str) {
        self.sink.set_property(PRIMARY_PROPERTY, value);
    }

    fn persist(&self, key: &str, value: &str) -> Result<()> {
        if !self.is_initialized() {
            debug!(key, "not initialized yet, skipping write");
            return Ok(());
        }
        self.storage.set(key, value)
    }
}

// ============================================================================
// Process-wide instance
// ============================================================================

static GLOBAL: OnceCell<PreferenceStore> = OnceCell::new();

/// Install the process-wide store; fails if one is already installed
pub fn install_global(store: PreferenceStore) -> Result<&'static PreferenceStore> {
    GLOBAL
        .set(store)
        .map_err(|_| anyhow!("preference store already installed"))?;
    GLOBAL
        .get()
        .ok_or_else(|| anyhow!("preference store missing after install"))
}

pub fn global() -> Option<&'static PreferenceStore> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(storage: MemoryStorage) -> (PreferenceStore, Arc<RootPresentation>) {
        let root = Arc::new(RootPresentation::new());
        let store = PreferenceStore::new(Box::new(storage), root.clone());
        (store, root)
    }

    #[test]
    fn test_defaults_without_saved_values() {
        let (store, root) = store_with(MemoryStorage::new());
        let prefs = store.initialize();

        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.accent, "hsl(221, 83%, 53%)");
        assert!(root.has_class("dark"));
        assert!(!root.has_class("light"));
        assert_eq!(root.property(PRIMARY_PROPERTY).as_deref(), Some("hsl(221, 83%, 53%)"));
    }

    #[test]
    fn test_saved_values_win() {
        let storage = MemoryStorage::new()
            .with(THEME_KEY, "light")
            .with(ACCENT_KEY, "hsl(142, 76%, 36%)");
        let (store, root) = store_with(storage);

        let prefs = store.initialize();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(accent_name(&prefs.accent), Some("Green"));
        assert!(root.has_class("light"));
    }

    #[test]
    fn test_invalid_saved_theme_ignored() {
        let (store, _) = store_with(MemoryStorage::new().with(THEME_KEY, "sepia"));
        assert_eq!(store.initialize().theme, Theme::Dark);
    }

    #[test]
    fn test_no_writes_before_initialize() {
        let storage = Arc::new(MemoryStorage::new().with(THEME_KEY, "light"));
        let root = Arc::new(RootPresentation::new());
        let store = PreferenceStore::new(Box::new(SharedStorage(storage.clone())), root.clone());

        store.set_theme(Theme::Dark).unwrap();
        assert!(root.has_class("dark"));
        assert_eq!(storage.entries().get(THEME_KEY).map(String::as_str), Some("light"));

        store.initialize();
        assert_eq!(storage.entries().len(), 1);

        assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(storage.entries().get(THEME_KEY).map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_set_accent_by_name_and_value() {
        let storage = Arc::new(MemoryStorage::new());
        let root = Arc::new(RootPresentation::new());
        let store = PreferenceStore::new(Box::new(SharedStorage(storage.clone())), root.clone());
        store.initialize();

        assert_eq!(store.set_accent("purple").unwrap(), "hsl(262, 83%, 58%)");
        assert_eq!(root.property(PRIMARY_PROPERTY).as_deref(), Some("hsl(262, 83%, 58%)"));
        assert_eq!(store.set_accent("hsl(0, 84%, 60%)").unwrap(), "hsl(0, 84%, 60%)");
        assert_eq!(
            storage.entries().get(ACCENT_KEY).map(String::as_str),
            Some("hsl(0, 84%, 60%)")
        );

        assert!(store.set_accent("chartreuse").is_err());
        assert_eq!(store.accent(), "hsl(0, 84%, 60%)");

        assert_eq!(store.set_accent(" #FF8800 ").unwrap(), "#FF8800");
        assert_eq!(accent_name(&store.accent()), None);
    }

    #[test]
    fn test_color_tokens() {
        assert!(is_color_token("hsl(200, 50%, 50%)"));
        assert!(is_color_token("#abc"));
        assert!(!is_color_token("#abcde"));
        assert!(!is_color_token("hsl(200"));
        assert!(!is_color_token("teal"));
    }

    #[test]
    fn test_layout_is_memory_only() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PreferenceStore::new(
            Box::new(SharedStorage(storage.clone())),
            Arc::new(RootPresentation::new()),
        );
        store.initialize();

        assert!(store.sidebar_open());
        assert!(!store.toggle_sidebar());
        store.set_view_mode(ViewMode::List);
        assert_eq!(store.view_mode(), ViewMode::List);
        assert!(storage.entries().is_empty());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!(" Dark ".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!("list".parse::<ViewMode>().unwrap(), ViewMode::List);
    }

    struct SharedStorage(Arc<MemoryStorage>);

    impl PreferenceStorage for SharedStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }
    }
}

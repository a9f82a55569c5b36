//! Terminal rendering for view models

use colored::*;

use crate::fetch::FetchState;
use crate::insights::{LibraryStats, QueryCount};
use crate::merge::SearchResults;
use crate::model::{NormalizedDocument, NormalizedLink, ResultKind, SearchLogView};
use crate::prefs::{accent_name, Preferences, ViewMode, ACCENT_PALETTE};

pub struct StatusIcons;

impl StatusIcons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const INFO: &'static str = "ℹ";
    pub const DOCUMENT: &'static str = "📄";
    pub const LINK: &'static str = "🔗";

    pub fn for_kind(kind: ResultKind) -> &'static str {
        match kind {
            ResultKind::Document => Self::DOCUMENT,
            ResultKind::Link => Self::LINK,
        }
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    let width: usize = 60;
    let padding = width.saturating_sub(title.chars().count() + 4) / 2;

    println!();
    println!("{}", "═".repeat(width).cyan());
    println!("{}  {}", " ".repeat(padding), title.bright_white().bold());
    println!("{}", "═".repeat(width).cyan());
    println!();
}

/// Print a styled subheader
pub fn print_subheader(title: &str) {
    println!("\n{} {}", "▶".bright_cyan(), title.bright_white());
    println!("{}", "─".repeat(40).bright_black());
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.bright_black(), value.white());
}

pub fn print_success(msg: &str) {
    println!("{} {}", StatusIcons::SUCCESS.green(), msg.green());
}

pub fn print_error(msg: &str) {
    println!("{} {}", StatusIcons::ERROR.red(), msg.red());
}

pub fn print_info(msg: &str) {
    println!("{} {}", StatusIcons::INFO.cyan(), msg.cyan());
}

/// Pad or cut to exactly `width` columns
pub fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width == 0 {
        String::new()
    } else {
        let cut: String = text.chars().take(width - 1).collect();
        format!("{}…", cut)
    }
}

/// Render one section according to its fetch state
pub fn print_state<T>(section: &str, state: &FetchState<T>, render: impl FnOnce(&T)) {
    print_subheader(section);
    match state {
        FetchState::Idle => println!("  {}", "Nothing loaded".bright_black()),
        FetchState::Loading => println!("  {}", "Loading…".bright_black()),
        FetchState::Error(message) => print_error(&format!("Could not load {}: {}", section.to_lowercase(), message)),
        FetchState::Success(value) => render(value),
    }
}

// ============================================================================
// Collections
// ============================================================================

pub fn print_documents(documents: &[NormalizedDocument], mode: ViewMode) {
    if documents.is_empty() {
        println!("  {}", "No documents found".bright_black());
        return;
    }

    match mode {
        ViewMode::List => {
            println!(
                "  {} {} {} {} {}",
                fit("Title", 36).bold(),
                fit("Type", 10).bold(),
                fit("Size", 10).bold(),
                fit("Owner", 18).bold(),
                "Modified".bold()
            );
            for doc in documents {
                println!(
                    "  {} {} {} {} {}",
                    fit(&doc.title, 36).white(),
                    fit(&doc.file_type, 10).cyan(),
                    fit(&doc.size, 10),
                    fit(&doc.owner, 18).bright_black(),
                    doc.last_modified
                );
            }
        }
        ViewMode::Grid => {
            for doc in documents {
                println!("  {} {}", StatusIcons::DOCUMENT, doc.title.bright_white().bold());
                println!(
                    "     {} · {} · {} · {}",
                    doc.file_type.cyan(),
                    doc.size,
                    doc.owner.bright_black(),
                    doc.last_modified.bright_black()
                );
            }
        }
    }
}

pub fn print_links(links: &[NormalizedLink], mode: ViewMode) {
    if links.is_empty() {
        println!("  {}", "No links found".bright_black());
        return;
    }

    match mode {
        ViewMode::List => {
            println!(
                "  {} {} {} {}",
                fit("Title", 36).bold(),
                fit("Host", 22).bold(),
                fit("Owner", 18).bold(),
                "Added".bold()
            );
            for link in links {
                println!(
                    "  {} {} {} {}",
                    fit(&link.title, 36).white(),
                    fit(&link.host, 22).cyan(),
                    fit(&link.owner, 18).bright_black(),
                    link.last_modified
                );
            }
        }
        ViewMode::Grid => {
            for link in links {
                println!("  {} {}", StatusIcons::LINK, link.title.bright_white().bold());
                println!(
                    "     {} · {} · {}",
                    link.host.cyan(),
                    link.owner.bright_black(),
                    link.last_modified.bright_black()
                );
            }
        }
    }
}

pub fn print_results(results: &SearchResults, total: usize) {
    if results.len() == total {
        println!("  {}", results.summary().bright_white());
    } else {
        println!(
            "  {} {}",
            results.summary().bright_white(),
            format!("({} before filters)", total).bright_black()
        );
    }
    println!();

    for item in &results.items {
        println!(
            "  {} {} {}",
            StatusIcons::for_kind(item.kind()),
            item.title().bright_white(),
            format!("[{}]", item.kind().label()).bright_black()
        );
        println!("     {}", item.source().cyan());
    }
}

pub fn print_logs(logs: &[SearchLogView], with_results: bool) {
    if logs.is_empty() {
        println!("  {}", "No searches yet".bright_black());
        return;
    }

    for log in logs {
        println!(
            "  {} {} {}",
            fit(&log.date, 12).bright_black(),
            log.query.bright_white(),
            format!("({} results)", log.result_count()).bright_black()
        );
        if with_results {
            for item in &log.results {
                println!("      {} {}", StatusIcons::for_kind(item.kind()), item.title());
            }
        }
    }
}

pub fn print_document_detail(doc: &NormalizedDocument) {
    print_kv("Title", &doc.title);
    print_kv("Id", &doc.id);
    print_kv("Type", &doc.file_type);
    print_kv("Size", &doc.size);
    print_kv("Owner", &doc.owner);
    print_kv("Modified", &doc.last_modified);
}

// ============================================================================
// Dashboard
// ============================================================================

pub fn print_most_searched(top: &[QueryCount]) {
    if top.is_empty() {
        println!("  {}", "No searches yet".bright_black());
        return;
    }
    for (rank, entry) in top.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("{}.", rank + 1).bright_black(),
            fit(&entry.query, 40).white(),
            format!("{} searches", entry.count).cyan()
        );
    }
}

pub fn print_recent_searches(queries: &[String]) {
    if queries.is_empty() {
        return;
    }
    let chips: Vec<String> = queries
        .iter()
        .map(|q| format!("[{}]", q).cyan().to_string())
        .collect();
    println!("  {}", chips.join(" "));
}

pub fn print_stats(stats: &LibraryStats) {
    print_kv("Documents", &stats.documents.to_string());
    print_kv("Links", &stats.links.to_string());
    print_kv("Library size", &stats.total_size);
}

pub fn print_preferences(prefs: &Preferences) {
    print_kv("Theme", prefs.theme.as_str());
    let accent = match accent_name(&prefs.accent) {
        Some(name) => format!("{} ({})", name, prefs.accent),
        None => prefs.accent.clone(),
    };
    print_kv("Accent", &accent);
}

pub fn print_palette(current: &str) {
    for swatch in ACCENT_PALETTE.iter() {
        let marker = if swatch.value == current { "●" } else { "○" };
        println!("  {} {} {}", marker.cyan(), fit(swatch.name, 8), swatch.value.bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("héllo", 5), "héllo");
        assert_eq!(fit("x", 0), "");
    }

    #[test]
    fn test_kind_icons() {
        assert_eq!(StatusIcons::for_kind(ResultKind::Document), StatusIcons::DOCUMENT);
        assert_eq!(StatusIcons::for_kind(ResultKind::Link), StatusIcons::LINK);
    }

    #[test]
    fn test_header_handles_long_titles() {
        print_header(&"x".repeat(80));
        print_header("Library");
    }
}

//! Action catalog and executor for local system operations.
//!
//! Every outcome, success or failure, is reported as a single user-facing
//! string. Operations are externally observable and irreversible; there is
//! no rollback on partial failure.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use sysinfo::System;
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;

use crate::config::ActionConfig;
use crate::models::{Intent, IntentKind};

const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

const MAX_SEARCH_RESULTS: usize = 30;
const SHOWN_SEARCH_RESULTS: usize = 10;
const SEARCH_DEPTH: usize = 4;

/// Friendly names resolved to launchable binaries.
const APP_ALIASES: &[(&str, &str)] = &[
    ("chrome", "chrome"),
    ("google chrome", "chrome"),
    ("firefox", "firefox"),
    ("edge", "msedge"),
    ("microsoft edge", "msedge"),
    ("notepad", "notepad"),
    ("calculator", "calc"),
    ("calc", "calc"),
    ("explorer", "explorer"),
    ("file explorer", "explorer"),
    ("terminal", "wt"),
    ("cmd", "cmd"),
    ("powershell", "powershell"),
    ("spotify", "spotify"),
    ("code", "code"),
    ("vscode", "code"),
    ("vs code", "code"),
    ("paint", "mspaint"),
    ("word", "winword"),
    ("excel", "excel"),
    ("powerpoint", "powerpnt"),
    ("discord", "discord"),
    ("slack", "slack"),
    ("teams", "teams"),
    ("vlc", "vlc"),
    ("obs", "obs64"),
    ("task manager", "taskmgr"),
];

/// Folder keywords recognized in "open <folder>" phrases.
const FOLDERS: &[&str] = &[
    "desktop",
    "documents",
    "downloads",
    "pictures",
    "music",
    "videos",
    "home",
];

#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("Couldn't find '{0}' running.")]
    ProcessNotFound(String),
    #[error("Couldn't launch '{0}': {1}")]
    LaunchFailed(String, String),
    #[error("Couldn't open the browser: {0}")]
    BrowserLaunchFailed(String),
    #[error("Screenshot failed: {0}")]
    CaptureFailed(String),
}

/// Match a target phrase against the app catalog; returns the canonical
/// friendly name. Substring matching in both directions mirrors how people
/// type app names ("vs code", "code").
pub fn known_app(target: &str) -> Option<&'static str> {
    APP_ALIASES
        .iter()
        .find(|(name, _)| target.contains(name) || name.contains(target))
        .map(|(name, _)| *name)
}

/// Folder keyword contained in a target phrase, if any.
pub fn known_folder(target: &str) -> Option<&'static str> {
    FOLDERS.iter().find(|name| target.contains(*name)).copied()
}

/// Run a matched intent. Callers only pass intents with a real kind; a
/// `None` kind is answered with a shrug rather than a panic.
pub fn execute(intent: &Intent, config: &ActionConfig) -> Result<String, ActionError> {
    match intent.kind {
        IntentKind::OpenApp => open_app(&intent.argument),
        IntentKind::CloseApp => close_app(&intent.argument),
        IntentKind::OpenUrl => open_url(&intent.argument),
        IntentKind::SearchWeb => search_web(&intent.argument),
        IntentKind::OpenFolder => open_folder(&intent.argument),
        IntentKind::Screenshot => screenshot(config),
        IntentKind::FileSearch => Ok(file_search(&intent.argument)),
        IntentKind::None => {
            log::warn!("execute called with an empty intent");
            Ok("Nothing to do.".to_string())
        }
    }
}

fn resolve_app(name: &str) -> &str {
    APP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, binary)| *binary)
        .unwrap_or(name)
}

fn open_app(name: &str) -> Result<String, ActionError> {
    let binary = resolve_app(name);
    Command::new(binary)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| ActionError::LaunchFailed(name.to_string(), err.to_string()))?;
    Ok(format!("Opened {name}"))
}

fn close_app(name: &str) -> Result<String, ActionError> {
    let binary = resolve_app(name);
    let mut system = System::new();
    system.refresh_processes();

    let mut killed = 0;
    for process in system.processes_by_name(binary) {
        if process.kill() {
            killed += 1;
        }
    }
    if killed == 0 && binary != name {
        for process in system.processes_by_name(name) {
            if process.kill() {
                killed += 1;
            }
        }
    }

    if killed == 0 {
        return Err(ActionError::ProcessNotFound(name.to_string()));
    }
    Ok(format!("Closed {name}"))
}

/// Prefix bare hosts with https so the OS opener treats them as web URLs.
fn normalize_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

fn open_url(raw: &str) -> Result<String, ActionError> {
    let url = normalize_url(raw);
    open::that(&url).map_err(|err| ActionError::BrowserLaunchFailed(err.to_string()))?;
    Ok(format!("Opened {url}"))
}

fn build_search_url(query: &str) -> String {
    Url::parse_with_params(SEARCH_ENDPOINT, &[("q", query)])
        .map(String::from)
        .unwrap_or_else(|_| SEARCH_ENDPOINT.to_string())
}

fn search_web(query: &str) -> Result<String, ActionError> {
    let url = build_search_url(query);
    open::that(&url).map_err(|err| ActionError::BrowserLaunchFailed(err.to_string()))?;
    Ok(format!("Searching the web for \"{query}\""))
}

/// Expand a leading `~` against the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix('~') {
        if let Some(home) = home::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(raw)
}

/// Resolve a folder keyword from the catalog to its real path.
fn folder_path(keyword: &str) -> Option<PathBuf> {
    let home = home::home_dir()?;
    match keyword {
        "desktop" => Some(home.join("Desktop")),
        "documents" => Some(home.join("Documents")),
        "downloads" => Some(home.join("Downloads")),
        "pictures" => Some(home.join("Pictures")),
        "music" => Some(home.join("Music")),
        "videos" => Some(home.join("Videos")),
        "home" => Some(home),
        _ => None,
    }
}

fn open_folder(target: &str) -> Result<String, ActionError> {
    let path = folder_path(target).unwrap_or_else(|| expand_home(target));
    if !path.exists() {
        return Ok(format!("Folder not found: {}", path.display()));
    }
    open::that(&path)
        .map_err(|err| ActionError::LaunchFailed(path.display().to_string(), err.to_string()))?;
    Ok(format!("Opened {}", path.display()))
}

fn screenshot(config: &ActionConfig) -> Result<String, ActionError> {
    let monitors =
        xcap::Monitor::all().map_err(|err| ActionError::CaptureFailed(err.to_string()))?;
    let monitor = monitors
        .first()
        .ok_or_else(|| ActionError::CaptureFailed("no monitor found".to_string()))?;
    let image = monitor
        .capture_image()
        .map_err(|err| ActionError::CaptureFailed(err.to_string()))?;

    let dir = config.screenshot_dir();
    std::fs::create_dir_all(&dir).map_err(|err| ActionError::CaptureFailed(err.to_string()))?;
    let filename = format!(
        "deskmate_screenshot_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(filename);
    image
        .save(&path)
        .map_err(|err| ActionError::CaptureFailed(err.to_string()))?;

    Ok(format!("Screenshot saved to {}", path.display()))
}

fn search_roots() -> Vec<PathBuf> {
    let Some(home) = home::home_dir() else {
        return vec![];
    };
    vec![
        home.join("Desktop"),
        home.join("Documents"),
        home.join("Downloads"),
    ]
}

/// File search never fails hard; zero matches is a valid outcome.
fn file_search(pattern: &str) -> String {
    let matches = search_files(&search_roots(), pattern);
    if matches.is_empty() {
        return format!("No files matching '{pattern}' found in Desktop, Documents, or Downloads.");
    }

    let mut summary = format!("Found {} file(s) matching '{pattern}':\n", matches.len());
    for path in matches.iter().take(SHOWN_SEARCH_RESULTS) {
        summary.push_str(&format!("  {}\n", path.display()));
    }
    if matches.len() > SHOWN_SEARCH_RESULTS {
        summary.push_str(&format!(
            "  ... and {} more.",
            matches.len() - SHOWN_SEARCH_RESULTS
        ));
    }
    summary.trim_end().to_string()
}

fn search_files(roots: &[PathBuf], pattern: &str) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    for root in roots {
        if !root.exists() {
            continue;
        }
        for entry in WalkDir::new(root)
            .max_depth(SEARCH_DEPTH)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if matches_pattern(&name, &pattern.to_lowercase()) {
                matches.push(entry.path().to_path_buf());
                if matches.len() >= MAX_SEARCH_RESULTS {
                    return matches;
                }
            }
        }
    }
    matches
}

/// Minimal filename glob: `*.ext` suffix, `prefix*`, `a*b`, or substring.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !suffix.contains('*') {
            return name.ends_with(suffix);
        }
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        if !prefix.contains('*') {
            return name.starts_with(prefix);
        }
    }
    if let Some((prefix, suffix)) = pattern.split_once('*') {
        return name.starts_with(prefix) && name.ends_with(suffix);
    }
    name.contains(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_app_alias() {
        assert_eq!(resolve_app("vscode"), "code");
        assert_eq!(resolve_app("edge"), "msedge");
        assert_eq!(resolve_app("calculator"), "calc");
    }

    #[test]
    fn test_resolve_app_unknown_passes_through() {
        assert_eq!(resolve_app("blender"), "blender");
    }

    #[test]
    fn test_known_app_substring_both_ways() {
        assert_eq!(known_app("chrome"), Some("chrome"));
        assert_eq!(known_app("google chrome browser"), Some("chrome"));
        assert_eq!(known_app("xyzzy"), None);
    }

    #[test]
    fn test_known_folder() {
        assert_eq!(known_folder("documents folder"), Some("documents"));
        assert_eq!(known_folder("somewhere"), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(
            normalize_url("http://example.com"),
            "http://example.com"
        );
        assert_eq!(
            normalize_url("https://example.com"),
            "https://example.com"
        );
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let url = build_search_url("cats & dogs");
        assert!(!url.contains(' '));
        assert_eq!(url, "https://www.google.com/search?q=cats+%26+dogs");
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = home::home_dir() {
            assert_eq!(expand_home("~/projects"), home.join("projects"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_folder_path_keywords() {
        if home::home_dir().is_some() {
            assert!(folder_path("documents").unwrap().ends_with("Documents"));
            assert!(folder_path("desktop").unwrap().ends_with("Desktop"));
            assert!(folder_path("nonsense").is_none());
        }
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("report.pdf", "*.pdf"));
        assert!(!matches_pattern("report.pdfx", "*.pdf"));
        assert!(matches_pattern("report_final.docx", "report*"));
        assert!(matches_pattern("report_final.docx", "report*docx"));
        assert!(!matches_pattern("summary.docx", "report*"));
        assert!(matches_pattern("my-notes.txt", "notes"));
    }

    #[test]
    fn test_search_files_in_temp_tree() {
        let root = std::env::temp_dir().join("deskmate_search_test");
        let nested = root.join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("a.pdf"), b"x").unwrap();
        std::fs::write(root.join("b.txt"), b"x").unwrap();
        std::fs::write(nested.join("c.pdf"), b"x").unwrap();

        let roots = vec![root.clone()];
        let pdfs = search_files(&roots, "*.pdf");
        assert_eq!(pdfs.len(), 2);
        let txts = search_files(&roots, "*.txt");
        assert_eq!(txts.len(), 1);
        let none = search_files(&roots, "*.zip");
        assert!(none.is_empty());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_search_files_missing_root_is_empty() {
        let roots = vec![PathBuf::from("/definitely/not/a/real/dir")];
        assert!(search_files(&roots, "*.pdf").is_empty());
    }

    #[test]
    fn test_file_search_summary_never_fails() {
        let summary = file_search("*.zzz_no_such_ext");
        assert!(summary.contains("No files matching") || summary.contains("Found"));
    }
}

//! Intent detection from raw user text.
//!
//! A single ordered walk over trigger rules; the first rule that matches
//! wins. The ordering is policy, not accident: close-verbs are checked
//! before search-verbs so that "close search for cats" closes an app named
//! "search for cats" instead of searching the web, and web search is
//! checked before file search so that "find" alone stays file-flavored.
//! Matching is pure: no filesystem or process lookups happen here.

use crate::actions;
use crate::models::{Intent, IntentKind};

const CLOSE_VERBS: &[&str] = &["close", "kill", "exit", "quit", "stop", "terminate", "end"];
const SEARCH_VERBS: &[&str] = &["google", "search for", "search", "look up"];
const FIND_VERBS: &[&str] = &["find", "look for"];
const OPEN_VERBS: &[&str] = &["open", "launch", "start", "run", "go to", "navigate to"];

/// Sites recognized in "open <site>" phrases.
const SITES: &[(&str, &str)] = &[
    ("youtube", "https://www.youtube.com"),
    ("google", "https://www.google.com"),
    ("gmail", "https://mail.google.com"),
    ("github", "https://github.com"),
    ("reddit", "https://www.reddit.com"),
    ("twitter", "https://twitter.com"),
    ("facebook", "https://www.facebook.com"),
    ("instagram", "https://www.instagram.com"),
    ("linkedin", "https://www.linkedin.com"),
    ("twitch", "https://www.twitch.tv"),
    ("netflix", "https://www.netflix.com"),
    ("amazon", "https://www.amazon.com"),
    ("wikipedia", "https://www.wikipedia.org"),
    ("stack overflow", "https://stackoverflow.com"),
    ("stackoverflow", "https://stackoverflow.com"),
    ("whatsapp web", "https://web.whatsapp.com"),
    ("spotify", "https://open.spotify.com"),
];

/// Bare extension words that turn "find pdf files" into a `*.pdf` search.
const FILE_EXTENSIONS: &[&str] = &[
    "pdf", "txt", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "md", "csv", "jpg", "jpeg", "png",
    "gif", "mp3", "mp4", "zip", "exe",
];

/// Classify one user utterance. Returns `Intent::none()` when nothing in
/// the catalog applies; the caller sends those to the model instead.
pub fn detect(text: &str) -> Intent {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Intent::none();
    }

    if let Some(rest) = strip_verb(&lower, CLOSE_VERBS) {
        let target = clean_target(rest);
        let name = actions::known_app(target).unwrap_or(target);
        return Intent::new(IntentKind::CloseApp, name);
    }

    if lower.contains("screenshot") || lower.contains("screen shot") || lower.contains("screen capture")
    {
        return Intent::new(IntentKind::Screenshot, "");
    }

    if let Some(rest) = strip_verb(&lower, SEARCH_VERBS) {
        return Intent::new(IntentKind::SearchWeb, clean_target(rest));
    }

    if let Some(rest) = strip_verb(&lower, FIND_VERBS) {
        if let Some(pattern) = normalize_file_pattern(rest) {
            return Intent::new(IntentKind::FileSearch, pattern);
        }
        // "find me a recipe" is a question, not a file search; fall through.
    }

    if let Some(rest) = strip_verb(&lower, OPEN_VERBS) {
        let target = clean_target(rest);
        return classify_open_target(target);
    }

    Intent::none()
}

/// Resolve the argument of an open-verb phrase, in priority order:
/// explicit URL, known site, known folder, path-looking text, app name.
fn classify_open_target(target: &str) -> Intent {
    if target.starts_with("http://") || target.starts_with("https://") || target.starts_with("www.")
    {
        return Intent::new(IntentKind::OpenUrl, target);
    }

    for (site, url) in SITES {
        if target.contains(site) {
            return Intent::new(IntentKind::OpenUrl, *url);
        }
    }

    if let Some(folder) = actions::known_folder(target) {
        return Intent::new(IntentKind::OpenFolder, folder);
    }

    if target.contains('/') || target.contains('\\') || target.starts_with('~') {
        return Intent::new(IntentKind::OpenFolder, target);
    }

    let name = actions::known_app(target).unwrap_or(target);
    Intent::new(IntentKind::OpenApp, name)
}

/// Strip a leading trigger verb followed by whitespace. Multi-word verbs
/// must appear before their single-word prefixes in the list.
fn strip_verb<'a>(text: &'a str, verbs: &[&str]) -> Option<&'a str> {
    for verb in verbs {
        if let Some(rest) = text.strip_prefix(verb) {
            if let Some(rest) = rest.strip_prefix(' ') {
                let rest = rest.trim();
                if !rest.is_empty() {
                    return Some(rest);
                }
            }
        }
    }
    None
}

/// Drop filler articles and a trailing period from an extracted argument.
fn clean_target(rest: &str) -> &str {
    let rest = rest.strip_prefix("the ").unwrap_or(rest);
    let rest = rest.strip_prefix("my ").unwrap_or(rest);
    rest.trim().trim_end_matches('.').trim_end()
}

/// Turn the tail of a "find ..." phrase into a filename pattern, or reject
/// it when it does not look like one.
fn normalize_file_pattern(rest: &str) -> Option<String> {
    let mut pattern = clean_target(rest);
    for suffix in [" files", " file"] {
        pattern = pattern.strip_suffix(suffix).unwrap_or(pattern);
    }
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }

    if pattern.contains('*') || pattern.contains('?') {
        return Some(pattern.to_string());
    }
    if FILE_EXTENSIONS.contains(&pattern) {
        return Some(format!("*.{pattern}"));
    }
    if pattern.contains('.') && !pattern.contains(' ') {
        return Some(pattern.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> IntentKind {
        detect(text).kind
    }

    #[test]
    fn test_close_app() {
        let intent = detect("close chrome");
        assert_eq!(intent.kind, IntentKind::CloseApp);
        assert_eq!(intent.argument, "chrome");
    }

    #[test]
    fn test_close_strips_articles() {
        let intent = detect("kill the spotify");
        assert_eq!(intent.kind, IntentKind::CloseApp);
        assert_eq!(intent.argument, "spotify");
    }

    #[test]
    fn test_close_beats_search() {
        // First-rule-wins: the close verb shadows the search verb inside.
        let intent = detect("close search for cats");
        assert_eq!(intent.kind, IntentKind::CloseApp);
        assert_eq!(intent.argument, "search for cats");
    }

    #[test]
    fn test_close_unknown_app_keeps_raw_name() {
        let intent = detect("quit somethingelse");
        assert_eq!(intent.kind, IntentKind::CloseApp);
        assert_eq!(intent.argument, "somethingelse");
    }

    #[test]
    fn test_screenshot() {
        assert_eq!(kind_of("take a screenshot"), IntentKind::Screenshot);
        assert_eq!(kind_of("Take a Screenshot please"), IntentKind::Screenshot);
        assert_eq!(kind_of("grab a screen shot"), IntentKind::Screenshot);
    }

    #[test]
    fn test_search_web() {
        let intent = detect("google how to learn rust");
        assert_eq!(intent.kind, IntentKind::SearchWeb);
        assert_eq!(intent.argument, "how to learn rust");
    }

    #[test]
    fn test_search_for_strips_preposition() {
        let intent = detect("search for cats");
        assert_eq!(intent.kind, IntentKind::SearchWeb);
        assert_eq!(intent.argument, "cats");
    }

    #[test]
    fn test_look_up() {
        let intent = detect("look up rust iterators");
        assert_eq!(intent.kind, IntentKind::SearchWeb);
        assert_eq!(intent.argument, "rust iterators");
    }

    #[test]
    fn test_find_extension_word() {
        let intent = detect("find pdf files");
        assert_eq!(intent.kind, IntentKind::FileSearch);
        assert_eq!(intent.argument, "*.pdf");
    }

    #[test]
    fn test_find_glob_pattern() {
        let intent = detect("find *.txt");
        assert_eq!(intent.kind, IntentKind::FileSearch);
        assert_eq!(intent.argument, "*.txt");
    }

    #[test]
    fn test_find_exact_filename() {
        let intent = detect("find report.docx");
        assert_eq!(intent.kind, IntentKind::FileSearch);
        assert_eq!(intent.argument, "report.docx");
    }

    #[test]
    fn test_find_prose_is_not_a_file_search() {
        assert_eq!(kind_of("find me a good recipe"), IntentKind::None);
    }

    #[test]
    fn test_open_known_site() {
        let intent = detect("open youtube");
        assert_eq!(intent.kind, IntentKind::OpenUrl);
        assert_eq!(intent.argument, "https://www.youtube.com");
    }

    #[test]
    fn test_open_explicit_url() {
        let intent = detect("open https://example.com/docs");
        assert_eq!(intent.kind, IntentKind::OpenUrl);
        assert_eq!(intent.argument, "https://example.com/docs");
    }

    #[test]
    fn test_go_to_www_url() {
        let intent = detect("go to www.rust-lang.org");
        assert_eq!(intent.kind, IntentKind::OpenUrl);
        assert_eq!(intent.argument, "www.rust-lang.org");
    }

    #[test]
    fn test_open_known_folder() {
        let intent = detect("open my documents folder");
        assert_eq!(intent.kind, IntentKind::OpenFolder);
        assert_eq!(intent.argument, "documents");
    }

    #[test]
    fn test_open_path() {
        let intent = detect("open ~/projects");
        assert_eq!(intent.kind, IntentKind::OpenFolder);
        assert_eq!(intent.argument, "~/projects");
    }

    #[test]
    fn test_open_known_app() {
        let intent = detect("launch chrome");
        assert_eq!(intent.kind, IntentKind::OpenApp);
        assert_eq!(intent.argument, "chrome");
    }

    #[test]
    fn test_open_unknown_name_falls_back_to_app() {
        let intent = detect("open somethingelse");
        assert_eq!(intent.kind, IntentKind::OpenApp);
        assert_eq!(intent.argument, "somethingelse");
    }

    #[test]
    fn test_plain_question_is_none() {
        assert_eq!(kind_of("what's the capital of France"), IntentKind::None);
    }

    #[test]
    fn test_verb_requires_word_boundary() {
        // "closet" must not look like "close t...".
        assert_eq!(kind_of("closet organization tips"), IntentKind::None);
    }

    #[test]
    fn test_bare_verb_is_none() {
        assert_eq!(kind_of("open"), IntentKind::None);
        assert_eq!(kind_of("close "), IntentKind::None);
    }

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(kind_of(""), IntentKind::None);
        assert_eq!(kind_of("   "), IntentKind::None);
    }

    #[test]
    fn test_every_catalog_kind_is_reachable() {
        use strum::IntoEnumIterator;

        let samples = [
            (IntentKind::OpenApp, "open chrome"),
            (IntentKind::CloseApp, "close chrome"),
            (IntentKind::OpenUrl, "open youtube"),
            (IntentKind::SearchWeb, "google cats"),
            (IntentKind::Screenshot, "take a screenshot"),
            (IntentKind::FileSearch, "find pdf files"),
            (IntentKind::OpenFolder, "open my documents"),
        ];
        for kind in IntentKind::iter().filter(|kind| *kind != IntentKind::None) {
            let (_, phrase) = samples
                .iter()
                .find(|(sample_kind, _)| *sample_kind == kind)
                .expect("add a sample phrase for new intent kinds");
            assert_eq!(detect(phrase).kind, kind);
        }
    }
}

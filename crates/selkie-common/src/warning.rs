//! Selector warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the parser and matcher to report selector features that are
//! accepted but cannot match a static tree (pseudo-elements, `:hover`, ...).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record a warning key. Returns `true` the first time a key is seen.
fn record(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about a selector feature (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Select", "pseudo-element '::before' never matches an element");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(format!("[{component}] {message}")) {
        eprintln!("{}", format!("[Selkie {component}] ⚠ {message}").yellow());
    }
}

/// Whether `warn_once(component, message)` has printed since the last clear
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&format!("[{component}] {message}")))
}

/// Clear all recorded warnings (call before processing an unrelated query batch)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates() {
        let key = "[Test] dedupe-check".to_string();
        assert!(record(key.clone()));
        assert!(!record(key));
    }

    #[test]
    fn test_warn_once_does_not_panic_on_repeat() {
        warn_once("Test", "repeated message");
        warn_once("Test", "repeated message");
        assert!(!record("[Test] repeated message".to_string()));
        assert!(has_warned("Test", "repeated message"));
        assert!(!has_warned("Test", "never sent"));
    }
}

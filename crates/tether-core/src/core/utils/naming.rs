use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;

const COUNTER_PLACEHOLDER: &str = "%1%";

static COUNTERS: Lazy<Mutex<HashMap<String, usize>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Expands a name template into a process-unique name.
///
/// Every `%1%` in `template` is replaced by a counter private to that template,
/// starting at zero. Templates without the placeholder are returned unchanged.
///
/// ```
/// use tether::core::utils::naming::unique_name;
///
/// let first = unique_name("Doc%1%");
/// let second = unique_name("Doc%1%");
/// assert_ne!(first, second);
/// assert_eq!(unique_name("fixed"), "fixed");
/// ```
pub fn unique_name(template: &str) -> String {
    if !template.contains(COUNTER_PLACEHOLDER) {
        return template.to_string();
    }
    let index = {
        let mut counters = COUNTERS.lock();
        let counter = counters.entry(template.to_string()).or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    };
    template.replace(COUNTER_PLACEHOLDER, &index.to_string())
}

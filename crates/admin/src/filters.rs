//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Turn a `snake_case` identifier into a sentence.
///
/// Usage in templates: `{{ entry.action_type|humanize }}` renders
/// `admin_auto_login` as "Admin auto login".
#[askama::filter_fn]
pub fn humanize(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(humanize_str(&value.to_string()))
}

fn humanize_str(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let mut chars = spaced.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_str() {
        assert_eq!(humanize_str("admin_auto_login"), "Admin auto login");
        assert_eq!(humanize_str("order_status_changed"), "Order status changed");
        assert_eq!(humanize_str("pending"), "Pending");
        assert_eq!(humanize_str(""), "");
    }
}

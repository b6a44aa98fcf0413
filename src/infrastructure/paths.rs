//! Platform path helpers.
//!
//! Resolves where local files (trace output, offline index snapshots) live
//! and expands `~` in user-supplied paths.

use std::path::PathBuf;

const APP_DIR: &str = "restaurant-admin";

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Returns the directory for local data files.
///
/// `$XDG_DATA_HOME/restaurant-admin` when set, otherwise
/// `~/.local/share/restaurant-admin`, otherwise a directory under the system
/// temp dir.
#[must_use]
pub fn data_dir() -> PathBuf {
    let base = std::env::var_os("XDG_DATA_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir);

    base.join(APP_DIR)
}

/// Expands a leading `~` to the home directory.
///
/// Paths without one, or when no home directory is known, are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use restaurant_admin::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/var/log/admin.jsonl"), PathBuf::from("/var/log/admin.jsonl"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };

    match (rest, home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Resolves a user-supplied file path.
///
/// `~` is expanded; a relative result is placed under [`data_dir`].
#[must_use]
pub fn resolve_data_file(path: &str) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        expanded
    } else {
        data_dir().join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_untouched() {
        assert_eq!(resolve_data_file("/tmp/t.jsonl"), PathBuf::from("/tmp/t.jsonl"));
    }

    #[test]
    fn relative_paths_land_in_data_dir() {
        let resolved = resolve_data_file("traces.jsonl");

        assert!(resolved.starts_with(data_dir()));
        assert!(resolved.ends_with("restaurant-admin/traces.jsonl"));
    }

    #[test]
    fn tilde_only_expands_as_a_prefix() {
        assert_eq!(expand_tilde("a~/b"), PathBuf::from("a~/b"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }
}

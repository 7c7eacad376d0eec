//! Shortcut map: short command names for canonical `group:verb` forms.

/// The shortcut table. Keys are unique; order is cosmetic (listing).
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("create", "apps:create"),
    ("destroy", "apps:destroy"),
    ("info", "apps:info"),
    ("login", "auth:login"),
    ("logout", "auth:logout"),
    ("logs", "apps:logs"),
    ("open", "apps:open"),
    ("pull", "builds:create"),
    ("rollback", "releases:rollback"),
    ("run", "apps:run"),
    ("scale", "ps:scale"),
    ("whoami", "auth:whoami"),
];

/// Expand a shortcut, or hand the token back unchanged.
#[must_use]
pub fn expand(token: &str) -> &str {
    SHORTCUTS
        .iter()
        .find(|(short, _)| *short == token)
        .map_or(token, |(_, full)| *full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn known_shortcuts_expand() {
        assert_eq!(expand("create"), "apps:create");
        assert_eq!(expand("scale"), "ps:scale");
        assert_eq!(expand("whoami"), "auth:whoami");
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(expand("apps:list"), "apps:list");
        assert_eq!(expand("frobnicate"), "frobnicate");
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = SHORTCUTS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), SHORTCUTS.len());
    }

    #[test]
    fn every_target_is_group_verb() {
        for (_, full) in SHORTCUTS {
            let (group, verb) = full.split_once(':').expect("group:verb");
            assert!(!group.is_empty() && !verb.is_empty());
        }
    }
}

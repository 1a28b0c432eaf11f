use std::collections::HashMap;

/// Rosters shipped with the crate, keyed by name.
pub fn builtin_rosters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("fight_club", include_str!("../content/rosters/fight_club.json")),
        ("duel", include_str!("../content/rosters/duel.json")),
    ])
}

//! The display-color palette and its assignment rules.
//!
//! Every player on a roster carries a color key drawn from a fixed, ordered
//! palette. Two operations exist:
//!
//! - a pseudo-uniform random pick, used when a player first appears without
//!   a color, and
//! - a deterministic "cycle forward" step, used when a player advances their
//!   own color (wrapping past the last entry).
//!
//! Assignment is per-player and uncoordinated: two players can legitimately
//! end up with the same key. That is a deliberate simplification of the
//! matchmaking flow, not a bug to fix here.

use rand::Rng;

/// The palette, in cycling order.
pub const PALETTE: [&str; 11] = [
    "blue", "cyan", "green", "grey", "magenta", "red", "yellow", "pink", "orange", "purple",
    "brown",
];

/// Picks a pseudo-uniform random key from [`PALETTE`].
pub fn random_key() -> &'static str {
    random_key_in(&PALETTE)
}

/// Picks a pseudo-uniform random key from the given palette.
///
/// # Panics
/// Panics if `palette` is empty.
pub fn random_key_in<'a>(palette: &[&'a str]) -> &'a str {
    let index = rand::rng().random_range(0..palette.len());
    palette[index]
}

/// Advances one step through [`PALETTE`] from `current`, wrapping at the end.
pub fn next_key(current: &str) -> &'static str {
    next_key_in(&PALETTE, current)
}

/// Advances one step through the given palette from `current`.
///
/// The entry after the last wraps back to the first. If `current` is not in
/// the palette (including the empty "unassigned" key), there is no position
/// to advance from and a random key is returned instead.
///
/// # Panics
/// Panics if `palette` is empty.
pub fn next_key_in<'a>(palette: &[&'a str], current: &str) -> &'a str {
    match palette.iter().position(|key| *key == current) {
        Some(index) => palette[(index + 1) % palette.len()],
        None => random_key_in(palette),
    }
}

// =========================================================================
// Tests
// =========================================================================

//! Position authority levels.
//!
//! Positions arrive as raw identifiers from the member directory, so these
//! functions are total over `&str`: anything that is not a known position
//! has level 0 and never satisfies a minimum-level check.

use memberhub_entity::member::Position;

/// Authority level of a position identifier; unknown identifiers are 0.
pub fn level(position: &str) -> u8 {
    position
        .parse::<Position>()
        .map(|p| p.level())
        .unwrap_or(0)
}

/// `true` if `a` strictly outranks `b`.
pub fn higher(a: &str, b: &str) -> bool {
    level(a) > level(b)
}

/// `true` if `a` has at least the authority of `b`.
pub fn higher_or_equal(a: &str, b: &str) -> bool {
    level(a) >= level(b)
}

/// Data shaping for the race disparity cards.
///
/// Submodules:
/// - `groupings` — turns a state's record into ordered, rescaled group entries.
/// - `cards` — builds the per-variant card model from the shaped groups.

pub mod cards;
pub mod groupings;

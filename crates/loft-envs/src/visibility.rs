//! Compilation-unit visibility oracle.

use loft_types::UnitId;

/// The host toolkit's visibility relation between compilation units.
///
/// `referenced` is the unit whose declarations are being reached for,
/// `base` is the unit doing the reaching. The relation is pure; whether it
/// caches is the host's business.
pub trait UnitVisibility {
    /// Whether `referenced`'s declarations are visible from `base`.
    fn is_visible_from(&self, referenced: UnitId, base: UnitId) -> bool;
}

/// Plain closures work as oracles, so tests and small hosts need no newtype.
impl<F> UnitVisibility for F
where
    F: Fn(UnitId, UnitId) -> bool,
{
    fn is_visible_from(&self, referenced: UnitId, base: UnitId) -> bool {
        self(referenced, base)
    }
}

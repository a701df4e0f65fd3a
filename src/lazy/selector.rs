//! Connection-aware source selection
//!
//! On constrained connections, `*-slow` placeholder variants replace the
//! primary placeholders before observation starts. The observation engine
//! never sees network state; it just upgrades whatever placeholder values
//! it finds.

use super::profile::NetworkProfile;
use crate::dom::Document;

/// Slow-variant attribute and the primary placeholder it overrides
pub const SLOW_VARIANTS: &[(&str, &str)] = &[
    ("data-src-slow", "data-src"),
    ("data-srcset-slow", "data-srcset"),
    ("data-bg-slow", "data-bg"),
];

/// Copy slow variants into their primary placeholders when the profile is
/// slow. The `-slow` attributes are left in place, so running twice copies
/// the same values again. Returns the number of attributes written.
pub fn apply_slow_variants(document: &mut Document, profile: &NetworkProfile) -> usize {
    if !profile.is_slow {
        return 0;
    }

    let mut copied = 0;
    for (slow, primary) in SLOW_VARIANTS {
        for element in document.elements_with_attribute(slow) {
            let Some(value) = document.get_attribute(element, slow).map(str::to_string) else {
                continue;
            };
            document.set_attribute(element, primary, value);
            copied += 1;
        }
    }
    if copied > 0 {
        log::debug!("selected {} slow source variants", copied);
    }
    copied
}

/// Demographic group registry for the race disparity cards.
///
/// Defines the canonical list of reporting groups, along with their full
/// display names and bar style tags. This is the single source of truth for
/// group metadata — all other modules should look groups up here rather than
/// hardcoding names.

use crate::model::{BarStyle, DemographicGroup};

// ---------------------------------------------------------------------------
// Group metadata
// ---------------------------------------------------------------------------

/// Metadata for a single demographic group.
pub struct GroupInfo {
    pub group: DemographicGroup,
    /// Short label, e.g. "AIAN".
    pub label: &'static str,
    /// Name shown in card text and bar labels.
    pub full_name: &'static str,
    /// Display category passed through to the card.
    pub style: BarStyle,
}

/// All groups in canonical order.
pub static GROUP_REGISTRY: &[GroupInfo] = &[
    GroupInfo {
        group: DemographicGroup::Black,
        label: "Black",
        full_name: "Black/African American",
        style: BarStyle::Black,
    },
    GroupInfo {
        group: DemographicGroup::HispanicLatino,
        label: "Hispanic/Latino",
        full_name: "Hispanic/Latino",
        style: BarStyle::Latinx,
    },
    GroupInfo {
        group: DemographicGroup::Asian,
        label: "Asian",
        full_name: "Asian",
        style: BarStyle::Asian,
    },
    GroupInfo {
        group: DemographicGroup::Aian,
        label: "AIAN",
        full_name: "American Indian or Alaska Native",
        style: BarStyle::Aian,
    },
    GroupInfo {
        group: DemographicGroup::White,
        label: "White",
        full_name: "White",
        style: BarStyle::White,
    },
    GroupInfo {
        group: DemographicGroup::Nhpi,
        label: "NHPI",
        full_name: "Native Hawaiian and Pacific Islander",
        style: BarStyle::Nhpi,
    },
];

/// Label for the all-groups total; has a display name but no bars.
pub const ALL_GROUPS_LABEL: &str = "All";

/// Returns every group label in canonical order.
pub fn all_labels() -> Vec<&'static str> {
    GROUP_REGISTRY.iter().map(|g| g.label).collect()
}

/// Looks up a group by label. Returns `None` if not found.
pub fn find_group(label: &str) -> Option<&'static GroupInfo> {
    GROUP_REGISTRY.iter().find(|g| g.label == label)
}

/// Registry entry for a group.
pub fn info(group: DemographicGroup) -> &'static GroupInfo {
    // Registry is indexed in the same order as DemographicGroup::ALL.
    &GROUP_REGISTRY[group as usize]
}

/// Full display name for a label, including the "All" total.
pub fn display_name(label: &str) -> Option<&'static str> {
    if label == ALL_GROUPS_LABEL {
        return Some(ALL_GROUPS_LABEL);
    }
    find_group(label).map(|g| g.full_name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

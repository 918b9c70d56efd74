//! Where a carousel row should scroll so its selected card is visible.
//!
//! Everything here is a pure function of its inputs. Offsets are expressed
//! as the index of the first visible item.

use crate::storage::CarouselTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    pub selected_index: usize,
    /// Item count including a loading placeholder, if one is shown.
    pub total_items: usize,
    pub current_offset: usize,
    pub navigating_right: bool,
    pub tuning: CarouselTuning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRule {
    /// Selection was outside the visible window; jump without animating.
    OffScreenEmergency,
    /// Near the start of the row: stay left-anchored.
    StartPin,
    /// Near the end of the row: show the tail.
    EndPin,
    /// Keep the selection on the center slot.
    Centered,
}

impl PlacementRule {
    pub fn is_emergency(self) -> bool {
        self == PlacementRule::OffScreenEmergency
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub offset: usize,
    pub rule: PlacementRule,
}

pub fn max_offset(total_items: usize, capacity: usize) -> usize {
    total_items.saturating_sub(capacity.max(1))
}

pub fn is_visible(selected_index: usize, offset: usize, capacity: usize) -> bool {
    selected_index >= offset && selected_index < offset + capacity.max(1)
}

fn centered_offset(selected_index: usize, center_slot: usize, max: usize) -> usize {
    selected_index.saturating_sub(center_slot).min(max)
}

/// Decides the target offset. Rules are tried in order and the first match
/// wins: off-screen emergency, start pin, end pin, centering.
pub fn compute_placement(request: &PositionRequest) -> Placement {
    let capacity = request.tuning.capacity.max(1);
    let center_slot = request.tuning.center_slot.min(capacity - 1);
    let start_pin_last = request.tuning.start_pin_last_index.min(capacity - 1);
    let total = request.total_items;
    let selected = request.selected_index;
    let max = max_offset(total, capacity);

    if total == 0 {
        return Placement {
            offset: 0,
            rule: PlacementRule::StartPin,
        };
    }

    if !is_visible(selected, request.current_offset, capacity) {
        return Placement {
            offset: centered_offset(selected, center_slot, max),
            rule: PlacementRule::OffScreenEmergency,
        };
    }

    if request.current_offset == 0 && selected <= start_pin_last {
        return Placement {
            offset: 0,
            rule: PlacementRule::StartPin,
        };
    }

    if selected + request.tuning.end_pin_margin >= total {
        let offset = max;
        // A margin wider than the window would hide the selection
        if is_visible(selected, offset, capacity) {
            return Placement {
                offset,
                rule: PlacementRule::EndPin,
            };
        }
    }

    Placement {
        offset: centered_offset(selected, center_slot, max),
        rule: PlacementRule::Centered,
    }
}

//! Hover selection: at most one marker is selected and emphasised

use crate::marker::{MarkerId, MarkerSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Hovering(MarkerId),
}

impl Selection {
    pub fn marker(&self) -> Option<MarkerId> {
        match self {
            Selection::Idle => None,
            Selection::Hovering(id) => Some(*id),
        }
    }

    pub fn is_hovering(&self) -> bool {
        matches!(self, Selection::Hovering(_))
    }
}

/// Result of a selection transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Selection,
    pub current: Selection,
}

impl SelectionChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: Selection,
}

impl SelectionState {
    pub fn current(&self) -> Selection {
        self.current
    }

    /// Move to `Hovering(hit)` or `Idle`.
    ///
    /// The previous marker is always returned to rest scale before the new
    /// one (if any) is emphasised, so a marker the cursor has left is never
    /// left oversized.
    pub fn transition(&mut self, hit: Option<MarkerId>, markers: &mut MarkerSet) -> SelectionChange {
        let previous = self.current;
        if previous.is_hovering() {
            markers.emphasize(None);
        }

        self.current = match hit {
            Some(id) if markers.get(id).is_some() => {
                markers.emphasize(Some(id));
                Selection::Hovering(id)
            }
            _ => Selection::Idle,
        };

        SelectionChange {
            previous,
            current: self.current,
        }
    }
}

//! Per-pointer motion history for one touch sequence.

use anchorsheet_ui_graphics::Point;
use smallvec::SmallVec;

use super::types::PointerId;
use crate::gesture_constants::{MAX_POINTERS, POINTER_ID_LIMIT};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTrack {
    pub id: PointerId,
    pub initial: Point,
    pub last: Point,
}

/// Fixed-capacity map from pointer id to its initial and last position, plus
/// the set of pointers currently down.
#[derive(Clone, Debug, Default)]
pub struct PointerTracks {
    tracks: SmallVec<[PointerTrack; MAX_POINTERS]>,
    pointers_down: u32,
}

impl PointerTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the down position of `id`. Returns false when the id is out of
    /// range or every slot is taken by another pointer.
    pub fn save_initial(&mut self, id: PointerId, position: Point) -> bool {
        if id >= POINTER_ID_LIMIT {
            log::warn!("pointer {id} outside the tracked id range; ignoring");
            return false;
        }
        if let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) {
            track.initial = position;
            track.last = position;
        } else if self.tracks.len() < MAX_POINTERS {
            self.tracks.push(PointerTrack {
                id,
                initial: position,
                last: position,
            });
        } else {
            log::warn!("pointer {id} exceeds the {MAX_POINTERS} tracked pointers; ignoring");
            return false;
        }
        self.pointers_down |= 1 << id;
        true
    }

    /// Updates the last position of a pointer that is down; others are ignored.
    pub fn save_last(&mut self, id: PointerId, position: Point) {
        if !self.is_pointer_down(id) {
            return;
        }
        if let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) {
            track.last = position;
        }
    }

    pub fn get(&self, id: PointerId) -> Option<&PointerTrack> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn is_pointer_down(&self, id: PointerId) -> bool {
        id < POINTER_ID_LIMIT && self.pointers_down & (1 << id) != 0
    }

    pub fn clear_pointer(&mut self, id: PointerId) {
        self.tracks.retain(|track| track.id != id);
        if id < POINTER_ID_LIMIT {
            self.pointers_down &= !(1 << id);
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.pointers_down = 0;
    }

    /// Lowest pointer id still down.
    pub fn first_down(&self) -> Option<PointerId> {
        self.tracks.iter().map(|track| track.id).min()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

use scene::GroupId;

use crate::markers::{MarkerDescriptor, PopupContent};

/// Marker half of the map-rendering collaborator.
pub trait MarkerCanvas {
    /// Removes every marker and popup, then draws `markers`.
    fn replace_markers(&mut self, generation: u32, markers: &[MarkerDescriptor]);
    fn open_popup(&mut self, content: &PopupContent);
    /// No-op when that popup is already gone.
    fn close_popup(&mut self, group: GroupId);
}

use tracing::trace;

/// Who currently owns pointer events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GestureOwner {
    /// Free rotation of the globe itself.
    Globe,
    /// A carousel instance, identified by the host.
    Carousel(u32),
}

/// Exclusive pointer capture.
///
/// Only one gesture can own the pointer at a time. Engaging a new gesture
/// steals capture from whoever held it (most recent wins); the previous owner
/// is returned so the caller can cancel its drag.
#[derive(Debug, Default, Clone)]
pub struct PointerCapture {
    owner: Option<GestureOwner>,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim capture for `owner`. Returns the displaced owner, if any.
    pub fn claim(&mut self, owner: GestureOwner) -> Option<GestureOwner> {
        let previous = self.owner.replace(owner);
        match previous {
            Some(prev) if prev == owner => None,
            other => {
                trace!(?owner, displaced = ?other, "pointer captured");
                other
            }
        }
    }

    /// Release capture. Only the current owner can release; stale releases
    /// from a displaced gesture are ignored.
    pub fn release(&mut self, owner: GestureOwner) -> bool {
        if self.owner == Some(owner) {
            self.owner = None;
            true
        } else {
            false
        }
    }

    pub fn owner(&self) -> Option<GestureOwner> {
        self.owner
    }

    pub fn is_owned_by(&self, owner: GestureOwner) -> bool {
        self.owner == Some(owner)
    }
}

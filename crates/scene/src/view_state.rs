use catalog::{CatalogLocation, LocationId};
use foundation::math::GeoPoint;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Free orbit around the whole globe.
    World,
    /// Camera locked onto the selected location.
    Location,
}

/// Discrete view state.
///
/// The selection lives inside the `Location` variant, so "a location is
/// selected" and "the mode is `Location`" cannot disagree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    World,
    Location(CatalogLocation),
}

/// What a select/clear call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Entered(LocationId),
    Switched { from: LocationId, to: LocationId },
    Cleared(LocationId),
}

impl ViewState {
    pub fn mode(&self) -> ViewMode {
        match self {
            ViewState::World => ViewMode::World,
            ViewState::Location(_) => ViewMode::Location,
        }
    }

    pub fn selected(&self) -> Option<&CatalogLocation> {
        match self {
            ViewState::World => None,
            ViewState::Location(loc) => Some(loc),
        }
    }

    pub fn selected_id(&self) -> Option<&LocationId> {
        self.selected().map(|loc| &loc.location.id)
    }

    pub fn selected_geo(&self) -> Option<GeoPoint> {
        self.selected().map(|loc| loc.geo)
    }

    /// Re-selecting the current location is a no-op.
    pub fn select(&mut self, location: &CatalogLocation) -> Transition {
        let to = location.location.id.clone();
        let transition = match self.selected_id() {
            Some(current) if *current == to => return Transition::Unchanged,
            Some(current) => Transition::Switched {
                from: current.clone(),
                to,
            },
            None => Transition::Entered(to),
        };
        *self = ViewState::Location(location.clone());
        transition
    }

    pub fn clear(&mut self) -> Transition {
        match std::mem::take(self) {
            ViewState::World => Transition::Unchanged,
            ViewState::Location(loc) => Transition::Cleared(loc.location.id),
        }
    }

    /// User drag rotation and auto-rotate. Off while a location is framed,
    /// otherwise they would fight the camera controller for the pose.
    pub fn free_rotation_enabled(&self) -> bool {
        self.mode() == ViewMode::World
    }
}

#[cfg(test)]
mod tests {
    use super::{Transition, ViewMode, ViewState};
    use catalog::{LocationCatalog, LocationId};

    #[test]
    fn select_then_clear_returns_to_world() {
        let catalog = LocationCatalog::sample().unwrap();
        let iceland = catalog.get(&LocationId::new("loc-iceland")).unwrap();

        let mut state = ViewState::default();
        assert_eq!(state.mode(), ViewMode::World);

        assert_eq!(
            state.select(iceland),
            Transition::Entered(LocationId::new("loc-iceland"))
        );
        assert_eq!(state.mode(), ViewMode::Location);
        assert_eq!(state.selected_geo(), Some(iceland.geo));
        assert!(!state.free_rotation_enabled());

        assert_eq!(
            state.clear(),
            Transition::Cleared(LocationId::new("loc-iceland"))
        );
        assert_eq!(state, ViewState::World);
        assert!(state.selected().is_none());
        assert!(state.free_rotation_enabled());
    }

    #[test]
    fn reselecting_is_idempotent() {
        let catalog = LocationCatalog::sample().unwrap();
        let kyoto = catalog.get(&LocationId::new("loc-japan")).unwrap();
        let mut state = ViewState::default();
        state.select(kyoto);
        let before = state.clone();
        assert_eq!(state.select(kyoto), Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn switching_locations_reports_both_ends() {
        let catalog = LocationCatalog::sample().unwrap();
        let a = catalog.get(&LocationId::new("loc-egypt")).unwrap();
        let b = catalog.get(&LocationId::new("loc-nepal")).unwrap();
        let mut state = ViewState::default();
        state.select(a);
        assert_eq!(
            state.select(b),
            Transition::Switched {
                from: LocationId::new("loc-egypt"),
                to: LocationId::new("loc-nepal"),
            }
        );
        assert_eq!(state.selected_id(), Some(&LocationId::new("loc-nepal")));
    }

    #[test]
    fn clearing_world_is_a_no_op() {
        let mut state = ViewState::default();
        assert_eq!(state.clear(), Transition::Unchanged);
        assert_eq!(state.mode(), ViewMode::World);
    }
}

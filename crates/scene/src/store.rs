use catalog::{CatalogLocation, Location, Product};
use runtime::{Event, EventBus, Frame};
use tracing::{debug, info};

use crate::view_state::{Transition, ViewMode, ViewState};

/// Outward notifications, drained by the host after each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobeEvent {
    LocationSelected(Location),
    SelectionCleared,
    CartChanged { items: usize },
}

/// Shared application state.
///
/// Components receive a reference to the store instead of reaching for a
/// global. Reads go through accessors; writes only through the handful of
/// mutation methods below.
#[derive(Debug, Default)]
pub struct GlobeStore {
    view: ViewState,
    cart: Vec<Product>,
    events: EventBus<GlobeEvent>,
    frame_index: u64,
}

impl GlobeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with `frame`.
    pub fn begin_frame(&mut self, frame: Frame) {
        self.frame_index = frame.index;
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    pub fn selected(&self) -> Option<&CatalogLocation> {
        self.view.selected()
    }

    pub fn cart(&self) -> &[Product] {
        &self.cart
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.iter().map(|p| p.price).sum()
    }

    pub fn select_location(&mut self, location: &CatalogLocation) -> Transition {
        let transition = self.view.select(location);
        if transition != Transition::Unchanged {
            info!(id = %location.location.id, name = %location.location.name, "location selected");
            self.events.emit(
                self.frame_index,
                GlobeEvent::LocationSelected(location.location.clone()),
            );
        }
        transition
    }

    pub fn clear_selection(&mut self) -> Transition {
        let transition = self.view.clear();
        if let Transition::Cleared(id) = &transition {
            info!(%id, "selection cleared");
            self.events.emit(self.frame_index, GlobeEvent::SelectionCleared);
        }
        transition
    }

    pub fn add_to_cart(&mut self, product: Product) {
        debug!(product = %product.id, "added to cart");
        self.cart.push(product);
        self.emit_cart_changed();
    }

    /// Removes every cart entry with `product_id`. Returns how many went.
    pub fn remove_from_cart(&mut self, product_id: &str) -> usize {
        let before = self.cart.len();
        self.cart.retain(|p| p.id != product_id);
        let removed = before - self.cart.len();
        if removed > 0 {
            self.emit_cart_changed();
        }
        removed
    }

    pub fn events(&self) -> &[Event<GlobeEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<GlobeEvent>> {
        self.events.drain()
    }

    fn emit_cart_changed(&mut self) {
        self.events.emit(
            self.frame_index,
            GlobeEvent::CartChanged {
                items: self.cart.len(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeEvent, GlobeStore};
    use crate::view_state::{Transition, ViewMode};
    use catalog::{LocationCatalog, LocationId};
    use pretty_assertions::assert_eq;
    use runtime::Frame;

    #[test]
    fn selection_emits_events_once() {
        let catalog = LocationCatalog::sample().unwrap();
        let iceland = catalog.get(&LocationId::new("loc-iceland")).unwrap();
        let mut store = GlobeStore::new();

        store.begin_frame(Frame::fixed(7, 0.016));
        store.select_location(iceland);
        assert_eq!(store.select_location(iceland), Transition::Unchanged);
        store.begin_frame(Frame::fixed(8, 0.016));
        store.clear_selection();
        assert_eq!(store.clear_selection(), Transition::Unchanged);

        let events = store.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].frame_index, 7);
        assert_eq!(
            events[0].payload,
            GlobeEvent::LocationSelected(iceland.location.clone())
        );
        assert_eq!(events[1].frame_index, 8);
        assert_eq!(events[1].payload, GlobeEvent::SelectionCleared);
        assert_eq!(store.mode(), ViewMode::World);
        assert!(store.selected().is_none());
    }

    #[test]
    fn cart_add_remove_and_total() {
        let catalog = LocationCatalog::sample().unwrap();
        let gem = catalog.find_product("p1").unwrap().clone();
        let spice = catalog.find_product("p3").unwrap().clone();

        let mut store = GlobeStore::new();
        store.add_to_cart(gem.clone());
        store.add_to_cart(spice);
        store.add_to_cart(gem);
        assert_eq!(store.cart().len(), 3);
        assert_eq!(store.cart_total(), 2600.0);

        assert_eq!(store.remove_from_cart("p1"), 2);
        assert_eq!(store.remove_from_cart("p1"), 0);
        assert_eq!(store.cart_total(), 200.0);

        let last = store.drain_events().pop().unwrap();
        assert_eq!(last.payload, GlobeEvent::CartChanged { items: 1 });
    }
}

pub mod bookings;
pub mod reviews;
pub mod spots;
pub mod users;

use staybnb_kernel::ModuleRegistry;

use crate::store::Store;

/// Register all marketplace modules over a shared store
pub fn register_all(registry: &mut ModuleRegistry, store: &Store) {
    registry.register(users::create_module(store.clone()));
    registry.register(spots::create_module(store.clone()));
    registry.register(reviews::create_module(store.clone()));
    registry.register(bookings::create_module(store.clone()));
}

pub mod equipment;
pub mod home;
pub mod laboratories;
pub mod reservations;

pub use equipment::{EquipmentPage, SyncState};
pub use home::HomePage;
pub use laboratories::LaboratoryList;
pub use reservations::ReservationsPage;

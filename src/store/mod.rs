pub mod model;
pub mod record;

pub use model::{list_models, PersistedModel};
pub use record::{ModelRecord, NetworkRecord};

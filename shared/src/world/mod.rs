pub mod entity;
pub mod entity_store;
pub mod field_list;

pub use entity::Entity;
pub use entity_store::EntitySnapshotStore;
pub use field_list::{read_field_list, write_field_list};

mod store;
mod table;

pub use store::StringTableStore;
pub use table::{StringTable, StringTableEntry, StringTableFlags};

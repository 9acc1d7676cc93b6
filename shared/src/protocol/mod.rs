pub mod driver;
pub mod observer;
pub mod records;

pub use driver::{ReplayDriver, ReplayState};
pub use observer::{LoggingObserver, NullObserver, ReplayObserver};
pub use records::{
    ClassEntry, ClassInfoRecord, CreateStringTableRecord, PacketEntitiesRecord, Record,
    SendPropRecord, SendTableRecord, ServerInfoRecord, UpdateStringTableRecord,
};

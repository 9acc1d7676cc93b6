pub mod event_log;
pub mod packet_builder;
pub mod records;
pub mod string_table_builder;

pub use event_log::{Event, EventLog};
pub use packet_builder::{PacketBuilder, Patch};
pub use records::{class_info, int_prop, send_table, server_info, unit_replay, UNIT_CLASS};
pub use string_table_builder::StringTableBuilder;

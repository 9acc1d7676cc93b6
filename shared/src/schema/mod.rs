pub mod class;
pub mod compiler;
pub mod flat_schema;
pub mod send_prop;
pub mod send_table;

pub use class::ClassDescriptor;
pub use compiler::{FlatSchemas, SchemaCompiler};
pub use flat_schema::{FlatProp, FlatSchema, SchemaGroup};
pub use send_prop::{PropDescriptor, PropFlags, PropRef, PropType};
pub use send_table::{SchemaTable, SendTables};

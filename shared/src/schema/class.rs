/// A networked class as announced by the class-info record. Immutable once
/// registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub id: u32,
    /// Name of the send table describing this class's properties
    pub table_name: String,
    /// Display name, e.g. `CDOTA_Unit_Hero_Axe`
    pub name: String,
}

impl ClassDescriptor {
    pub fn new(id: u32, table_name: &str, name: &str) -> Self {
        Self {
            id,
            table_name: table_name.to_string(),
            name: name.to_string(),
        }
    }
}

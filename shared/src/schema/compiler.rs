use std::{collections::HashSet, rc::Rc};

use log::debug;

use crate::{
    constants::CHANGES_OFTEN_PRIORITY,
    error::{ReplayError, ReplayResult, Violation},
    ordered_map::OrderedMap,
    schema::{
        flat_schema::{FlatProp, FlatSchema, SchemaGroup},
        send_prop::{PropFlags, PropRef, PropType},
        send_table::{SchemaTable, SendTables},
    },
};

/// Compiled flat schemas keyed by send table name
pub type FlatSchemas = OrderedMap<String, Rc<FlatSchema>>;

// (table owning the excluded prop, prop name)
type Excludes = HashSet<(String, String)>;

struct CompileState {
    excludes: Excludes,
    props: Vec<FlatProp>,
    // tables currently being flattened, to refuse self-referencing schemas
    visiting: Vec<usize>,
}

/// Flattens nested, excluded and collapsible send tables into per-table
/// flat prop lists sorted into priority buckets.
pub struct SchemaCompiler<'t> {
    tables: &'t SendTables,
}

impl<'t> SchemaCompiler<'t> {
    pub fn new(tables: &'t SendTables) -> Self {
        Self { tables }
    }

    /// Compiles every registered table, in registration order.
    pub fn compile_all(&self) -> ReplayResult<FlatSchemas> {
        let mut schemas = FlatSchemas::new();

        for position in 0..self.tables.len() {
            let schema = self.compile(position)?;
            let name = schema.name().to_string();
            schemas
                .insert(name.clone(), Rc::new(schema))
                .map_err(|_| ReplayError::schema(Violation::DuplicateSendTable { name }))?;
        }

        debug!("compiled {} flat schemas", schemas.len());
        Ok(schemas)
    }

    /// Compiles the table registered at `position`.
    pub fn compile(&self, position: usize) -> ReplayResult<FlatSchema> {
        let table = self.table(position)?;

        let mut excludes = Excludes::new();
        let mut visiting = Vec::new();
        self.gather_excludes(position, &mut excludes, &mut visiting)?;

        let mut state = CompileState {
            excludes,
            props: Vec::new(),
            visiting: Vec::new(),
        };
        let root = self.build_group(position, &mut state)?;
        let props = self.sort_by_priority(state.props)?;

        Ok(FlatSchema::new(&table.name, props, root))
    }

    fn table(&self, position: usize) -> ReplayResult<&'t SchemaTable> {
        self.tables.table_at(position).ok_or_else(|| {
            ReplayError::schema(Violation::UnknownSendTable {
                name: format!("#{}", position),
            })
        })
    }

    fn enter(&self, position: usize, visiting: &mut Vec<usize>) -> ReplayResult<()> {
        if visiting.contains(&position) {
            let name = self.table(position)?.name.clone();
            return Err(ReplayError::schema(Violation::RecursiveSendTable { name }));
        }
        visiting.push(position);
        Ok(())
    }

    /// Collects `(table, prop)` pairs excluded anywhere below this table,
    /// descending into every nested table whether collapsible or not.
    fn gather_excludes(
        &self,
        position: usize,
        excludes: &mut Excludes,
        visiting: &mut Vec<usize>,
    ) -> ReplayResult<()> {
        self.enter(position, visiting)?;

        let table = self.table(position)?;
        for prop in table.props() {
            if prop.flags.contains(PropFlags::EXCLUDE) {
                excludes.insert((prop.table_name.clone(), prop.name.clone()));
            } else if prop.prop_type == PropType::NestedTable {
                let nested = self.tables.require(&prop.table_name)?;
                self.gather_excludes(nested, excludes, visiting)?;
            }
        }

        visiting.pop();
        Ok(())
    }

    /// Flattens one table into `state.props`. Props of non-collapsible nested
    /// tables land first, as they are met; the table's own props, with
    /// collapsible nested tables spliced in place, follow.
    fn build_group(&self, position: usize, state: &mut CompileState) -> ReplayResult<SchemaGroup> {
        self.enter(position, &mut state.visiting)?;

        let mut group = SchemaGroup {
            table: self.table(position)?.name.clone(),
            start: state.props.len(),
            count: 0,
            children: Vec::new(),
        };

        let mut direct = Vec::new();
        self.gather(position, state, &mut group, &mut direct)?;
        state.props.append(&mut direct);
        group.count = state.props.len() - group.start;

        state.visiting.pop();
        Ok(group)
    }

    fn gather(
        &self,
        position: usize,
        state: &mut CompileState,
        group: &mut SchemaGroup,
        direct: &mut Vec<FlatProp>,
    ) -> ReplayResult<()> {
        let table = self.table(position)?;

        for (index, prop) in table.props().iter().enumerate() {
            if prop.flags.intersects(PropFlags::INSIDE_ARRAY | PropFlags::EXCLUDE) {
                continue;
            }
            if state
                .excludes
                .contains(&(table.name.clone(), prop.name.clone()))
            {
                continue;
            }

            match prop.prop_type {
                PropType::NestedTable => {
                    let nested = self.tables.require(&prop.table_name)?;
                    if prop.flags.contains(PropFlags::COLLAPSIBLE) {
                        self.enter(nested, &mut state.visiting)?;
                        self.gather(nested, state, group, direct)?;
                        state.visiting.pop();
                    } else {
                        let child = self.build_group(nested, state)?;
                        group.children.push(child);
                    }
                }
                _ => {
                    if prop.prop_type == PropType::Array {
                        table.element_of(index)?;
                    }
                    direct.push(FlatProp {
                        prop: PropRef {
                            table: position,
                            index,
                        },
                        name: format!("{}.{}", table.name, prop.name),
                    });
                }
            }
        }

        Ok(())
    }

    /// Stable bucket sort: walks the distinct priorities (64 always among
    /// them) in ascending order and moves each bucket's members, in their
    /// current relative order, ahead of everything not yet placed.
    fn sort_by_priority(&self, props: Vec<FlatProp>) -> ReplayResult<Vec<FlatProp>> {
        let mut entries = Vec::with_capacity(props.len());
        for flat in props {
            let Some(prop) = self.tables.prop(flat.prop) else {
                return Err(ReplayError::schema(Violation::UnknownSendTable {
                    name: flat.name,
                }));
            };
            entries.push((prop, flat));
        }

        let mut priorities = vec![CHANGES_OFTEN_PRIORITY];
        for (prop, _) in &entries {
            if !priorities.contains(&prop.priority) {
                priorities.push(prop.priority);
            }
        }
        priorities.sort_unstable();

        let mut ordered = Vec::with_capacity(entries.len());
        let mut remaining = entries;
        for priority in priorities {
            let (bucket, rest): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|(prop, _)| prop.in_bucket(priority));
            ordered.extend(bucket.into_iter().map(|(_, flat)| flat));
            remaining = rest;
        }
        debug_assert!(remaining.is_empty());

        Ok(ordered)
    }
}

//! Property table: the id-level key/value wiring at the tail of an
//! LSG segment.
//!
//! Each node element with properties gets one sub-table mapping key
//! atom ids to value atom ids. Pair lists end with a zero key, so a
//! real key atom can never have id zero.

use crate::io::{self, ByteCursor};
use crate::util::{Error, Result};

/// Key/value atom id pairs of a single node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePropertyTable {
    pub pairs: Vec<(i32, i32)>,
}

impl NodePropertyTable {
    pub fn value_for(&self, key_id: i32) -> Option<i32> {
        self.pairs.iter().find(|(key, _)| *key == key_id).map(|(_, value)| *value)
    }

    pub fn byte_count(&self) -> usize {
        8 * self.pairs.len() + 4
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        for (key, value) in &self.pairs {
            io::put_i32(buf, *key);
            io::put_i32(buf, *value);
        }
        io::put_i32(buf, 0);
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let mut pairs = Vec::new();
        loop {
            let key = cur.read_i32()?;
            if key == 0 {
                break;
            }
            pairs.push((key, cur.read_i32()?));
        }
        Ok(Self { pairs })
    }
}

/// All node sub-tables of a segment, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTable {
    pub version: i16,
    pub tables: Vec<(i32, NodePropertyTable)>,
}

impl Default for PropertyTable {
    fn default() -> Self {
        Self { version: 1, tables: Vec::new() }
    }
}

impl PropertyTable {
    pub fn table_for(&self, node_id: i32) -> Option<&NodePropertyTable> {
        self.tables.iter().find(|(id, _)| *id == node_id).map(|(_, table)| table)
    }

    /// Adds or replaces the sub-table of a node.
    pub fn insert(&mut self, node_id: i32, table: NodePropertyTable) {
        if let Some((_, existing)) = self.tables.iter_mut().find(|(id, _)| *id == node_id) {
            *existing = table;
        } else {
            self.tables.push((node_id, table));
        }
    }

    pub fn byte_count(&self) -> usize {
        2 + 4 + self.tables.iter().map(|(_, table)| 4 + table.byte_count()).sum::<usize>()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        io::put_i16(buf, self.version);
        io::put_i32(buf, self.tables.len() as i32);
        for (node_id, table) in &self.tables {
            io::put_i32(buf, *node_id);
            table.encode(buf);
        }
    }

    pub fn decode(cur: &mut ByteCursor) -> Result<Self> {
        let version = cur.read_i16()?;
        let count = cur.read_i32()?;
        if count < 0 {
            return Err(Error::invalid(format!("property table count {} is negative", count)));
        }
        let mut tables = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let node_id = cur.read_i32()?;
            tables.push((node_id, NodePropertyTable::decode(cur)?));
        }
        Ok(Self { version, tables })
    }
}

//! Exported table identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of tables Stockpile snapshots
///
/// Each variant carries a stable lowercase prefix used in file names.
///
/// # Examples
///
/// ```
/// use stockpile::domain::ExportTable;
/// use std::str::FromStr;
///
/// let table = ExportTable::from_str("inventory_item").unwrap();
/// assert_eq!(table, ExportTable::InventoryItem);
/// assert_eq!(table.file_prefix(), "inventory_item");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTable {
    Project,
    Inventory,
    InventoryItem,
    Logistics,
    LogisticsItem,
    Item,
}

impl ExportTable {
    /// Every table, in declaration order
    pub const ALL: [ExportTable; 6] = [
        ExportTable::Project,
        ExportTable::Inventory,
        ExportTable::InventoryItem,
        ExportTable::Logistics,
        ExportTable::LogisticsItem,
        ExportTable::Item,
    ];

    /// Prefix used in `<prefix>--<date>.csv` file names
    pub const fn file_prefix(&self) -> &'static str {
        match self {
            ExportTable::Project => "project",
            ExportTable::Inventory => "inventory",
            ExportTable::InventoryItem => "inventory_item",
            ExportTable::Logistics => "logistics",
            ExportTable::LogisticsItem => "logistics_item",
            ExportTable::Item => "item",
        }
    }
}

impl fmt::Display for ExportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

impl FromStr for ExportTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ExportTable::ALL
            .into_iter()
            .find(|table| table.file_prefix() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = ExportTable::ALL.iter().map(|t| t.file_prefix()).collect();
                format!("Unknown table '{}'. Must be one of: {}", s, known.join(", "))
            })
    }
}

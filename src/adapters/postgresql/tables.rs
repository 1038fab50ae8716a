//! Source table definitions
//!
//! One [`TableQuery`] per [`ExportTable`]. Every column is cast to `text` in
//! SQL so rows map uniformly onto CSV records.

use crate::domain::ExportTable;

/// How to read one table from the source database
#[derive(Debug)]
pub struct TableQuery {
    /// Exported table
    pub table: ExportTable,

    /// Source relation name
    pub source: &'static str,

    /// Exported columns, in CSV order (after the leading `date` column)
    pub columns: &'static [&'static str],

    /// Stable ordering key
    pub order_by: &'static str,
}

impl TableQuery {
    /// `SELECT` statement producing the table rows, all columns as text
    pub fn select_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("{column}::text"))
            .collect();

        format!(
            "SELECT {} FROM {} ORDER BY {} ASC",
            columns.join(", "),
            self.source,
            self.order_by
        )
    }

    /// CSV header: `date` followed by the column names
    pub fn header(&self) -> Vec<String> {
        std::iter::once("date")
            .chain(self.columns.iter().copied())
            .map(str::to_string)
            .collect()
    }
}

pub static PROJECT: TableQuery = TableQuery {
    table: ExportTable::Project,
    source: "project",
    columns: &[
        "id",
        "code",
        "name",
        "status",
        "start_date",
        "end_date",
        "created_at",
        "updated_at",
    ],
    order_by: "id",
};

pub static INVENTORY: TableQuery = TableQuery {
    table: ExportTable::Inventory,
    source: "inventory",
    columns: &[
        "id",
        "project_id",
        "name",
        "location",
        "status",
        "created_at",
        "updated_at",
    ],
    order_by: "id",
};

pub static INVENTORY_ITEM: TableQuery = TableQuery {
    table: ExportTable::InventoryItem,
    source: "inventory_item",
    columns: &[
        "id",
        "inventory_id",
        "item_id",
        "quantity",
        "unit",
        "updated_at",
    ],
    order_by: "id",
};

pub static LOGISTICS: TableQuery = TableQuery {
    table: ExportTable::Logistics,
    source: "logistics",
    columns: &[
        "id",
        "project_id",
        "carrier",
        "tracking_number",
        "status",
        "shipped_at",
        "delivered_at",
        "updated_at",
    ],
    order_by: "id",
};

pub static LOGISTICS_ITEM: TableQuery = TableQuery {
    table: ExportTable::LogisticsItem,
    source: "logistics_item",
    columns: &["id", "logistics_id", "item_id", "quantity", "updated_at"],
    order_by: "id",
};

pub static ITEM: TableQuery = TableQuery {
    table: ExportTable::Item,
    source: "item",
    columns: &[
        "id",
        "sku",
        "name",
        "category",
        "unit_price",
        "created_at",
        "updated_at",
    ],
    order_by: "id",
};

/// Query definition for `table`
pub fn table_query(table: ExportTable) -> &'static TableQuery {
    match table {
        ExportTable::Project => &PROJECT,
        ExportTable::Inventory => &INVENTORY,
        ExportTable::InventoryItem => &INVENTORY_ITEM,
        ExportTable::Logistics => &LOGISTICS,
        ExportTable::LogisticsItem => &LOGISTICS_ITEM,
        ExportTable::Item => &ITEM,
    }
}

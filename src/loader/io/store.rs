use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::loader::error::Result;
use crate::loader::model::{NewShipment, Product, ShipmentLine, ShipmentRecord};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS product (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS shipment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER REFERENCES product(id),
    quantity INTEGER,
    origin TEXT,
    destination TEXT
);
"#;

/// Persistence backend the load stages write through. Every write is
/// committed on its own before the call returns.
pub trait ShipmentStore {
    /// Deletes every shipment record and every product.
    fn clear(&mut self) -> Result<()>;

    /// Adds `name` to the product catalog unless it is already present.
    /// Returns `true` when a new product row was created.
    fn insert_product(&mut self, name: &str) -> Result<bool>;

    /// Resolves a product name to its catalog identifier by exact match.
    fn product_id(&self, name: &str) -> Result<Option<i64>>;

    /// Writes one shipment record and returns its identifier.
    fn insert_shipment(&mut self, shipment: &NewShipment<'_>) -> Result<i64>;
}

/// SQLite-backed [`ShipmentStore`]. The connection runs in autocommit mode so
/// each statement is durable once it returns.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(database = %path.display(), "opening shipment database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// All catalog entries ordered by name.
    pub fn products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM product ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Product {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All shipment records in insertion order.
    pub fn shipments(&self) -> Result<Vec<ShipmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, product_id, quantity, origin, destination FROM shipment ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShipmentRecord {
                id: row.get(0)?,
                product_id: row.get(1)?,
                quantity: row.get(2)?,
                origin: row.get(3)?,
                destination: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Shipment records joined with their product names, sorted so that two
    /// loads of the same inputs compare equal regardless of surrogate ids.
    pub fn shipment_lines(&self) -> Result<Vec<ShipmentLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, s.quantity, s.origin, s.destination
             FROM shipment s JOIN product p ON p.id = s.product_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShipmentLine {
                product_name: row.get(0)?,
                quantity: row.get(1)?,
                origin: row.get(2)?,
                destination: row.get(3)?,
            })
        })?;
        let mut lines = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        lines.sort();
        Ok(lines)
    }

    /// Closes the connection, reporting any error SQLite raises on shutdown.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

impl ShipmentStore for SqliteStore {
    fn clear(&mut self) -> Result<()> {
        // Shipments reference products, so they go first.
        self.conn.execute("DELETE FROM shipment", [])?;
        self.conn.execute("DELETE FROM product", [])?;
        Ok(())
    }

    fn insert_product(&mut self, name: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO product (name) VALUES (?1)",
            params![name],
        )?;
        Ok(inserted > 0)
    }

    fn product_id(&self, name: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM product WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn insert_shipment(&mut self, shipment: &NewShipment<'_>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO shipment (product_id, quantity, origin, destination)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                shipment.product_id,
                shipment.quantity,
                shipment.origin,
                shipment.destination
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

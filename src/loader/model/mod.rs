use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the stage number in input file templates.
pub const STAGE_PLACEHOLDER: &str = "{stage}";

/// Identifier shared by both input files to tie product rows to a shipment.
pub type ShipmentId = String;

/// In-memory multi-map from shipment identifier to the product names seen for
/// it in the product file. Duplicates are kept; they become quantities later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentIndex {
    entries: HashMap<ShipmentId, Vec<String>>,
}

impl ShipmentIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a product name to the sequence recorded for `shipment_id`.
    pub fn record(&mut self, shipment_id: &str, product_name: &str) {
        self.entries
            .entry(shipment_id.to_string())
            .or_default()
            .push(product_name.to_string());
    }

    /// Returns the product names recorded for a shipment, or an empty slice
    /// when the shipment was never seen.
    pub fn products(&self, shipment_id: &str) -> &[String] {
        self.entries
            .get(shipment_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Collapses the recorded names of a shipment into per-product counts.
    pub fn quantities(&self, shipment_id: &str) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for name in self.products(shipment_id) {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct shipments in the index.
    pub fn shipment_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A row of the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Surrogate key assigned by the store.
    pub id: i64,
    /// Unique product name.
    pub name: String,
}

/// A persisted aggregated shipment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub id: i64,
    /// Foreign key into the product catalog.
    pub product_id: i64,
    pub quantity: i64,
    pub origin: String,
    pub destination: String,
}

/// Values for a shipment record that has not been written yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewShipment<'a> {
    pub product_id: i64,
    pub quantity: i64,
    pub origin: &'a str,
    pub destination: &'a str,
}

/// A shipment record joined with its product name, as read back for
/// inspection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub product_name: String,
    pub quantity: i64,
    pub origin: String,
    pub destination: String,
}

/// The two load stages. Each stage reads its own input file and feeds every
/// row to a fixed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Stage 1: register products and build the shipment index.
    Products,
    /// Stage 2: aggregate indexed products into shipment records.
    Shipments,
}

impl Stage {
    /// Stages in the order a run executes them.
    pub const ALL: [Stage; 2] = [Stage::Products, Stage::Shipments];

    /// Numeric selector embedded in the input file name.
    pub fn number(self) -> u8 {
        match self {
            Stage::Products => 1,
            Stage::Shipments => 2,
        }
    }

    /// Name of the row handler the stage dispatches to.
    pub fn handler_name(self) -> &'static str {
        match self {
            Stage::Products => "register",
            Stage::Shipments => "aggregate",
        }
    }

    /// Expands a file name template for this stage.
    pub fn file_name(self, template: &str) -> String {
        template.replace(STAGE_PLACEHOLDER, &self.number().to_string())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Stage::Products => "products",
            Stage::Shipments => "shipments",
        })
    }
}

use tracing::{trace, warn};

use crate::loader::io::store::ShipmentStore;
use crate::loader::model::ShipmentIndex;

/// Outcome of registering one product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The product was new and is now in the catalog.
    Added,
    /// The catalog already held a product with this name.
    AlreadyKnown,
    /// The catalog insert failed; the shipment index still records the name.
    CatalogFailed,
}

/// Stage 1 handler. Records which products belong to which shipment and makes
/// sure every product name exists in the catalog.
pub struct ProductRegistrar<'s, S: ShipmentStore> {
    store: &'s mut S,
    index: ShipmentIndex,
}

impl<'s, S: ShipmentStore> ProductRegistrar<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            index: ShipmentIndex::new(),
        }
    }

    /// Associates `product_name` with `shipment_id` and registers the product.
    /// Catalog failures are logged, never returned.
    pub fn register(&mut self, shipment_id: &str, product_name: &str) -> Registration {
        self.index.record(shipment_id, product_name);

        match self.store.insert_product(product_name) {
            Ok(true) => {
                trace!(shipment_id, product = product_name, "product added to catalog");
                Registration::Added
            }
            Ok(false) => Registration::AlreadyKnown,
            Err(err) => {
                warn!(
                    shipment_id,
                    product = product_name,
                    error = %err,
                    "failed to register product"
                );
                Registration::CatalogFailed
            }
        }
    }

    pub fn index(&self) -> &ShipmentIndex {
        &self.index
    }

    /// Releases the store and hands over the index built so far.
    pub fn into_index(self) -> ShipmentIndex {
        self.index
    }
}

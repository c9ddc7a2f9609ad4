use tracing::{debug, warn};

use crate::loader::error::Result;
use crate::loader::io::store::ShipmentStore;
use crate::loader::model::{NewShipment, ShipmentIndex};

/// Counts produced by aggregating one shipment row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Shipment records written.
    pub written: usize,
    /// Distinct products skipped because the catalog had no entry for them.
    pub unresolved: usize,
    /// Distinct products whose record insert failed.
    pub failed: usize,
}

/// Stage 2 handler. Turns the product names indexed for a shipment into one
/// quantity record per distinct product.
pub struct ShipmentAggregator<'s, S: ShipmentStore> {
    store: &'s mut S,
    index: ShipmentIndex,
}

impl<'s, S: ShipmentStore> ShipmentAggregator<'s, S> {
    /// Takes ownership of the index produced by the product stage.
    pub fn new(store: &'s mut S, index: ShipmentIndex) -> Self {
        Self { store, index }
    }

    /// Writes the aggregated records for one shipment row.
    ///
    /// A shipment that was never indexed produces nothing. Names missing from
    /// the catalog and failed inserts are logged and skipped; records already
    /// written for the row stay in place. Only a failed catalog lookup is
    /// returned as an error.
    pub fn aggregate(
        &mut self,
        shipment_id: &str,
        origin: &str,
        destination: &str,
    ) -> Result<Aggregation> {
        let mut outcome = Aggregation::default();

        for (product_name, count) in self.index.quantities(shipment_id) {
            let Some(product_id) = self.store.product_id(product_name)? else {
                warn!(
                    shipment_id,
                    product = product_name,
                    "product not found in catalog"
                );
                outcome.unresolved += 1;
                continue;
            };

            let shipment = NewShipment {
                product_id,
                quantity: count as i64,
                origin,
                destination,
            };
            match self.store.insert_shipment(&shipment) {
                Ok(id) => {
                    debug!(
                        id,
                        shipment_id,
                        product = product_name,
                        quantity = count,
                        "shipment record written"
                    );
                    outcome.written += 1;
                }
                Err(err) => {
                    warn!(
                        shipment_id,
                        product = product_name,
                        error = %err,
                        "failed to write shipment record"
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}

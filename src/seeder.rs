//! Startup inventory seeding.
//!
//! Runs once before the listener accepts connections. An inventory that
//! already holds any document is left untouched. Otherwise each catalog
//! item is written with an insert-if-absent keyed by its name, so two
//! processes seeding at the same time never duplicate or overwrite.

use crate::db::{Collection, DatabaseError, DocumentStore};
use crate::models::InventoryItem;

/// Initial stock, by item name.
pub const INVENTORY_CATALOG: &[(&str, i64)] = &[
    ("Paracetamol", 500),
    ("Insulin", 45),
    ("Amoxicillin", 120),
    ("Oxygen Cylinder", 15),
    ("IV Fluids", 200),
    ("Ventilators", 8),
    ("Syringes", 1000),
    ("Gloves", 1500),
    ("Masks", 2000),
    ("Bandages", 300),
    ("BP Monitors", 20),
    ("Thermometers", 50),
    ("Defibrillators", 5),
    ("Wheelchairs", 15),
    ("Stethoscopes", 40),
    ("X-ray Films", 100),
    ("Saline Bags", 250),
    ("Surgical Gowns", 100),
    ("Hand Sanitizer", 80),
    ("Adhesive Tape", 60),
    ("Catheters", 40),
    ("Nebulizers", 12),
    ("Dialysis Kits", 5),
    ("Pulse Oximeters", 30),
    ("ECG Paper", 50),
    ("Disinfectant", 40),
    ("Cotton Rolls", 100),
    ("Antibiotics", 200),
    ("Aspirin", 400),
    ("Vitamins", 300),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Inventory already had documents; nothing written.
    AlreadyStocked,
    /// Catalog written; `inserted` items were new.
    Seeded { inserted: usize },
}

/// Ensure the inventory collection is non-empty.
pub async fn seed_inventory(store: &dyn DocumentStore) -> Result<SeedOutcome, DatabaseError> {
    if !store.is_empty(Collection::Inventory).await? {
        tracing::debug!("Inventory already stocked, skipping seed");
        return Ok(SeedOutcome::AlreadyStocked);
    }

    let mut inserted = 0;
    for &(name, quantity) in INVENTORY_CATALOG {
        let item = InventoryItem::new(name, quantity);
        if store
            .insert_if_absent(Collection::Inventory, &item.name, item.to_fields())
            .await?
        {
            inserted += 1;
        }
    }

    tracing::info!(inserted, catalog = INVENTORY_CATALOG.len(), "Inventory seeded");
    Ok(SeedOutcome::Seeded { inserted })
}

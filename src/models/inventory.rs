use serde::{Deserialize, Serialize};

use super::coerce;
use crate::db::{DatabaseError, Document, Fields};

/// Stock item. The document id is the item name; the body holds only
/// the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub quantity: i64,
}

#[derive(Deserialize)]
struct StoredQuantity {
    #[serde(default, deserialize_with = "coerce::i64_or_zero")]
    quantity: i64,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self, DatabaseError> {
        let stored: StoredQuantity = super::decode_document(doc)?;
        Ok(Self::new(doc.id.clone(), stored.quantity))
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("quantity".into(), self.quantity.into());
        fields
    }
}

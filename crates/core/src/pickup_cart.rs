use serde::{Deserialize, Serialize};

/// One line of a pickup cart, joined with the stock details it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupCartRow {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub ctn: i64,
    #[serde(default)]
    pub sku: String,
    pub product_stock_id: u64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub grade_no: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub product_size: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub godown_name: Option<String>,
    #[serde(default)]
    pub total_qty: Option<i64>,
    #[serde(default)]
    pub cart_no: Option<String>,
    #[serde(default)]
    pub rack_no: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of the "add to pickup cart" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupCartInput {
    pub product_stock_id: u64,
    pub sku: String,
    pub quantity: i64,
}

impl PickupCartInput {
    /// # Errors
    /// Returns an error if `quantity` is not positive.
    pub fn validate(&self) -> crate::Result<()> {
        if self.quantity <= 0 {
            return Err(crate::CoreError::InvalidInput(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

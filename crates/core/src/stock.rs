//! Product stock rows and the filters of the stock listing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One product stock row as listed by the stock endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub id: u64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub grade_no: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub product_size: String,
    #[serde(default)]
    pub product_brand: Option<u64>,
    #[serde(default)]
    pub finish_type: String,
    #[serde(default)]
    pub specifications: String,
    #[serde(default)]
    pub godown_id: Option<u64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub ctn: i64,
    #[serde(default)]
    pub sent: i64,
    #[serde(default)]
    pub batch_no: String,
    #[serde(default)]
    pub rack_no: String,
    #[serde(default)]
    pub invoice_no: String,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub tc_no: String,
    #[serde(default)]
    pub tc_date: Option<String>,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl StockRow {
    /// Units still available for pickup.
    #[must_use]
    pub const fn available(&self) -> i64 {
        self.quantity.saturating_sub(self.sent)
    }
}

/// Filters of the stock listing. Empty strings mean "no filter"; dates are
/// omitted from the request when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    pub godown: String,
    pub grade: String,
    pub brand: String,
    pub specification: String,
    pub item: String,
    pub size: String,
    pub finish: String,
}

/// Fields sent when creating or updating a stock row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockInput {
    pub sku: String,
    pub item_name: String,
    pub grade_no: String,
    pub product_size: String,
    pub brand: String,
    pub godown: String,
    pub finish_type: String,
    pub specifications: String,
    pub quantity: i64,
    pub ctn: i64,
    pub batch_no: String,
    pub rack_no: String,
    pub invoice_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    pub tc_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tc_date: Option<NaiveDate>,
    pub remarks: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RetrievalPayload;
    use serde_json::json;

    #[test]
    fn test_filters_omit_unset_dates() {
        let filters = StockFilters { grade: "304".to_owned(), ..StockFilters::default() };
        let payload = RetrievalPayload::new(5, 0).with_filters(&filters).unwrap();
        assert!(!payload.filters.contains_key("date_from"));
        assert_eq!(payload.filters.get("grade"), Some(&json!("304")));
        assert_eq!(payload.filters.get("godown"), Some(&json!("")));
    }

    #[test]
    fn test_filters_format_dates_as_iso() {
        let filters = StockFilters {
            date_from: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..StockFilters::default()
        };
        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(value["date_from"], json!("2026-01-31"));
    }

    #[test]
    fn test_stock_row_tolerates_sparse_rows() {
        let row: StockRow =
            serde_json::from_value(json!({"id": 3, "quantity": 10, "sent": 4, "tc_date": null}))
                .unwrap();
        assert_eq!(row.available(), 6);
        assert!(row.tc_date.is_none());
    }
}

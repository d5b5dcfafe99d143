//! Shipment header metadata (`infoBL`).

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::DEFAULT_SUPPLIER;

/// Delivery metadata, supplied once per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentHeader {
    #[serde(rename = "refCommande")]
    pub order_reference: String,
    #[serde(rename = "dateLivraison", deserialize_with = "deserialize_delivery_date")]
    pub delivery_date: NaiveDate,
    #[serde(rename = "fournisseur", default = "default_supplier")]
    pub supplier: String,
    #[serde(rename = "transporteur", default)]
    pub carrier: String,
    #[serde(rename = "nbColis", default)]
    pub package_count: u32,
    #[serde(rename = "poidsTotal", default)]
    pub total_weight_kg: f64,
}

impl ShipmentHeader {
    /// Free-text comment of the Reception header row.
    pub fn reception_comment(&self) -> String {
        format!(
            "BL {} - {} colis - {}kg",
            self.order_reference, self.package_count, self.total_weight_kg
        )
    }
}

fn default_supplier() -> String {
    DEFAULT_SUPPLIER.to_string()
}

/// Parse a delivery date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub(crate) fn parse_delivery_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn deserialize_delivery_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_delivery_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid delivery date '{}'", raw)))
}

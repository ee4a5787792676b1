use serde::{Deserialize, Serialize};

use super::fields;
use crate::api::RawRecord;

pub const SHOP_ORDERS_TABLE: &str = "shop_orders";

/// Dollar cost used when neither the order nor the catalog carries one.
pub const DEFAULT_DOLLAR_COST: f64 = 0.5;

/// Entry of the shop catalog used to dress up orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ShopItem {
    pub record_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fair_market_value: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A purchased shop item as shown to its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Order {
    pub id: String,
    pub name: String,
    pub doubloons_paid: f64,
    pub dollar_cost: f64,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub created_time: Option<String>,
}

impl Order {
    /// Map a raw order, filling gaps from the catalog entry it links to.
    pub fn from_record(record: &RawRecord, catalog: &[ShopItem]) -> Self {
        let f = &record.fields;
        let item = fields::first_link(f, "shop_item")
            .and_then(|item_id| catalog.iter().find(|i| i.record_id == item_id));

        let name = fields::string(f, "shop_item:name")
            .or_else(|| item.and_then(|i| i.name.clone()))
            .unwrap_or_else(|| "Unknown item".to_string());
        let image_url = fields::string(f, "shop_item:image_url")
            .or_else(|| item.and_then(|i| i.image_url.clone()));
        let dollar_cost = fields::number(f, "dollar_cost")
            .or_else(|| item.and_then(|i| i.fair_market_value))
            .unwrap_or(DEFAULT_DOLLAR_COST);

        Order {
            id: record.id.clone(),
            name,
            doubloons_paid: fields::number(f, "tickets_paid").unwrap_or(0.0),
            dollar_cost,
            image_url,
            status: fields::string(f, "status"),
            created_time: record.created_time.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<ShopItem> {
        vec![ShopItem {
            record_id: "recItemSticker".into(),
            name: Some("Sticker pack".into()),
            fair_market_value: Some(3.25),
            image_url: Some("https://cdn.example/sticker.png".into()),
        }]
    }

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).expect("record parses")
    }

    #[test]
    fn test_order_uses_explicit_cost() {
        let order = Order::from_record(
            &record(json!({
                "id": "recOrder1",
                "fields": {
                    "shop_item": ["recItemSticker"],
                    "shop_item:name": ["Stickers!"],
                    "tickets_paid": 12,
                    "dollar_cost": 9.0,
                    "status": "fulfilled"
                }
            })),
            &catalog(),
        );
        assert_eq!(order.name, "Stickers!");
        assert_eq!(order.dollar_cost, 9.0);
        assert_eq!(order.doubloons_paid, 12.0);
        assert_eq!(order.image_url.as_deref(), Some("https://cdn.example/sticker.png"));
    }

    #[test]
    fn test_order_falls_back_to_catalog_value() {
        let order = Order::from_record(
            &record(json!({ "id": "recOrder2", "fields": { "shop_item": ["recItemSticker"] } })),
            &catalog(),
        );
        assert_eq!(order.name, "Sticker pack");
        assert_eq!(order.dollar_cost, 3.25);
    }

    #[test]
    fn test_order_without_catalog_match_uses_default_cost() {
        let order = Order::from_record(
            &record(json!({ "id": "recOrder3", "fields": { "shop_item": ["recGone"] } })),
            &catalog(),
        );
        assert_eq!(order.name, "Unknown item");
        assert_eq!(order.dollar_cost, DEFAULT_DOLLAR_COST);
        assert_eq!(order.image_url, None);
    }
}

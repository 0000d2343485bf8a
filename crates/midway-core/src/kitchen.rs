//! # Kitchen Tickets
//!
//! Flattens final line items into the station-routed list the kitchen
//! display consumes.
//!
//! ```text
//! Burger ×2 (grill)                        ┌─ Burger ×2 @ grill
//!   ├─ "No Onion"  kitchen, not fulfillable│     special: "No Onion, Well Done"
//!   ├─ "Well Done" kitchen, not fulfillable├─ Milkshake ×2 @ bar
//!   ├─ "Milkshake" kitchen, fulfillable ───┘
//!   └─ "$1.00 Off Each"  (not kitchen)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::PricingConfig;
use crate::line_item::LineItem;

/// One entry on a kitchen display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenTicketItem {
    pub item_name: String,
    pub quantity: i64,
    pub station: String,
    pub prepared_quantity: i64,
    pub fulfilled_quantity: i64,
    pub special_instructions: Option<String>,
}

/// Derives kitchen tickets from final line items.
///
/// Lines with routing disabled or a non-positive quantity produce nothing.
pub fn derive_tickets(items: &[LineItem], config: &PricingConfig) -> Vec<KitchenTicketItem> {
    let mut tickets = Vec::new();

    for item in items.iter().filter(|i| i.kitchen.enabled && i.quantity > 0) {
        let ready = |category: Option<&str>| {
            if config.is_auto_fulfilled(category) {
                item.quantity
            } else {
                0
            }
        };

        let instructions = item
            .properties
            .iter()
            .filter(|p| p.kitchen.enabled && !p.kitchen.fulfillable)
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let prepared = ready(item.category.as_deref());
        tickets.push(KitchenTicketItem {
            item_name: item.title.clone(),
            quantity: item.quantity,
            station: config
                .station_or_default(item.kitchen.station.as_deref())
                .to_string(),
            prepared_quantity: prepared,
            fulfilled_quantity: prepared,
            special_instructions: (!instructions.is_empty()).then_some(instructions),
        });

        for prop in item
            .properties
            .iter()
            .filter(|p| p.kitchen.enabled && p.kitchen.fulfillable)
        {
            let prepared = ready(prop.category.as_deref());
            tickets.push(KitchenTicketItem {
                item_name: prop.value.clone(),
                quantity: item.quantity,
                station: config
                    .station_or_default(prop.kitchen.station.as_deref())
                    .to_string(),
                prepared_quantity: prepared,
                fulfilled_quantity: prepared,
                special_instructions: None,
            });
        }
    }

    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{LineItemProperty, PropertyKind};
    use crate::money::Money;
    use crate::types::KitchenRouting;

    fn prop(value: &str, kitchen: KitchenRouting) -> LineItemProperty {
        LineItemProperty {
            kitchen,
            ..LineItemProperty::new(PropertyKind::Mod, value, Money::zero())
        }
    }

    fn burger() -> LineItem {
        let mut item = LineItem::new("FOOD-BURGER", "Burger", Money::from_cents(800));
        item.quantity = 2;
        item.category = Some("food".to_string());
        item.kitchen = KitchenRouting::station("grill");
        item
    }

    #[test]
    fn test_instructions_and_fulfillable_split() {
        let mut item = burger();
        item.properties.push(prop("No Onion", KitchenRouting::station("grill")));
        item.properties.push(prop("Well Done", KitchenRouting::station("grill")));
        let mut shake = prop(
            "Milkshake",
            KitchenRouting {
                enabled: true,
                station: Some("bar".to_string()),
                fulfillable: true,
            },
        );
        shake.category = Some("drinks".to_string());
        item.properties.push(shake);
        item.properties.push(prop("$1.00 Off Each", KitchenRouting::disabled()));

        let tickets = derive_tickets(&[item], &PricingConfig::default());
        assert_eq!(tickets.len(), 2);

        assert_eq!(tickets[0].item_name, "Burger");
        assert_eq!(tickets[0].station, "grill");
        assert_eq!(tickets[0].prepared_quantity, 0);
        assert_eq!(tickets[0].special_instructions.as_deref(), Some("No Onion, Well Done"));

        assert_eq!(tickets[1].item_name, "Milkshake");
        assert_eq!(tickets[1].station, "bar");
        assert_eq!(tickets[1].quantity, 2);
        assert_eq!(tickets[1].prepared_quantity, 2);
        assert_eq!(tickets[1].fulfilled_quantity, 2);
    }

    #[test]
    fn test_default_station_and_auto_fulfilled() {
        let mut soda = LineItem::new("DRINK-SODA", "Soda", Money::from_cents(300));
        soda.category = Some("drinks".to_string());
        soda.kitchen = KitchenRouting {
            enabled: true,
            station: None,
            fulfillable: false,
        };

        let tickets = derive_tickets(&[soda], &PricingConfig::default());
        assert_eq!(tickets[0].station, "pickup");
        assert_eq!(tickets[0].prepared_quantity, 1);
        assert!(tickets[0].special_instructions.is_none());
    }

    #[test]
    fn test_skips_disabled_and_returns() {
        let mut returned = burger();
        returned.quantity = -1;
        let mut plain = burger();
        plain.kitchen = KitchenRouting::disabled();

        assert!(derive_tickets(&[returned, plain], &PricingConfig::default()).is_empty());
    }
}

use serde::{Deserialize, Serialize};

use stockroom_core::ProductId;

/// A catalog item and its currently available quantity.
///
/// Field names on the wire follow the vendor catalog schema (`*__c`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "id__c")]
    pub id: ProductId,
    #[serde(rename = "manufacturer__c")]
    pub manufacturer: String,
    #[serde(rename = "model_number__c")]
    pub model_number: String,
    #[serde(rename = "description__c")]
    pub description: String,
    #[serde(rename = "qty_available__c")]
    pub quantity: i32,
    /// Opaque display text, e.g. "2-3 weeks".
    #[serde(rename = "leadtime__c")]
    pub lead_time: String,
}

impl Product {
    /// Stock left after taking `qty` units, or `None` if that would go negative.
    pub fn remaining_after(&self, qty: i32) -> Option<i32> {
        self.quantity
            .checked_sub(qty)
            .filter(|remaining| *remaining >= 0)
    }
}

/// Product fields before the store assigns an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub manufacturer: String,
    pub model_number: String,
    pub description: String,
    pub quantity: i32,
    pub lead_time: String,
}

impl NewProduct {
    pub fn new(
        manufacturer: impl Into<String>,
        model_number: impl Into<String>,
        description: impl Into<String>,
        quantity: i32,
        lead_time: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model_number: model_number.into(),
            description: description.into(),
            quantity,
            lead_time: lead_time.into(),
        }
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            manufacturer: self.manufacturer,
            model_number: self.model_number,
            description: self.description,
            quantity: self.quantity,
            lead_time: self.lead_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: i32) -> Product {
        NewProduct::new("Acme", "W-100", "Widget", quantity, "2 weeks")
            .into_product(ProductId::new(1))
    }

    #[test]
    fn serializes_with_catalog_field_names() {
        let json = serde_json::to_value(widget(5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id__c": 1,
                "manufacturer__c": "Acme",
                "model_number__c": "W-100",
                "description__c": "Widget",
                "qty_available__c": 5,
                "leadtime__c": "2 weeks",
            })
        );
    }

    #[test]
    fn remaining_after_never_goes_negative() {
        let p = widget(5);
        assert_eq!(p.remaining_after(3), Some(2));
        assert_eq!(p.remaining_after(5), Some(0));
        assert_eq!(p.remaining_after(6), None);
        assert_eq!(widget(i32::MIN + 1).remaining_after(i32::MAX), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: stock can be taken exactly when it covers the request.
            #[test]
            fn remaining_matches_availability(stock in 0i32..10_000, qty in 0i32..20_000) {
                let p = widget(stock);
                match p.remaining_after(qty) {
                    Some(rest) => {
                        prop_assert!(qty <= stock);
                        prop_assert_eq!(rest, stock - qty);
                    }
                    None => prop_assert!(qty > stock),
                }
            }
        }
    }
}

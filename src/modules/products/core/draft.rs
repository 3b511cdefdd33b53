use crate::modules::products::core::product::{Product, ProductStatus};
use crate::modules::sync::core::draft::{
    DraftForm, ValidationErrors, non_negative_integer, non_negative_number, optional_text,
    required,
};
use crate::shared::core::row::{Row, into_row};
use serde::Deserialize;
use serde_json::json;

/// Raw dialog input: numbers stay text until validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: String,
    pub inventory_count: String,
    pub status: ProductStatus,
}

impl DraftForm for ProductDraft {
    type Entity = Product;

    fn empty() -> Self {
        Self {
            price: "0".into(),
            inventory_count: "0".into(),
            ..Self::default()
        }
    }

    fn from_entity(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            sku: product.sku.clone().unwrap_or_default(),
            price: product.price.to_string(),
            inventory_count: product.inventory_count.to_string(),
            status: product.status,
        }
    }

    fn to_fields(&self) -> Result<Row, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(required("name", &self.name));
        let price = errors.check(non_negative_number("price", &self.price));
        let inventory_count =
            errors.check(non_negative_integer("inventory_count", &self.inventory_count));
        errors.into_result()?;

        Ok(into_row(json!({
            "name": name,
            "description": optional_text(&self.description),
            "sku": optional_text(&self.sku),
            "price": price,
            "inventory_count": inventory_count,
            "status": self.status,
        })))
    }
}

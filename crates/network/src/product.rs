//! Product catalog entries shared by network nodes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tradenet_core::{Entity, FieldErrors, ProductId};

use crate::contact::check_text;

pub const NAME_MAX_LEN: usize = 200;
pub const MODEL_MAX_LEN: usize = 100;

/// Stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
}

/// Product as written by clients.
///
/// Nested product lists are resolved get-or-create style: a spec that matches
/// a stored product on all three fields reuses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
}

impl ProductSpec {
    pub fn new(name: impl Into<String>, model: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            release_date,
        }
    }

    /// Products on sale must already be released.
    pub fn validate(&self, today: NaiveDate, prefix: &str, errors: &mut FieldErrors) {
        check_text(&self.name, NAME_MAX_LEN, &format!("{prefix}.name"), errors);
        check_text(&self.model, MODEL_MAX_LEN, &format!("{prefix}.model"), errors);
        if self.release_date > today {
            errors.add(
                format!("{prefix}.release_date"),
                "products on sale must already be released",
            );
        }
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            model: self.model.trim().to_string(),
            release_date: self.release_date,
        }
    }
}

impl Product {
    pub fn matches(&self, spec: &ProductSpec) -> bool {
        self.name == spec.name.trim()
            && self.model == spec.model.trim()
            && self.release_date == spec.release_date
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {} ({})", self.name, self.model, self.release_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn validate(spec: &ProductSpec) -> FieldErrors {
        let mut errors = FieldErrors::new();
        spec.validate(today(), "products[0]", &mut errors);
        errors
    }

    #[test]
    fn past_and_today_release_dates_are_accepted() {
        let yesterday = today().pred_opt().unwrap();
        assert!(validate(&ProductSpec::new("Smartphone", "Samsung", yesterday)).is_empty());
        assert!(validate(&ProductSpec::new("Smartphone", "Samsung", today())).is_empty());
    }

    #[test]
    fn future_release_date_is_rejected() {
        let tomorrow = today().succ_opt().unwrap();
        let errors = validate(&ProductSpec::new("Smartphone", "Samsung", tomorrow));
        assert_eq!(
            errors.get("products[0].release_date").unwrap(),
            ["products on sale must already be released"]
        );
    }

    #[test]
    fn blank_name_and_long_model_are_rejected() {
        let errors = validate(&ProductSpec::new(" ", "m".repeat(MODEL_MAX_LEN + 1), today()));
        assert!(errors.contains("products[0].name"));
        assert!(errors.contains("products[0].model"));
    }

    #[test]
    fn display_includes_release_date() {
        let product = ProductSpec::new("Laptop", "X1", today()).into_product(ProductId::new());
        assert_eq!(product.to_string(), "Laptop - X1 (2026-01-15)");
    }

    #[test]
    fn matching_uses_all_three_fields() {
        let product = ProductSpec::new("Laptop", "X1", today()).into_product(ProductId::new());
        assert!(product.matches(&ProductSpec::new("Laptop", "X1", today())));
        assert!(product.matches(&ProductSpec::new(" Laptop ", "X1", today())));
        assert!(!product.matches(&ProductSpec::new("Laptop", "X2", today())));
        assert!(!product.matches(&ProductSpec::new("Laptop", "X1", today().pred_opt().unwrap())));
    }
}

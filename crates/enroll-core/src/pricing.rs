//! # Pricing
//!
//! Course modules and the price table that maps each module to its price.
//! The table is loaded once at startup (built-in defaults or
//! `config/prices.toml`) and is never mutated afterwards.

use crate::error::{EnrollError, EnrollResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Pricing tier a registrant selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CourseModule {
    #[serde(rename = "Básico")]
    Basic,
    #[serde(rename = "Intermediário")]
    Intermediate,
    #[serde(rename = "Avançado")]
    Advanced,
    #[serde(rename = "Pacote Completo")]
    FullPackage,
}

impl CourseModule {
    pub const ALL: [CourseModule; 4] = [
        CourseModule::Basic,
        CourseModule::Intermediate,
        CourseModule::Advanced,
        CourseModule::FullPackage,
    ];

    /// Label used by the site form and stored in the `modulo` column
    pub fn label(&self) -> &'static str {
        match self {
            CourseModule::Basic => "Básico",
            CourseModule::Intermediate => "Intermediário",
            CourseModule::Advanced => "Avançado",
            CourseModule::FullPackage => "Pacote Completo",
        }
    }

    /// Exact label match, no case folding or trimming.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

impl std::fmt::Display for CourseModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Amount in the payment account's currency, kept in cents.
///
/// Serializes as a JSON integer when the amount is whole (`70`) and as a
/// decimal otherwise (`70.5`), which is what both backends expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Price from whole currency units
    pub const fn whole(units: i64) -> Self {
        Self { cents: units * 100 }
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_whole(&self) -> bool {
        self.cents % 100 == 0
    }

    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Format for logs (e.g., "70.00")
    pub fn display(&self) -> String {
        format!("{}.{:02}", self.cents / 100, (self.cents % 100).abs())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.cents / 100)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "price must be a non-negative number, got {}",
                amount
            )));
        }
        Ok(Self {
            cents: (amount * 100.0).round() as i64,
        })
    }
}

/// Immutable module → price mapping
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    prices: BTreeMap<CourseModule, Price>,
}

#[derive(Deserialize)]
struct PriceTableFile {
    prices: HashMap<String, Price>,
}

impl PriceTable {
    /// Build a table; every module must be priced.
    pub fn new(prices: impl IntoIterator<Item = (CourseModule, Price)>) -> EnrollResult<Self> {
        let prices: BTreeMap<_, _> = prices.into_iter().collect();
        let unpriced: Vec<&str> = CourseModule::ALL
            .iter()
            .filter(|m| !prices.contains_key(m))
            .map(|m| m.label())
            .collect();

        if !unpriced.is_empty() {
            return Err(EnrollError::Configuration(format!(
                "price table has no price for: {}",
                unpriced.join(", ")
            )));
        }

        Ok(Self { prices })
    }

    /// Load a table from TOML:
    ///
    /// ```toml
    /// [prices]
    /// "Básico" = 50
    /// "Intermediário" = 70
    /// "Avançado" = 90
    /// "Pacote Completo" = 180
    /// ```
    pub fn from_toml(toml_str: &str) -> EnrollResult<Self> {
        let file: PriceTableFile = toml::from_str(toml_str)
            .map_err(|e| EnrollError::Configuration(format!("invalid price table: {}", e)))?;

        let mut prices = Vec::with_capacity(file.prices.len());
        for (label, price) in file.prices {
            let module = CourseModule::from_label(&label).ok_or_else(|| {
                EnrollError::Configuration(format!("price table has unknown module: {}", label))
            })?;
            prices.push((module, price));
        }

        Self::new(prices)
    }

    pub fn price_of(&self, module: CourseModule) -> Price {
        // `new` guarantees every module is present
        self.prices
            .get(&module)
            .copied()
            .unwrap_or(Price::from_cents(0))
    }

    /// Look up a module by its label
    pub fn resolve(&self, label: &str) -> Option<(CourseModule, Price)> {
        CourseModule::from_label(label).map(|module| (module, self.price_of(module)))
    }

    pub fn entries(&self) -> impl Iterator<Item = (CourseModule, Price)> + '_ {
        self.prices.iter().map(|(module, price)| (*module, *price))
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            prices: BTreeMap::from([
                (CourseModule::Basic, Price::whole(50)),
                (CourseModule::Intermediate, Price::whole(70)),
                (CourseModule::Advanced, Price::whole(90)),
                (CourseModule::FullPackage, Price::whole(180)),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_prices() {
        let table = PriceTable::default();

        assert_eq!(table.resolve("Básico"), Some((CourseModule::Basic, Price::whole(50))));
        assert_eq!(
            table.resolve("Intermediário"),
            Some((CourseModule::Intermediate, Price::whole(70)))
        );
        assert_eq!(
            table.resolve("Avançado"),
            Some((CourseModule::Advanced, Price::whole(90)))
        );
        assert_eq!(
            table.resolve("Pacote Completo"),
            Some((CourseModule::FullPackage, Price::whole(180)))
        );
    }

    #[test]
    fn test_unknown_labels_do_not_resolve() {
        let table = PriceTable::default();

        for label in ["", "Basic", "básico", "Básico ", "Expert", "Pacote completo"] {
            assert_eq!(table.resolve(label), None, "label {:?}", label);
        }
    }

    #[test]
    fn test_price_serialization() {
        assert_eq!(serde_json::to_value(Price::whole(70)).unwrap(), json!(70));
        assert_eq!(
            serde_json::to_value(Price::from_cents(7050)).unwrap(),
            json!(70.5)
        );
        assert_eq!(Price::from_cents(7005).display(), "70.05");
    }

    #[test]
    fn test_module_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(CourseModule::FullPackage).unwrap(),
            json!("Pacote Completo")
        );
        assert_eq!(CourseModule::Intermediate.to_string(), "Intermediário");
    }

    #[test]
    fn test_from_toml() {
        let table = PriceTable::from_toml(
            r#"
            [prices]
            "Básico" = 55
            "Intermediário" = 75.5
            "Avançado" = 95
            "Pacote Completo" = 200
            "#,
        )
        .unwrap();

        assert_eq!(table.price_of(CourseModule::Basic), Price::whole(55));
        assert_eq!(table.price_of(CourseModule::Intermediate), Price::from_cents(7550));
        assert_eq!(table.entries().count(), 4);
    }

    #[test]
    fn test_from_toml_requires_every_module() {
        let err = PriceTable::from_toml(
            r#"
            [prices]
            "Básico" = 50
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, EnrollError::Configuration(_)));
        assert!(err.to_string().contains("Pacote Completo"));
    }

    #[test]
    fn test_from_toml_rejects_unknown_and_negative() {
        let unknown = PriceTable::from_toml(
            r#"
            [prices]
            "Básico" = 50
            "Intermediário" = 70
            "Avançado" = 90
            "Pacote Completo" = 180
            "Mestre" = 300
            "#,
        );
        assert!(unknown.is_err());

        let negative = PriceTable::from_toml(
            r#"
            [prices]
            "Básico" = -50
            "Intermediário" = 70
            "Avançado" = 90
            "Pacote Completo" = 180
            "#,
        );
        assert!(negative.is_err());
    }
}

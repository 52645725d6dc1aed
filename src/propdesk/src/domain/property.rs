use entity_core::PrimaryKey;
use entity_macros::Entity;
use serde::{Deserialize, Serialize};

///
/// Property
///
/// pk = `PM#<manager>`, sk = `ADDRESS#..#COUNTRY#..#CITY#..#STATE#..#POSTAL#..#UNIT#..`.
/// Address parts are upper-cased, so the same address typed with a different
/// case lands on the same item.
///

#[derive(Clone, Debug, Entity, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Stable id referenced by work orders.
    pub address_id: String,
    #[pk(prefix = "PM", case = "lower")]
    pub property_manager_email: String,
    #[sk(prefix = "ADDRESS", order = 0, case = "upper")]
    pub address: String,
    #[sk(prefix = "COUNTRY", order = 1, case = "upper")]
    pub country: String,
    #[sk(prefix = "CITY", order = 2, case = "upper")]
    pub city: String,
    #[sk(prefix = "STATE", order = 3, case = "upper")]
    pub state: String,
    #[sk(prefix = "POSTAL", order = 4, case = "upper")]
    pub postal_code: String,
    #[sk(prefix = "UNIT", order = 5, case = "upper")]
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub num_beds: u16,
    #[serde(default)]
    pub num_baths: f32,
}

/// Everything that identifies a property.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAddress {
    pub property_manager_email: String,
    pub address: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub unit: String,
}

impl PropertyAddress {
    #[must_use]
    pub fn primary_key(&self) -> PrimaryKey {
        Property::primary_key_of(
            &self.property_manager_email,
            &self.address,
            &self.country,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_core::Entity;

    fn address(street: &str, city: &str) -> PropertyAddress {
        PropertyAddress {
            property_manager_email: "PM@Example.com".to_owned(),
            address: street.to_owned(),
            country: "us".to_owned(),
            city: city.to_owned(),
            state: "ma".to_owned(),
            postal_code: "02101".to_owned(),
            unit: "2b".to_owned(),
        }
    }

    #[test]
    fn address_key_is_case_insensitive() {
        let lower = address("1 main st", "boston").primary_key();
        let mixed = address("1 Main St", "BoStOn").primary_key();
        assert_eq!(lower, mixed);
        assert_eq!(lower.pk, "PM#pm@example.com");
        assert_eq!(
            lower.sk,
            "ADDRESS#1 MAIN ST#COUNTRY#US#CITY#BOSTON#STATE#MA#POSTAL#02101#UNIT#2B"
        );
    }

    #[test]
    fn empty_unit_keeps_its_segment() {
        let mut addr = address("1 main st", "boston");
        addr.unit = String::new();
        assert!(addr.primary_key().sk.ends_with("#UNIT#"));
    }

    #[test]
    fn entity_and_address_agree() {
        let addr = address("9 elm", "salem");
        let property = Property {
            address_id: "p1".to_owned(),
            property_manager_email: addr.property_manager_email.clone(),
            address: addr.address.clone(),
            country: addr.country.clone(),
            city: addr.city.clone(),
            state: addr.state.clone(),
            postal_code: addr.postal_code.clone(),
            unit: addr.unit.clone(),
            num_beds: 2,
            num_baths: 1.5,
        };
        assert_eq!(property.primary_key(), addr.primary_key());
    }
}

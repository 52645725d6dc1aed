use entity_macros::Entity;
use serde::{Deserialize, Serialize};

/// pk = sk = `ORG#<id>`
#[derive(Clone, Debug, Entity, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[pk(prefix = "ORG")]
    #[sk(prefix = "ORG")]
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_core::{Entity, PrimaryKey};

    #[test]
    fn partition_and_sort_key_are_equal() {
        let org = Organization {
            id: "0b6c".to_owned(),
            name: "Acme".to_owned(),
        };
        assert_eq!(org.primary_key(), PrimaryKey::new("ORG#0b6c", "ORG#0b6c"));
        assert_eq!(Organization::primary_key_of("0b6c"), org.primary_key());
    }
}

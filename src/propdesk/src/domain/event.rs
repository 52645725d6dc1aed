use chrono::{DateTime, Utc};
use entity_core::Ksuid;
use entity_macros::Entity;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    StatusUpdate,
    AssignTechnician,
    RemoveTechnician,
    #[default]
    Comment,
}

///
/// Event
///
/// Work-order timeline entry. pk = `EV#<work order id>`, sk = KSUID, so a
/// reverse query on the partition reads newest first.
///

#[derive(Clone, Debug, Entity, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[pk(prefix = "EV")]
    pub work_order_id: String,
    #[sk]
    pub id: Ksuid,
    pub kind: EventKind,
    pub message: String,
    pub actor_email: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_core::{Entity, PrimaryKey};

    #[test]
    fn sort_key_is_bare_ksuid() {
        let id: Ksuid = "0ujtsYcgvSTl8PAuAdqWYSMnLOv".parse().unwrap();
        let event = Event {
            work_order_id: "wo-1".to_owned(),
            id,
            kind: EventKind::Comment,
            message: "hello".to_owned(),
            actor_email: "a@b.c".to_owned(),
            created_at: Utc::now(),
        };
        assert_eq!(
            event.primary_key(),
            PrimaryKey::new("EV#wo-1", "0ujtsYcgvSTl8PAuAdqWYSMnLOv")
        );
        assert_eq!(event.to_item().unwrap()["id"], "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
    }
}

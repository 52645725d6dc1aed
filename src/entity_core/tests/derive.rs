use entity_core::{
    AccessPattern, AttributeValue, Case, Entity, Index, KeyTemplate, PrimaryKey, Repository,
    ScanOrder, SegmentTemplate, SortCondition,
    store::{ItemStore, MemoryStore},
};
use entity_macros::Entity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Entity, PartialEq, Serialize, Deserialize)]
struct Ticket {
    #[pk(prefix = "TK")]
    queue: String,
    #[sk(prefix = "STATE")]
    #[nk(name = "GSI1SK", prefix = "STATE")]
    #[nk(name = "GSI2SK", prefix = "STATE")]
    state: String,
    #[nk(name = "GSI1PK", prefix = "OWNER", case = "lower")]
    owner_email: String,
    #[nk(name = "GSI2PK", prefix = "AGENT", case = "lower")]
    agent_email: Option<String>,
    title: String,
}

#[derive(Clone, Debug, Entity, PartialEq, Serialize, Deserialize)]
#[sk(name = "sk")]
struct Place {
    #[pk(prefix = "OWNER", case = "lower")]
    owner_email: String,
    #[sk(prefix = "STREET", order = 0, case = "upper")]
    street: String,
    #[sk(prefix = "UNIT", order = 2, case = "upper")]
    unit: String,
    #[sk(prefix = "CITY", order = 1, case = "upper")]
    city: String,
}

#[derive(Clone, Debug, Entity, PartialEq, Serialize, Deserialize)]
#[sk(value = "PROFILE")]
#[nk(name = "kind", value = "team")]
struct Team {
    #[pk(prefix = "TEAM")]
    id: String,
    name: String,
}

const TICKETS_BY_OWNER: AccessPattern = AccessPattern {
    name: "tickets_by_owner",
    index: Index::Gsi1,
    partition: KeyTemplate::new(&[SegmentTemplate::labeled("OWNER", Case::Lower)]),
    sort: SortCondition::BeginsWith("STATE#"),
    order: ScanOrder::Forward,
    page_size: 2,
};

const TICKETS_BY_AGENT: AccessPattern = AccessPattern {
    name: "tickets_by_agent",
    index: Index::Gsi2,
    partition: KeyTemplate::new(&[SegmentTemplate::labeled("AGENT", Case::Lower)]),
    sort: SortCondition::BeginsWith("STATE#"),
    order: ScanOrder::Forward,
    page_size: 10,
};

fn ticket(queue: &str, state: &str, agent: Option<&str>) -> Ticket {
    Ticket {
        queue: queue.to_owned(),
        state: state.to_owned(),
        owner_email: "Owner@Example.com".to_owned(),
        agent_email: agent.map(str::to_owned),
        title: format!("{queue} {state}"),
    }
}

#[test]
fn key_attributes_follow_attribute_rules() {
    let item = ticket("q1", "OPEN", Some("Agent@Example.com")).key_attributes();

    assert_eq!(item["pk"], "TK#q1");
    assert_eq!(item["sk"], "STATE#OPEN");
    assert_eq!(item["GSI1PK"], "OWNER#owner@example.com");
    assert_eq!(item["GSI1SK"], "STATE#OPEN");
    assert_eq!(item["GSI2PK"], "AGENT#agent@example.com");
    assert_eq!(item["GSI2SK"], "STATE#OPEN");
}

#[test]
fn unset_optional_field_leaves_attribute_out() {
    let item = ticket("q1", "OPEN", None).to_item().unwrap();

    assert!(!item.contains_key("GSI2PK"));
    assert!(item.contains_key("GSI2SK"));
    assert_eq!(item["title"], "q1 OPEN");
}

#[test]
fn sort_segments_use_declared_order() {
    let place = Place {
        owner_email: "X@Y.com".to_owned(),
        street: "1 main st".to_owned(),
        unit: "4b".to_owned(),
        city: "boston".to_owned(),
    };

    assert_eq!(
        place.primary_key(),
        PrimaryKey::new("OWNER#x@y.com", "STREET#1 MAIN ST#CITY#BOSTON#UNIT#4B")
    );
}

#[test]
fn primary_key_of_matches_instance_key() {
    let t = ticket("q9", "DONE", None);
    assert_eq!(Ticket::primary_key_of("q9", "DONE"), t.primary_key());
    assert_eq!(
        Team::primary_key_of("t1"),
        PrimaryKey::new("TEAM#t1", "PROFILE")
    );
}

#[test]
fn static_attributes_are_written() {
    let team = Team {
        id: "t1".to_owned(),
        name: "Ops".to_owned(),
    };
    let item = team.to_item().unwrap();
    assert_eq!(item["sk"], "PROFILE");
    assert_eq!(item["kind"], "team");
}

#[test]
fn schema_describes_attributes() {
    let schema = Ticket::schema();
    assert_eq!(schema.entity_name, "Ticket");
    assert_eq!(schema.partition_key_def.attribute_name, "pk");
    assert_eq!(schema.indexes(), [Index::Gsi1, Index::Gsi2]);

    let gsi1pk = schema.key_def("GSI1PK").unwrap();
    assert_eq!(
        gsi1pk.attribute_value.leading(),
        Some((Some("OWNER"), Case::Lower))
    );
    assert!(matches!(
        Team::schema().sort_key_def.attribute_value,
        AttributeValue::Static(ref v) if v == "PROFILE"
    ));
}

#[test]
fn patterns_audit_against_derived_schema() {
    TICKETS_BY_OWNER.audit(&Ticket::schema()).unwrap();
    TICKETS_BY_AGENT.audit(&Ticket::schema()).unwrap();
    assert!(TICKETS_BY_OWNER.audit(&Team::schema()).is_err());
}

#[tokio::test]
async fn repository_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let repo: Repository<Ticket> = Repository::new(store.clone());

    let written = repo
        .create(ticket("q1", "OPEN", Some("a@b.c")))
        .send()
        .await
        .unwrap();
    let read = repo.get(&written.primary_key()).await.unwrap();
    assert_eq!(read, Some(written));

    assert!(repo
        .get(&Ticket::primary_key_of("q1", "CLOSED"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn query_pages_through_sparse_index() {
    let store = Arc::new(MemoryStore::new());
    let repo: Repository<Ticket> = Repository::new(store.clone());
    for (queue, agent) in [("q1", Some("a@b.c")), ("q2", None), ("q3", Some("A@B.C"))] {
        repo.create(ticket(queue, "OPEN", agent)).send().await.unwrap();
    }

    let by_agent = repo
        .query(&TICKETS_BY_AGENT)
        .partition(["A@b.c"])
        .send_all()
        .await
        .unwrap();
    let queues: Vec<&str> = by_agent.iter().map(|t| t.queue.as_str()).collect();
    assert_eq!(queues, ["q1", "q3"]);

    let first = repo
        .query(&TICKETS_BY_OWNER)
        .partition(["owner@example.com"])
        .send()
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    let second = repo
        .query(&TICKETS_BY_OWNER)
        .partition(["owner@example.com"])
        .cursor(first.cursor)
        .send()
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(second.cursor.is_none());
}

#[tokio::test]
async fn setters_move_item_when_key_changes() {
    let store = Arc::new(MemoryStore::new());
    let repo: Repository<Ticket> = Repository::new(store.clone());
    let original = repo
        .create(ticket("q1", "OPEN", None))
        .send()
        .await
        .unwrap();

    let updated = repo
        .update(original.primary_key())
        .set_state("DONE".to_owned())
        .set_agent_email(Some("t@x.io".to_owned()))
        .send()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.primary_key(), Ticket::primary_key_of("q1", "DONE"));
    assert!(store.get(&original.primary_key()).await.unwrap().is_none());
    let item = store.get(&updated.primary_key()).await.unwrap().unwrap();
    assert_eq!(item["GSI2PK"], "AGENT#t@x.io");
    assert_eq!(item["GSI1SK"], "STATE#DONE");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn update_of_missing_item_is_none() {
    let store = Arc::new(MemoryStore::new());
    let repo: Repository<Team> = Repository::new(store);

    let result = repo
        .update(Team::primary_key_of("nope"))
        .set_name("x".to_owned())
        .send()
        .await
        .unwrap();
    assert!(result.is_none());
}

use indexbag::{IndexError, obs, prelude::*};

#[derive(Debug)]
struct User {
    id: u64,
    team: String,
}

#[test]
fn prelude_builds_a_container() {
    let mut users = Container::new();
    let by_id = UniqueIndex::named("id", |u: &User| u.id)
        .unwrap()
        .on(&mut users)
        .unwrap();
    let by_team = NonUniqueIndex::named("team", |u: &User| u.team.clone())
        .unwrap()
        .on(&mut users)
        .unwrap();

    let ada = users
        .add(User {
            id: 1,
            team: "core".into(),
        })
        .unwrap();
    users
        .add(User {
            id: 2,
            team: "core".into(),
        })
        .unwrap();

    let rejected = users
        .add(User {
            id: 1,
            team: "web".into(),
        })
        .unwrap_err();
    assert!(matches!(rejected.source, IndexError::KeyCollision { .. }));
    assert_eq!(rejected.value.team, "web");

    assert_eq!(by_id.get(&1), Some(ada));
    assert_eq!(by_team.count(&"core".to_string()), 2);
    assert_eq!(by_id.label().to_string(), "id");
}

#[test]
fn report_is_serializable_from_facade() {
    obs::metrics_reset_all();
    let json = serde_json::to_string(&obs::metrics_report()).unwrap();

    assert!(json.contains("\"add_calls\":0"));
    assert!(!indexbag::VERSION.is_empty());
}

use osmedit::actions::change_tags;
use osmedit::tags::from_pairs;
use osmedit::test_utils::TestEnv;
use osmedit::validations::outdated_tags::OutdatedTags;
use osmedit::validations::{validate_changes, IssueFix, Severity};
use osmedit::{Entity, EntityAttrs, EntityId, Graph, History, Resolver};

const DEPRECATED: &str = r#"[
    {"old": {"highway": "ford"}, "replace": {"ford": "yes"}},
    {"old": {"speedlimit": "*"}, "replace": {"maxspeed": "$1"}},
    {"old": {"building": "home"}, "replace": {"building": "house"}}
]"#;

fn setup() -> (TestEnv, OutdatedTags, History) {
    let env = TestEnv::new();
    env.write("deprecated.json", DEPRECATED);
    env.write_config("deprecated_path = \"deprecated.json\"\n");
    let rules = env.load_config().load_rules().unwrap();

    let node = Entity::node(
        EntityAttrs::new()
            .id("n1")
            .tag("highway", "ford")
            .tag("speedlimit", "30"),
    );
    let history = History::new(Graph::new([node]));
    (env, OutdatedTags::new().with_rules(rules.deprecated), history)
}

#[test]
fn test_edit_validate_fix_undo() {
    let (_env, validation, mut history) = setup();
    let id = EntityId::from("n1");

    history.perform(
        |graph| {
            let mut tags = graph.entity(&id).unwrap().tags().clone();
            tags.insert("name".to_string(), "Old Crossing".to_string());
            change_tags(graph, &id, tags).unwrap()
        },
        "Changed tags",
    );

    let found = validate_changes(&validation, &history.difference(), history.graph());
    assert!(!found.provisional);
    assert_eq!(found.len(), 1);
    let issue = &found.issues[0];
    assert_eq!(issue.subtype, "deprecated_tags");
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.entity_ids, vec![id.clone()]);

    let fix = issue.fixes[0].clone();
    assert!(matches!(fix, IssueFix::UpgradeTags { .. }));
    history.perform(
        |graph| fix.apply(graph, &id).unwrap(),
        "Upgraded tags",
    );

    assert_eq!(
        history.graph().entity(&id).unwrap().tags(),
        &from_pairs([("ford", "yes"), ("maxspeed", "30"), ("name", "Old Crossing")])
    );
    let again = validate_changes(&validation, &history.difference(), history.graph());
    assert!(again.is_empty());

    assert_eq!(history.undo(), Some("Upgraded tags"));
    assert_eq!(history.graph().entity(&id).unwrap().tag("highway"), Some("ford"));
    assert!(history.can_redo());
}

#[test]
fn test_untouched_entities_are_not_validated() {
    let (_env, validation, history) = setup();
    let found = validate_changes(&validation, &history.difference(), history.graph());
    assert!(found.is_empty());
    assert!(!history.has_changes());
}

#[test]
fn test_rules_still_loading_are_provisional() {
    let (_env, _, mut history) = setup();
    let id = EntityId::from("n1");
    history.perform(
        |graph| change_tags(graph, &id, from_pairs([("building", "home")])).unwrap(),
        "Changed tags",
    );

    let waiting = OutdatedTags::new();
    let found = validate_changes(&waiting, &history.difference(), history.graph());
    assert!(found.provisional);
    assert!(found.is_empty());
}

#[test]
fn test_issue_id_tracks_content() {
    let (_env, validation, mut history) = setup();
    let id = EntityId::from("n1");

    history.perform(
        |graph| change_tags(graph, &id, from_pairs([("building", "home")])).unwrap(),
        "Changed tags",
    );
    let first = validate_changes(&validation, &history.difference(), history.graph());

    history.perform(
        |graph| {
            change_tags(graph, &id, from_pairs([("building", "home"), ("speedlimit", "50")]))
                .unwrap()
        },
        "Changed tags",
    );
    let second = validate_changes(&validation, &history.difference(), history.graph());

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first.issues[0].id(), second.issues[0].id());
}

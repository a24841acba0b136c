use story_graph_core::projection::quads::rule_relation_key;
use story_graph_core::vocabulary::{
    scene_iri, CONDITION_PROPERTY, RDF_TYPE, SCENE_TYPE, TRANSITION_TYPE, WEIGHT_PROPERTY,
};
use story_graph_core::{
    decode_rules, project_rules, project_schema, reconcile_rules, AuthoringState,
    ConditionOperator, GraphModel, InMemoryGraph, QuadSubject, SceneRule, SceneRuleCondition,
    Term,
};

fn sample_rules() -> Vec<SceneRule> {
    vec![
        SceneRule::new("start", "end")
            .with_weight(2.0)
            .with_condition(SceneRuleCondition::new("hp", ConditionOperator::Le, 0.0)),
        SceneRule::new("start", "cave"),
        SceneRule::new("cave", "end")
            .with_condition(SceneRuleCondition::new("gold", ConditionOperator::Ge, 3.0))
            .with_condition(SceneRuleCondition::new("torch", ConditionOperator::Eq, 1.0)),
    ]
}

#[test]
fn projection_emits_each_scene_once_in_first_reference_order() {
    let projection = project_rules(&sample_rules());
    let ids: Vec<&str> = projection
        .entities
        .iter()
        .map(|entity| entity.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "urn:story-adventure:scene:start",
            "urn:story-adventure:scene:end",
            "urn:story-adventure:scene:cave",
        ]
    );
    assert!(projection
        .entities
        .iter()
        .all(|entity| entity.has_type(SCENE_TYPE)));
    assert_eq!(projection.relations.len(), 3);
    assert!(projection
        .relations
        .iter()
        .all(|relation| relation.link_type == TRANSITION_TYPE));
}

#[test]
fn projecting_twice_is_idempotent() {
    let rules = sample_rules();
    assert_eq!(project_rules(&rules), project_rules(&rules));

    let mut graph = InMemoryGraph::new();
    let mut projection = project_schema();
    projection.extend(project_rules(&rules));
    projection.emit_into(&mut graph);
    projection.emit_into(&mut graph);

    assert_eq!(graph.element_count(), 4);
    assert_eq!(graph.link_count(), 3);
    assert_eq!(graph.elements().len(), 4);
}

#[test]
fn default_weight_is_omitted_and_restored() {
    let rules = decode_rules(r#"[{ "current_scene": "a", "result_scene": "b" }]"#)
        .expect("decode rules");
    let projection = project_rules(&rules);
    assert!(projection.relations[0]
        .property_values(WEIGHT_PROPERTY)
        .is_empty());

    let reconciled = reconcile_rules(&rules, &AuthoringState::empty()).expect("reconcile");
    assert_eq!(reconciled[0].weight, 1.0);
}

#[test]
fn conditions_project_as_tagged_literals_in_order() {
    let projection = project_rules(&sample_rules());
    let values: Vec<&str> = projection.relations[2]
        .property_values(CONDITION_PROPERTY)
        .iter()
        .filter_map(Term::as_literal)
        .map(|literal| literal.value.as_str())
        .collect();
    assert_eq!(values, vec!["gold >= 3", "torch = 1"]);
}

#[test]
fn quads_type_scenes_and_annotate_transitions() {
    let rules = sample_rules();
    let quads = project_rules(&rules).quads();

    let typed_start = quads.iter().any(|quad| {
        quad.subject == QuadSubject::Node(scene_iri("start"))
            && quad.predicate == RDF_TYPE
            && quad.object == Term::NamedNode(SCENE_TYPE.to_string())
    });
    assert!(typed_start);

    let key = rule_relation_key(&rules[0]);
    let annotations: Vec<&str> = quads
        .iter()
        .filter(|quad| quad.subject == QuadSubject::Relation(key.clone()))
        .map(|quad| quad.predicate.as_str())
        .collect();
    assert!(annotations.contains(&WEIGHT_PROPERTY));
    assert!(annotations.contains(&CONDITION_PROPERTY));
}

#[test]
fn duplicate_rule_keys_collapse_to_first_relation() {
    let rules = vec![
        SceneRule::new("a", "b").with_weight(2.0),
        SceneRule::new("a", "b").with_weight(5.0),
    ];
    let projection = project_rules(&rules);
    assert_eq!(projection.relations.len(), 1);
    let weight = projection.relations[0].property_values(WEIGHT_PROPERTY)[0]
        .as_literal()
        .expect("weight literal");
    assert_eq!(weight.value, "2");

    let reconciled = reconcile_rules(&rules, &AuthoringState::empty()).expect("reconcile");
    assert_eq!(reconciled, rules);
}

use proptest::prelude::*;
use std::collections::HashSet;
use tagviz_taxonomy::{
    normalize, Domain, OutlineOptions, OutlineParser, TagLevel, Taxonomy, TaxonomyExport,
};
use tagviz_test_utils::{outline_from_shape, sample_taxonomy, SAMPLE_OUTLINE};

#[test]
fn sample_outline_publishes_every_domain() {
    let taxonomy = sample_taxonomy();

    let per_domain: Vec<usize> = Domain::ALL
        .into_iter()
        .map(|domain| taxonomy.published_in(domain).count())
        .collect();
    assert_eq!(per_domain, vec![11, 9, 10, 9]);
    assert_eq!(taxonomy.len(), 39);
    assert_eq!(taxonomy.all_nodes().len(), 43);
    assert_eq!(taxonomy.duplicate_display_names(), 0);
}

#[test]
fn shared_platform_names_stay_in_their_tree() {
    let taxonomy = sample_taxonomy();

    let content_form = taxonomy
        .lookup_by_display_name(Domain::PlatformContentForm, "Twitter")
        .unwrap();
    let attribute = taxonomy
        .lookup_by_display_name(Domain::PlatformAttribute, "Twitter")
        .unwrap();

    assert_eq!(content_form.id.as_str(), "ContentForm-Social_Media-Microblog-Twitter");
    assert_eq!(attribute.id.as_str(), "Attribute-Commercial-International-Twitter");

    let chain: Vec<_> = taxonomy
        .ancestors_of(attribute.id.as_str())
        .into_iter()
        .map(|node| node.display_name.as_str())
        .collect();
    assert_eq!(chain, vec!["International", "Commercial"]);
}

#[test]
fn export_covers_published_nodes() {
    let taxonomy = sample_taxonomy();
    let export = TaxonomyExport::from_taxonomy(&taxonomy);

    assert_eq!(export.nodes.len(), taxonomy.len());
    assert_eq!(export.l3_tag_to_id_map.len(), 4);
    assert_eq!(
        export.l3_tag_to_id_map[&Domain::ResearchMethod]["Topic Modeling"].as_str(),
        "Quantitative-Computational-Topic_Modeling"
    );
    assert!(export
        .nodes
        .iter()
        .all(|node| (node.level == 1) == node.parent_id.is_none()));
}

#[test]
fn reparse_is_identical() {
    let parser = OutlineParser::default();
    assert_eq!(parser.parse(SAMPLE_OUTLINE), parser.parse(SAMPLE_OUTLINE));
}

fn arbitrary_line() -> impl Strategy<Value = String> {
    let heading = prop_oneof![
        Just("# **ResearchContent**"),
        Just("# **ResearchMethod**"),
        Just("# **Platform**"),
        Just("## **Venue**"),
    ]
    .prop_map(str::to_string);
    let bullet = (0..24usize, prop_oneof![
        Just("ContentForm"),
        Just("Attribute"),
        Just("Alpha"),
        Just("Beta"),
        Just("Alpha Beta"),
        Just("**Gamma**"),
    ])
        .prop_map(|(indent, name)| format!("{}- {name}", " ".repeat(indent)));
    let noise = prop_oneof![Just(""), Just("plain text"), Just("---"), Just("\t- Tabbed")]
        .prop_map(str::to_string);

    prop_oneof![1 => heading, 6 => bullet, 1 => noise]
}

proptest! {
    #[test]
    fn prop_ids_are_unique(lines in proptest::collection::vec(arbitrary_line(), 0..60)) {
        let text = lines.join("\n");
        let parsed = OutlineParser::default().parse(&text);

        let mut seen = HashSet::new();
        for node in &parsed.nodes {
            prop_assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
        }
    }

    #[test]
    fn prop_parse_is_deterministic(lines in proptest::collection::vec(arbitrary_line(), 0..60)) {
        let text = lines.join("\n");
        let parser = OutlineParser::default();
        prop_assert_eq!(parser.parse(&text), parser.parse(&text));
    }

    #[test]
    fn prop_ancestor_chains_end_at_level_one(
        lines in proptest::collection::vec(arbitrary_line(), 0..60)
    ) {
        let text = lines.join("\n");
        let taxonomy = Taxonomy::from_outline(&text, &OutlineOptions::default()).unwrap();

        for node in taxonomy.published() {
            let Some(level) = node.display_level else { continue };
            let ancestors = taxonomy.ancestors_of(node.id.as_str());

            prop_assert_eq!(ancestors.len(), level.index());
            if let Some(top) = ancestors.last() {
                prop_assert_eq!(top.display_level, Some(TagLevel::L1));
            }
            prop_assert!(ancestors.iter().all(|a| a.domain == node.domain));
        }
    }

    #[test]
    fn prop_children_are_one_level_deeper(
        shape in proptest::collection::vec((0..6usize, 0..4u8), 1..40)
    ) {
        let text = outline_from_shape("ResearchMethod", &shape);
        let parsed = OutlineParser::default().parse(&text);
        prop_assert_eq!(parsed.diagnostics.clamped_bullets, 0);

        let nodes = normalize(parsed.nodes);
        for node in &nodes {
            for child in &node.children {
                let child = nodes.iter().find(|n| &n.id == child).unwrap();
                prop_assert_eq!(child.raw_level, node.raw_level + 1);
                prop_assert_eq!(child.parent.as_ref(), Some(&node.id));
            }
        }
    }
}

//! Whole engine runs: monotonicity, idempotence, termination and cleanup.

use oxdecl::vocab::{self, owl};
use oxdecl::{BuiltIns, Category, DeclarationEngine, EngineConfig, TripleStore};
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{
    BlankNode, Graph, NamedNode, NamedNodeRef, NamedOrBlankNodeRef, TermRef, Triple, TripleRef,
};
use oxrdfio::{RdfFormat, RdfParser};

const PREFIXES: &str = r#"
    @prefix ex: <http://example.com/> .
    @prefix owl: <http://www.w3.org/2002/07/owl#> .
    @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
    @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
"#;

const ONTOLOGY: &str = r#"
    ex:ontology a owl:Ontology ; rdfs:comment "people" .
    ex:Person a owl:Class .
    ex:Student rdfs:subClassOf ex:Person .
    ex:Parent owl:equivalentClass [ a owl:Restriction ; owl:onProperty ex:hasChild ; owl:someValuesFrom ex:Person ] .
    ex:knows a owl:SymmetricProperty ; rdfs:domain ex:Person ; rdfs:range ex:Person .
    ex:name a owl:FunctionalProperty .
    ex:alice a ex:Student ; ex:knows ex:bob ; ex:name "Alice" ; ex:nick "Al" ; ex:hasChild ex:carol .
    ex:bob owl:sameAs [ ex:name "Robert" ] .
    ex:age rdfs:range xsd:integer .
    ex:tag rdfs:subPropertyOf ex:label .
"#;

/// Helper to parse a Turtle string into a Graph.
fn parse_turtle(turtle: &str) -> Graph {
    let mut graph = Graph::new();
    let parser = RdfParser::from_format(RdfFormat::Turtle);
    for quad_result in parser.for_reader(format!("{PREFIXES}{turtle}").as_bytes()) {
        let quad = quad_result.expect("Failed to parse turtle");
        graph.insert(quad.as_ref());
    }
    graph
}

fn ex(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn is_a(graph: &Graph, name: &str, category: NamedNodeRef<'_>) -> bool {
    graph.contains(&Triple::new(ex(name), rdf::TYPE, category))
}

fn declarations(graph: &Graph) -> Vec<Triple> {
    graph
        .triples_for_predicate(rdf::TYPE)
        .filter(|t| matches!(t.object, TermRef::NamedNode(c) if Category::from_iri(c).is_some()))
        .map(TripleRef::into_owned)
        .collect()
}

// =============================================================================
// Engine properties
// =============================================================================

#[test]
fn test_ontology_is_fully_declared() {
    let mut graph = parse_turtle(ONTOLOGY);
    let report = DeclarationEngine::default().run(&mut graph);
    assert!(report.is_complete(), "{:?}", report.unresolved());
    assert!(is_a(&graph, "Student", owl::CLASS));
    assert!(is_a(&graph, "Parent", owl::CLASS));
    assert!(is_a(&graph, "knows", owl::OBJECT_PROPERTY));
    assert!(is_a(&graph, "hasChild", owl::OBJECT_PROPERTY));
    assert!(is_a(&graph, "name", owl::DATATYPE_PROPERTY));
    assert!(is_a(&graph, "nick", owl::ANNOTATION_PROPERTY));
    assert!(is_a(&graph, "age", owl::ANNOTATION_PROPERTY));
    assert!(is_a(&graph, "tag", owl::ANNOTATION_PROPERTY));
    assert!(is_a(&graph, "label", owl::ANNOTATION_PROPERTY));
    for individual in ["alice", "bob", "carol"] {
        assert!(is_a(&graph, individual, owl::NAMED_INDIVIDUAL), "{individual}");
    }
    assert!(!is_a(&graph, "ontology", owl::NAMED_INDIVIDUAL));
    assert!(report.declared() > 0);
}

#[test]
fn test_declarations_only_grow() {
    let mut graph = parse_turtle(ONTOLOGY);
    let before = declarations(&graph);
    DeclarationEngine::default().run(&mut graph);
    for declaration in &before {
        assert!(graph.contains(declaration), "{declaration} has been removed");
    }
    assert!(declarations(&graph).len() > before.len());
}

#[test]
fn test_second_run_adds_nothing() {
    let mut graph = parse_turtle(ONTOLOGY);
    let engine = DeclarationEngine::default();
    engine.run(&mut graph);
    let first: Graph = graph.iter().collect();
    let report = engine.run(&mut graph);
    assert_eq!(graph, first);
    assert_eq!(report.declared(), 0);
    assert_eq!(report.retracted(), 0);
    assert!(report.is_complete());
}

#[test]
fn test_engine_terminates_within_the_round_bound() {
    let mut graph = parse_turtle(
        r#"
        _:x owl:onProperty ex:P ; owl:someValuesFrom ex:D .
        _:y owl:onProperty ex:Q ; owl:allValuesFrom ex:E .
        ex:A owl:equivalentClass ex:B .
        "#,
    );
    let report = DeclarationEngine::default().run(&mut graph);
    assert!(report.rounds() <= 10);
    assert_eq!(report.unresolved().len(), 3);
}

#[test]
fn test_max_rounds_configuration() {
    let mut graph = parse_turtle("ex:A rdfs:domain ex:B .");
    let engine = DeclarationEngine::with_config(
        BuiltIns::owl2(),
        EngineConfig {
            max_rounds: 2,
            ..EngineConfig::default()
        },
    );
    let report = engine.run(&mut graph);
    assert_eq!(report.rounds(), 2);
    assert!(!report.is_complete());
    assert!(!is_a(&graph, "A", owl::ANNOTATION_PROPERTY));
}

// =============================================================================
// Cleanup
// =============================================================================

#[test]
fn test_anonymous_property_is_retracted() {
    let mut graph = parse_turtle("[] a owl:ObjectProperty ; owl:inverseOf ex:q .");
    let report = DeclarationEngine::default().run(&mut graph);
    assert_eq!(
        graph
            .subjects_for_predicate_object(rdf::TYPE, owl::OBJECT_PROPERTY)
            .collect::<Vec<_>>(),
        [NamedOrBlankNodeRef::from(ex("q").as_ref())]
    );
    assert_eq!(report.retracted(), 1);
}

#[test]
fn test_anonymous_individual_markers_are_removed() {
    let mut graph = parse_turtle("ex:a owl:sameAs [] . ex:b owl:differentFrom _:c .");
    DeclarationEngine::default().run(&mut graph);
    assert_eq!(
        graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::ANONYMOUS_INDIVIDUAL)
            .count(),
        0
    );
    assert!(is_a(&graph, "a", owl::NAMED_INDIVIDUAL));
    assert!(is_a(&graph, "b", owl::NAMED_INDIVIDUAL));
}

#[test]
fn test_stray_named_individual_on_blank_node() {
    let mut graph = parse_turtle("ex:a owl:sameAs _:b . _:b a owl:NamedIndividual .");
    DeclarationEngine::default().run(&mut graph);
    assert_eq!(
        graph
            .subjects_for_predicate_object(rdf::TYPE, owl::NAMED_INDIVIDUAL)
            .collect::<Vec<_>>(),
        [NamedOrBlankNodeRef::from(ex("a").as_ref())]
    );
}

#[test]
fn test_garbage_typings_are_removed() {
    let mut graph = parse_turtle(
        r#"
        ex:p a rdf:Property , owl:AnnotationProperty .
        ex:C a rdfs:Class ; rdfs:subClassOf ex:D .
        ex:q a rdf:Property .
        "#,
    );
    let report = DeclarationEngine::default().run(&mut graph);
    assert!(!graph.contains(&Triple::new(ex("p"), rdf::TYPE, rdf::PROPERTY)));
    assert!(is_a(&graph, "p", owl::ANNOTATION_PROPERTY));
    assert!(!graph.contains(&Triple::new(ex("C"), rdf::TYPE, rdfs::CLASS)));
    assert!(is_a(&graph, "C", owl::CLASS));
    assert!(graph.contains(&Triple::new(ex("q"), rdf::TYPE, rdf::PROPERTY)));
    assert_eq!(report.retracted(), 2);
}

// =============================================================================
// Vocabularies and stores
// =============================================================================

#[test]
fn test_custom_builtins() {
    let mut graph = parse_turtle("ex:A rdfs:subClassOf ex:B .");
    let builtins = BuiltIns::owl2().with_builtin(ex("B"), Category::Class);
    DeclarationEngine::new(builtins).run(&mut graph);
    assert!(is_a(&graph, "A", owl::CLASS));
    assert!(!is_a(&graph, "B", owl::CLASS));
}

#[test]
fn test_builtins_from_vocabulary_graph() {
    let vocabulary = parse_turtle("ex:p a owl:ObjectProperty .");
    let mut builtins = BuiltIns::owl2();
    assert_eq!(builtins.extend_from_graph(&vocabulary).unwrap(), 1);
    let mut graph = parse_turtle("ex:a ex:p ex:b .");
    let report = DeclarationEngine::new(builtins).run(&mut graph);
    assert!(report.is_complete());
    assert!(!is_a(&graph, "p", owl::OBJECT_PROPERTY));
    assert!(!is_a(&graph, "a", owl::NAMED_INDIVIDUAL));
}

/// A store without any index, to check the engine only relies on the trait.
#[derive(Default)]
struct VecStore {
    triples: Vec<Triple>,
}

impl TripleStore for VecStore {
    fn find(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Vec<Triple> {
        self.triples
            .iter()
            .filter(|t| {
                subject.is_none_or(|s| t.subject.as_ref() == s)
                    && predicate.is_none_or(|p| t.predicate.as_ref() == p)
                    && object.is_none_or(|o| t.object.as_ref() == o)
            })
            .cloned()
            .collect()
    }

    fn contains(&self, triple: TripleRef<'_>) -> bool {
        self.triples.iter().any(|t| t.as_ref() == triple)
    }

    fn insert(&mut self, triple: TripleRef<'_>) -> bool {
        if self.contains(triple) {
            return false;
        }
        self.triples.push(triple.into_owned());
        true
    }

    fn remove(&mut self, triple: TripleRef<'_>) -> bool {
        let Some(position) = self.triples.iter().position(|t| t.as_ref() == triple) else {
            return false;
        };
        self.triples.remove(position);
        true
    }
}

#[test]
fn test_fake_store_matches_graph() {
    let turtle = r#"
        ex:Student rdfs:subClassOf ex:Person .
        ex:alice a ex:Student ; ex:knows ex:bob ; ex:name "Alice" .
        ex:knows a owl:ObjectProperty .
        ex:name rdfs:range xsd:string .
        ex:A rdfs:domain ex:B .
    "#;
    let mut graph = parse_turtle(turtle);
    let mut store = VecStore::default();
    for triple in graph.iter() {
        store.insert(triple);
    }
    let engine = DeclarationEngine::default();
    let graph_report = engine.run(&mut graph);
    let store_report = engine.run(&mut store);
    assert_eq!(graph_report.unresolved(), store_report.unresolved());
    assert_eq!(graph_report.rounds(), store_report.rounds());
    let from_store: Graph = store.triples.iter().collect();
    assert_eq!(graph, from_store);
}

#[test]
fn test_engine_on_trait_object() {
    let mut graph = Graph::new();
    let blank = BlankNode::default();
    graph.insert(&Triple::new(blank.clone(), owl::ON_PROPERTY, ex("p")));
    graph.insert(&Triple::new(blank.clone(), owl::HAS_VALUE, ex("a")));
    let store: &mut dyn TripleStore = &mut graph;
    let report = DeclarationEngine::default().run(store);
    assert!(report.is_complete());
    assert!(is_a(&graph, "p", owl::OBJECT_PROPERTY));
    assert!(is_a(&graph, "a", owl::NAMED_INDIVIDUAL));
    assert!(graph.contains(&Triple::new(blank, rdf::TYPE, owl::RESTRICTION)));
}

//! The manifest phase: one pass of locally decidable declaration rules.
//!
//! Every rule here is triggered by a fixed predicate or structural marker and
//! never depends on a fact another rule of this phase has to guess, so no retry is needed.

use crate::category::{Category, GARBAGE_CATEGORIES};
use crate::classifier::Classifier;
use crate::store::{TripleStore, read_list, sort_triples};
use crate::vocab::{owl, swrl};
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{NamedNodeRef, NamedOrBlankNodeRef, Term, TermRef, Triple};
use tracing::debug;

const OBJECT_PROPERTY_CHARACTERISTICS: [NamedNodeRef<'static>; 6] = [
    owl::INVERSE_FUNCTIONAL_PROPERTY,
    owl::TRANSITIVE_PROPERTY,
    owl::SYMMETRIC_PROPERTY,
    owl::ASYMMETRIC_PROPERTY,
    owl::REFLEXIVE_PROPERTY,
    owl::IRREFLEXIVE_PROPERTY,
];

const CARDINALITIES: [NamedNodeRef<'static>; 6] = [
    owl::CARDINALITY,
    owl::MIN_CARDINALITY,
    owl::MAX_CARDINALITY,
    owl::QUALIFIED_CARDINALITY,
    owl::MIN_QUALIFIED_CARDINALITY,
    owl::MAX_QUALIFIED_CARDINALITY,
];

/// Applies every manifest rule once, in catalogue order.
///
/// Returns the number of declaration triples added.
pub fn apply<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) -> usize {
    let before = classifier.added();
    annotated_declarations(classifier);
    for predicate in [rdfs::SUB_CLASS_OF, owl::DISJOINT_WITH, owl::COMPLEMENT_OF] {
        for triple in statements(classifier.store(), predicate) {
            classifier.declare_class(triple.subject.as_ref().into());
            classifier.declare_class(triple.object.as_ref());
        }
    }
    for disjoint in instances(classifier.store(), owl::ALL_DISJOINT_CLASSES) {
        for member in list_objects(classifier.store(), &disjoint, owl::MEMBERS) {
            classifier.declare_class(member.as_ref());
        }
    }
    for triple in statements(classifier.store(), owl::DISJOINT_UNION_OF) {
        classifier.declare_class(triple.subject.as_ref().into());
        for member in read_list(classifier.store(), triple.object.as_ref()).unwrap_or_default() {
            classifier.declare_class(member.as_ref());
        }
    }
    for triple in statements(classifier.store(), owl::HAS_KEY) {
        classifier.declare_class(triple.subject.as_ref().into());
    }
    cardinality_restrictions(classifier);
    for triple in statements(classifier.store(), owl::DATATYPE_COMPLEMENT_OF) {
        classifier.declare_datatype(triple.subject.as_ref().into());
        classifier.declare_datatype(triple.object.as_ref());
    }
    for triple in statements(classifier.store(), owl::ON_DATATYPE) {
        if classifier
            .store()
            .has(triple.subject.as_ref(), owl::WITH_RESTRICTIONS)
        {
            classifier.declare_datatype(triple.subject.as_ref().into());
            classifier.declare_datatype(triple.object.as_ref());
        }
    }
    for triple in statements(classifier.store(), owl::ON_PROPERTIES) {
        classifier.declare_restriction(triple.subject.as_ref().into());
        for predicate in [owl::ALL_VALUES_FROM, owl::SOME_VALUES_FROM] {
            for range in classifier.store().objects(triple.subject.as_ref(), predicate) {
                if matches!(range, Term::BlankNode(_)) {
                    classifier.declare_datatype(range.as_ref());
                }
            }
        }
    }
    enumerations(classifier);
    for characteristic in OBJECT_PROPERTY_CHARACTERISTICS {
        for property in instances(classifier.store(), characteristic) {
            classifier.declare_object_property(property.as_ref());
        }
    }
    for triple in statements(classifier.store(), owl::INVERSE_OF) {
        classifier.declare_object_property(triple.subject.as_ref().into());
        classifier.declare_object_property(triple.object.as_ref());
    }
    for triple in statements(classifier.store(), owl::PROPERTY_CHAIN_AXIOM) {
        classifier.declare_object_property(triple.subject.as_ref().into());
        for member in read_list(classifier.store(), triple.object.as_ref()).unwrap_or_default() {
            classifier.declare_object_property(member.as_ref());
        }
    }
    self_restrictions(classifier);
    value_restrictions(classifier);
    negative_property_assertions(classifier);
    for predicate in [owl::SAME_AS, owl::DIFFERENT_FROM] {
        for triple in statements(classifier.store(), predicate) {
            classifier.declare_individual(triple.subject.as_ref().into());
            classifier.declare_individual(triple.object.as_ref());
        }
    }
    for different in instances(classifier.store(), owl::ALL_DIFFERENT) {
        for predicate in [owl::MEMBERS, owl::DISTINCT_MEMBERS] {
            for member in list_objects(classifier.store(), &different, predicate) {
                classifier.declare_individual(member.as_ref());
            }
        }
    }
    class_assertions(classifier);
    swrl_atoms(classifier);
    let added = classifier.added() - before;
    debug!("manifest phase added {added} declarations");
    added
}

/// The `(?, predicate, ?)` triples in N-Triples order.
pub(crate) fn statements<S: TripleStore + ?Sized>(
    store: &S,
    predicate: NamedNodeRef<'_>,
) -> Vec<Triple> {
    let mut triples = store.find(None, Some(predicate), None);
    sort_triples(&mut triples);
    triples
}

/// The subjects of the `(?, rdf:type, class)` triples in N-Triples order.
fn instances<S: TripleStore + ?Sized>(store: &S, class: NamedNodeRef<'_>) -> Vec<Term> {
    statements_typed(store, class)
        .into_iter()
        .map(|t| t.subject.into())
        .collect()
}

/// The `(?, rdf:type, class)` triples in N-Triples order.
pub(crate) fn statements_typed<S: TripleStore + ?Sized>(
    store: &S,
    class: NamedNodeRef<'_>,
) -> Vec<Triple> {
    let mut triples = store.find(None, Some(rdf::TYPE), Some(class.into()));
    sort_triples(&mut triples);
    triples
}

/// The members of the well-formed lists that are objects of `(node, predicate, ?)`.
fn list_objects<S: TripleStore + ?Sized>(
    store: &S,
    node: &Term,
    predicate: NamedNodeRef<'_>,
) -> Vec<Term> {
    let Some(subject) = as_subject(node) else {
        return Vec::new();
    };
    store
        .objects(subject, predicate)
        .into_iter()
        .filter_map(|list| read_list(store, list.as_ref()))
        .flatten()
        .collect()
}

/// `owl:Axiom`/`owl:Annotation` reifications of a `rdf:type` triple declare the annotated source.
fn annotated_declarations<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    let axioms = classifier
        .store()
        .subjects(owl::ANNOTATED_PROPERTY, rdf::TYPE.into());
    let mut axioms: Vec<Term> = axioms.into_iter().map(Term::from).collect();
    axioms.sort_by_cached_key(Term::to_string);
    for axiom in axioms {
        let Some(axiom) = as_subject(&axiom) else {
            continue;
        };
        let targets = classifier.store().objects(axiom, owl::ANNOTATED_TARGET);
        let sources = classifier.store().objects(axiom, owl::ANNOTATED_SOURCE);
        for target in &targets {
            let Term::NamedNode(target) = target else {
                continue;
            };
            let Some(category) = Category::from_iri(target.as_ref()) else {
                continue;
            };
            for source in &sources {
                if category == Category::Class {
                    classifier.declare_class(source.as_ref());
                } else {
                    classifier.declare(source.as_ref(), category);
                }
            }
        }
    }
}

fn cardinality_restrictions<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for predicate in CARDINALITIES {
        for triple in statements(classifier.store(), predicate) {
            classifier.declare_restriction(triple.subject.as_ref().into());
        }
    }
    for triple in statements(classifier.store(), owl::ON_CLASS) {
        classifier.declare_restriction(triple.subject.as_ref().into());
        classifier.declare_class(triple.object.as_ref());
        for property in classifier
            .store()
            .objects(triple.subject.as_ref(), owl::ON_PROPERTY)
        {
            classifier.declare_object_property(property.as_ref());
        }
    }
    for triple in statements(classifier.store(), owl::ON_DATA_RANGE) {
        classifier.declare_restriction(triple.subject.as_ref().into());
        classifier.declare_datatype(triple.object.as_ref());
        for property in classifier
            .store()
            .objects(triple.subject.as_ref(), owl::ON_PROPERTY)
        {
            classifier.declare_data_property(property.as_ref());
        }
    }
}

/// `owl:oneOf`: only literals make a datatype, anything else a class of individuals.
fn enumerations<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for triple in statements(classifier.store(), owl::ONE_OF) {
        let Some(members) = read_list(classifier.store(), triple.object.as_ref()) else {
            continue;
        };
        if !members.is_empty() && members.iter().all(|m| matches!(m, Term::Literal(_))) {
            classifier.declare_datatype(triple.subject.as_ref().into());
        } else {
            classifier.declare_class(triple.subject.as_ref().into());
            for member in &members {
                classifier.declare_individual(member.as_ref());
            }
        }
    }
}

fn self_restrictions<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for triple in statements(classifier.store(), owl::HAS_SELF) {
        let Term::Literal(value) = &triple.object else {
            continue;
        };
        if !matches!(value.value(), "true" | "1") {
            continue;
        }
        classifier.declare_restriction(triple.subject.as_ref().into());
        for property in classifier
            .store()
            .objects(triple.subject.as_ref(), owl::ON_PROPERTY)
        {
            classifier.declare_object_property(property.as_ref());
        }
    }
}

/// `owl:hasValue`: a literal value makes a data property, a resource an object property.
fn value_restrictions<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for triple in statements(classifier.store(), owl::HAS_VALUE) {
        let properties = classifier
            .store()
            .objects(triple.subject.as_ref(), owl::ON_PROPERTY);
        if properties.is_empty() {
            continue;
        }
        classifier.declare_restriction(triple.subject.as_ref().into());
        for property in &properties {
            if matches!(triple.object, Term::Literal(_)) {
                classifier.declare_data_property(property.as_ref());
            } else {
                classifier.declare_object_property(property.as_ref());
            }
        }
        classifier.declare_individual(triple.object.as_ref());
    }
}

fn negative_property_assertions<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    let mut assertions = statements(classifier.store(), owl::SOURCE_INDIVIDUAL);
    assertions.dedup_by(|a, b| a.subject == b.subject);
    for assertion in assertions {
        let node = assertion.subject.as_ref();
        let store = classifier.store();
        let properties = store.objects(node, owl::ASSERTION_PROPERTY);
        let targets = store.objects(node, owl::TARGET_INDIVIDUAL);
        for source in store.objects(node, owl::SOURCE_INDIVIDUAL) {
            classifier.declare_individual(source.as_ref());
        }
        if !targets.is_empty() {
            for property in &properties {
                classifier.declare_object_property(property.as_ref());
            }
            for target in &targets {
                classifier.declare_individual(target.as_ref());
            }
        } else {
            for property in &properties {
                classifier.declare_data_property(property.as_ref());
            }
        }
    }
}

/// `(a, rdf:type, C)` with `C` not a reserved non-class term declares `a` an individual and `C` a class.
fn class_assertions<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for triple in statements(classifier.store(), rdf::TYPE) {
        match triple.object.as_ref() {
            TermRef::NamedNode(class)
                if classifier.builtins().is_reserved_non_class(class)
                    || Category::from_iri(class).is_some()
                    || GARBAGE_CATEGORIES.contains(&class) =>
            {
                continue;
            }
            TermRef::Literal(_) => continue,
            _ => (),
        }
        classifier.declare_individual(triple.subject.as_ref().into());
        classifier.declare_class(triple.object.as_ref());
    }
}

fn swrl_atoms<S: TripleStore + ?Sized>(classifier: &mut Classifier<'_, S>) {
    for atom in instances(classifier.store(), swrl::CLASS_ATOM) {
        for class in objects_of(classifier.store(), &atom, swrl::CLASS_PREDICATE) {
            classifier.declare_class(class.as_ref());
        }
        swrl_arguments(classifier, &atom, &[swrl::ARGUMENT_1]);
    }
    for atom in instances(classifier.store(), swrl::INDIVIDUAL_PROPERTY_ATOM) {
        for property in objects_of(classifier.store(), &atom, swrl::PROPERTY_PREDICATE) {
            classifier.declare_object_property(property.as_ref());
        }
        swrl_arguments(classifier, &atom, &[swrl::ARGUMENT_1, swrl::ARGUMENT_2]);
    }
    for atom in instances(classifier.store(), swrl::DATAVALUED_PROPERTY_ATOM) {
        for property in objects_of(classifier.store(), &atom, swrl::PROPERTY_PREDICATE) {
            classifier.declare_data_property(property.as_ref());
        }
        swrl_arguments(classifier, &atom, &[swrl::ARGUMENT_1]);
    }
    for atom in instances(classifier.store(), swrl::DATA_RANGE_ATOM) {
        for range in objects_of(classifier.store(), &atom, swrl::DATA_RANGE) {
            classifier.declare_datatype(range.as_ref());
        }
    }
    for kind in [swrl::SAME_INDIVIDUAL_ATOM, swrl::DIFFERENT_INDIVIDUALS_ATOM] {
        for atom in instances(classifier.store(), kind) {
            swrl_arguments(classifier, &atom, &[swrl::ARGUMENT_1, swrl::ARGUMENT_2]);
        }
    }
}

/// Declares the atom arguments individuals, except the rule variables.
fn swrl_arguments<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    atom: &Term,
    predicates: &[NamedNodeRef<'_>],
) {
    for predicate in predicates {
        for argument in objects_of(classifier.store(), atom, *predicate) {
            if !classifier.has_type(argument.as_ref(), swrl::VARIABLE) {
                classifier.declare_individual(argument.as_ref());
            }
        }
    }
}

fn objects_of<S: TripleStore + ?Sized>(
    store: &S,
    node: &Term,
    predicate: NamedNodeRef<'_>,
) -> Vec<Term> {
    as_subject(node).map_or_else(Vec::new, |node| store.objects(node, predicate))
}

fn as_subject(term: &Term) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        Term::Literal(_) => None,
    }
}

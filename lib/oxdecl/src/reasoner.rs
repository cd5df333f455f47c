//! The reasoner phase: declaration rules that need both ends of a statement classified.
//!
//! A rule answers [`Outcome::Unknown`] when the graph does not yet tell which declarations to add.
//! Those statements are kept in a work list and evaluated again once the other rules
//! have added more declarations, until the list is empty or stops shrinking.

use crate::category::{Category, Node};
use crate::classifier::Classifier;
use crate::manifest::{statements, statements_typed};
use crate::store::{TripleStore, read_list, sort_triples};
use crate::vocab::owl;
use oxrdf::vocab::rdfs;
use oxrdf::{Term, TermRef, Triple, TripleRef};
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::{debug, warn};

/// The rule a pending statement is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// `owl:someValuesFrom` and `owl:allValuesFrom`
    ValuesFrom,
    /// `owl:equivalentClass`
    EquivalentClass,
    /// `owl:unionOf` and `owl:intersectionOf`
    BooleanClass,
    /// `owl:equivalentProperty` and `owl:propertyDisjointWith`
    PropertyPair,
    /// `(x, rdf:type, owl:AllDisjointProperties)`
    AllDisjointProperties,
    /// `rdfs:subPropertyOf`
    SubPropertyOf,
    /// `rdfs:domain` and `rdfs:range`
    DomainRange,
    /// Any statement whose predicate is not reserved
    PropertyAssertion,
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ValuesFrom => "values from",
            Self::EquivalentClass => "equivalent class",
            Self::BooleanClass => "boolean class",
            Self::PropertyPair => "property pair",
            Self::AllDisjointProperties => "all disjoint properties",
            Self::SubPropertyOf => "sub property",
            Self::DomainRange => "domain and range",
            Self::PropertyAssertion => "property assertion",
        })
    }
}

/// Result of a rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The statement is resolved, the declarations have been added.
    True,
    /// The statement can not be resolved by this rule (malformed or contradicting the graph).
    False,
    /// Not enough evidence yet.
    Unknown,
}

/// A statement waiting for more evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub triple: Triple,
    pub rule: RuleId,
}

/// What [`Reasoner::run`] leaves behind.
#[derive(Debug, Clone, Default)]
pub struct ReasonerOutcome {
    /// Statements still unknown when the loop stopped, in evaluation order.
    pub unresolved: Vec<Pending>,
    /// Number of evaluation rounds, the first full pass included.
    pub rounds: usize,
}

/// The fixed point loop over the reasoner rules.
#[derive(Debug, Clone, Copy)]
pub struct Reasoner {
    max_rounds: usize,
    prefer_annotations: bool,
}

impl Reasoner {
    /// `max_rounds` bounds the number of rounds, the first full pass included.
    /// With `prefer_annotations`, unclear properties default to annotation properties
    /// once a round has made no progress.
    pub fn new(max_rounds: usize, prefer_annotations: bool) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
            prefer_annotations,
        }
    }

    pub fn run<S: TripleStore + ?Sized>(
        &self,
        classifier: &mut Classifier<'_, S>,
    ) -> ReasonerOutcome {
        let candidates = candidates(classifier);
        let keys = key_properties(classifier.store());
        debug!("reasoner phase evaluates {} statements", candidates.len());
        let mut pending = evaluate_all(classifier, candidates, false, &keys);
        let mut rounds = 1;
        let mut policy = false;
        loop {
            if pending.is_empty() {
                debug!("reasoner phase reached a fixed point after {rounds} rounds");
                break;
            }
            if rounds >= self.max_rounds {
                warn!(
                    "giving up after {rounds} rounds with {} unresolved statements",
                    pending.len()
                );
                break;
            }
            rounds += 1;
            let before = pending.len();
            pending = evaluate_all(classifier, pending, policy, &keys);
            debug!(
                "round {rounds}: {} pending statements, annotation default {}",
                pending.len(),
                if policy { "on" } else { "off" }
            );
            if pending.len() == before {
                if self.prefer_annotations && !policy {
                    policy = true;
                    continue;
                }
                warn!(
                    "no progress in round {rounds}, {} statements are left unresolved",
                    pending.len()
                );
                break;
            }
        }
        for statement in &pending {
            debug!("unresolved {} statement: {}", statement.rule, statement.triple);
        }
        ReasonerOutcome {
            unresolved: pending,
            rounds,
        }
    }
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new(10, true)
    }
}

/// Drains the work list and keeps the statements that are still unknown.
fn evaluate_all<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    pending: Vec<Pending>,
    policy: bool,
    keys: &FxHashSet<String>,
) -> Vec<Pending> {
    pending
        .into_iter()
        .filter(|p| evaluate_with_keys(classifier, p, policy, keys) == Outcome::Unknown)
        .collect()
}

/// Evaluates a statement against its rule.
pub fn evaluate<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    pending: &Pending,
    policy: bool,
) -> Outcome {
    let keys = key_properties(classifier.store());
    evaluate_with_keys(classifier, pending, policy, &keys)
}

fn evaluate_with_keys<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    pending: &Pending,
    policy: bool,
    keys: &FxHashSet<String>,
) -> Outcome {
    let triple = pending.triple.as_ref();
    match pending.rule {
        RuleId::ValuesFrom => values_from(classifier, triple),
        RuleId::EquivalentClass => equivalent_class(classifier, triple),
        RuleId::BooleanClass => boolean_class(classifier, triple),
        RuleId::PropertyPair => property_group(classifier, &[triple.subject.into(), triple.object]),
        RuleId::AllDisjointProperties => all_disjoint_properties(classifier, triple),
        RuleId::SubPropertyOf => sub_property_of(classifier, triple, policy),
        RuleId::DomainRange => domain_range(classifier, triple, policy),
        RuleId::PropertyAssertion => property_assertion(classifier, triple, policy, keys),
    }
}

/// All the statements the reasoner rules apply to, in rule order then N-Triples order.
fn candidates<S: TripleStore + ?Sized>(classifier: &Classifier<'_, S>) -> Vec<Pending> {
    let store = classifier.store();
    let builtins = classifier.builtins();
    let mut candidates = Vec::new();
    let mut push = |triples: Vec<Triple>, rule| {
        candidates.extend(triples.into_iter().map(|triple| Pending { triple, rule }));
    };
    push(statements(store, owl::SOME_VALUES_FROM), RuleId::ValuesFrom);
    push(statements(store, owl::ALL_VALUES_FROM), RuleId::ValuesFrom);
    push(statements(store, owl::EQUIVALENT_CLASS), RuleId::EquivalentClass);
    push(statements(store, owl::UNION_OF), RuleId::BooleanClass);
    push(statements(store, owl::INTERSECTION_OF), RuleId::BooleanClass);
    push(statements(store, owl::EQUIVALENT_PROPERTY), RuleId::PropertyPair);
    push(statements(store, owl::PROPERTY_DISJOINT_WITH), RuleId::PropertyPair);
    push(
        statements_typed(store, owl::ALL_DISJOINT_PROPERTIES),
        RuleId::AllDisjointProperties,
    );
    push(statements(store, rdfs::SUB_PROPERTY_OF), RuleId::SubPropertyOf);
    push(statements(store, rdfs::DOMAIN), RuleId::DomainRange);
    push(statements(store, rdfs::RANGE), RuleId::DomainRange);
    let mut assertions: Vec<Triple> = store
        .find(None, None, None)
        .into_iter()
        .filter(|t| !builtins.is_reserved(t.predicate.as_ref()))
        .collect();
    sort_triples(&mut assertions);
    push(assertions, RuleId::PropertyAssertion);
    candidates
}

fn values_from<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
) -> Outcome {
    let properties = classifier.store().objects(triple.subject, owl::ON_PROPERTY);
    if properties.is_empty() {
        return Outcome::False;
    }
    classifier.declare_restriction(triple.subject.into());
    let value = triple.object;
    if properties
        .iter()
        .any(|p| classifier.is_data_property(p.as_ref()))
        || classifier.is_data_range(value)
    {
        for property in &properties {
            classifier.declare_data_property(property.as_ref());
        }
        classifier.declare_datatype(value);
        Outcome::True
    } else if properties
        .iter()
        .any(|p| classifier.is_object_property_expression(p.as_ref()))
        || classifier.is_class_expression(value)
    {
        for property in &properties {
            classifier.declare_object_property(property.as_ref());
        }
        classifier.declare_class(value);
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

fn equivalent_class<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
) -> Outcome {
    let (left, right) = (triple.subject.into(), triple.object);
    if classifier.is_data_range(left) || classifier.is_data_range(right) {
        classifier.declare_datatype(left);
        classifier.declare_datatype(right);
        Outcome::True
    } else if classifier.is_class_expression(left) || classifier.is_class_expression(right) {
        classifier.declare_class(left);
        classifier.declare_class(right);
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

/// `owl:unionOf`/`owl:intersectionOf` are shared by class expressions and data ranges.
fn boolean_class<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
) -> Outcome {
    let Some(members) = read_list(classifier.store(), triple.object) else {
        return Outcome::False;
    };
    let node = triple.subject.into();
    if classifier.is_declared(node, Category::Datatype)
        || members.iter().any(|m| classifier.is_data_range(m.as_ref()))
    {
        classifier.declare_datatype(node);
        for member in &members {
            classifier.declare_datatype(member.as_ref());
        }
        Outcome::True
    } else if classifier.is_declared(node, Category::Class)
        || members.iter().any(|m| classifier.is_class_expression(m.as_ref()))
    {
        classifier.declare_class(node);
        for member in &members {
            classifier.declare_class(member.as_ref());
        }
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

/// Properties that must all be of the same kind.
fn property_group<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    properties: &[TermRef<'_>],
) -> Outcome {
    if properties
        .iter()
        .any(|p| classifier.is_object_property_expression(*p))
    {
        for property in properties {
            classifier.declare_object_property(*property);
        }
        Outcome::True
    } else if properties.iter().any(|p| classifier.is_data_property(*p)) {
        for property in properties {
            classifier.declare_data_property(*property);
        }
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

fn all_disjoint_properties<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
) -> Outcome {
    let lists = classifier.store().objects(triple.subject, owl::MEMBERS);
    let [list] = lists.as_slice() else {
        return Outcome::False;
    };
    let Some(members) = read_list(classifier.store(), list.as_ref()) else {
        return Outcome::False;
    };
    let members: Vec<TermRef<'_>> = members.iter().map(Term::as_ref).collect();
    property_group(classifier, &members)
}

fn sub_property_of<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
    policy: bool,
) -> Outcome {
    let (sub, sup) = (triple.subject.into(), triple.object);
    match property_group(classifier, &[sub, sup]) {
        Outcome::Unknown => (),
        outcome => return outcome,
    }
    if policy
        || classifier.is_annotation_property(sub)
        || classifier.is_annotation_property(sup)
    {
        classifier.declare_annotation_property(sub);
        classifier.declare_annotation_property(sup);
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

fn domain_range<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
    policy: bool,
) -> Outcome {
    let property = triple.subject.into();
    let target = triple.object;
    let is_range = triple.predicate == rdfs::RANGE;
    match Node::of(target) {
        Node::Literal(_) => return Outcome::False,
        Node::Uri(_) if classifier.is_annotation_property(property) => return Outcome::True,
        _ => (),
    }
    if classifier.is_object_property_expression(property) {
        classifier.declare_class(target);
        return Outcome::True;
    }
    if classifier.is_data_property(property) {
        if is_range {
            classifier.declare_datatype(target);
        } else {
            classifier.declare_class(target);
        }
        return Outcome::True;
    }
    if is_range && matches!(Node::of(target), Node::Anonymous(_)) {
        if classifier.is_data_range(target) {
            classifier.declare_data_property(property);
            classifier.declare_datatype(target);
            return Outcome::True;
        }
        if classifier.is_class_expression(target) {
            classifier.declare_object_property(property);
            classifier.declare_class(target);
            return Outcome::True;
        }
    }
    if policy {
        classifier.declare_annotation_property(property);
        Outcome::True
    } else {
        Outcome::Unknown
    }
}

/// `(s, p, o)` with `p` not reserved: reads `p` as a data, object or annotation property.
fn property_assertion<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    triple: TripleRef<'_>,
    policy: bool,
    keys: &FxHashSet<String>,
) -> Outcome {
    let property = triple.predicate.into();
    if classifier.is_annotation_property(property) {
        return Outcome::True;
    }
    let subject = triple.subject.into();
    let object = triple.object;
    let functional_or_key = classifier.has_type(property, owl::FUNCTIONAL_PROPERTY)
        || keys.contains(triple.predicate.as_str());
    match Node::of(object) {
        Node::Literal(_) => {
            if classifier.is_data_property(property) {
                declare_subject(classifier, subject);
                Outcome::True
            } else if classifier.is_object_property_expression(property) {
                Outcome::False
            } else if functional_or_key {
                classifier.declare_data_property(property);
                declare_subject(classifier, subject);
                Outcome::True
            } else if policy {
                classifier.declare_annotation_property(property);
                Outcome::True
            } else {
                Outcome::Unknown
            }
        }
        node => {
            if classifier.is_object_property_expression(property) {
                declare_subject(classifier, subject);
                classifier.declare_individual(object);
                Outcome::True
            } else if classifier.is_data_property(property) {
                Outcome::False
            } else if functional_or_key && classifier.looks_like_individual(object) {
                classifier.declare_object_property(property);
                declare_subject(classifier, subject);
                classifier.declare_individual(object);
                Outcome::True
            } else if !policy {
                Outcome::Unknown
            } else if matches!(node, Node::Uri(_)) {
                classifier.declare_annotation_property(property);
                Outcome::True
            } else if classifier.looks_like_individual(object) {
                classifier.declare_object_property(property);
                declare_subject(classifier, subject);
                classifier.declare_individual(object);
                Outcome::True
            } else {
                Outcome::Unknown
            }
        }
    }
}

/// Axiom, annotation and ontology nodes are never individuals.
fn declare_subject<S: TripleStore + ?Sized>(
    classifier: &mut Classifier<'_, S>,
    subject: TermRef<'_>,
) {
    if [owl::AXIOM, owl::ANNOTATION, owl::ONTOLOGY]
        .into_iter()
        .any(|class| classifier.has_type(subject, class))
    {
        return;
    }
    classifier.declare_individual(subject);
}

/// The properties of the `owl:hasKey` lists.
///
/// The engine only adds `rdf:type` triples, so the keys do not change while it runs.
fn key_properties<S: TripleStore + ?Sized>(store: &S) -> FxHashSet<String> {
    store
        .find(None, Some(owl::HAS_KEY), None)
        .into_iter()
        .filter_map(|t| read_list(store, t.object.as_ref()))
        .flatten()
        .filter_map(|key| match key {
            Term::NamedNode(key) => Some(key.into_string()),
            _ => None,
        })
        .collect()
}

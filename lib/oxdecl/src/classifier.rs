use crate::builtins::BuiltIns;
use crate::category::{Category, Node};
use crate::store::{TripleStore, is_list_node, read_list};
use crate::vocab::owl;
use oxrdf::vocab::rdf;
use oxrdf::{NamedNodeRef, NamedOrBlankNodeRef, Term, TermRef, TripleRef};

const CLASS_EXPRESSION_MARKERS: [NamedNodeRef<'static>; 3] =
    [owl::COMPLEMENT_OF, owl::ON_PROPERTY, owl::ON_PROPERTIES];

/// Shared by class expressions and data ranges.
const BOOLEAN_MARKERS: [NamedNodeRef<'static>; 3] =
    [owl::UNION_OF, owl::INTERSECTION_OF, owl::ONE_OF];

const DATA_RANGE_MARKERS: [NamedNodeRef<'static>; 3] = [
    owl::DATATYPE_COMPLEMENT_OF,
    owl::ON_DATATYPE,
    owl::WITH_RESTRICTIONS,
];

const RESTRICTION_MARKERS: [NamedNodeRef<'static>; 2] = [owl::ON_PROPERTY, owl::ON_PROPERTIES];

/// Answers what a node already is and writes declaration triples.
///
/// The answers only use the reserved vocabulary, the declaration triples already in the store
/// and local structural markers (e.g. a node with an `owl:onProperty` is a restriction).
/// Declarations are written immediately so they are visible to the next questions.
pub struct Classifier<'a, S: TripleStore + ?Sized> {
    store: &'a mut S,
    builtins: &'a BuiltIns,
    added: usize,
    retracted: usize,
}

impl<'a, S: TripleStore + ?Sized> Classifier<'a, S> {
    pub fn new(store: &'a mut S, builtins: &'a BuiltIns) -> Self {
        Self {
            store,
            builtins,
            added: 0,
            retracted: 0,
        }
    }

    #[inline]
    pub fn store(&self) -> &S {
        self.store
    }

    #[inline]
    pub fn builtins(&self) -> &BuiltIns {
        self.builtins
    }

    /// Number of declaration triples added through this classifier.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Number of declaration triples removed through this classifier.
    pub fn retracted(&self) -> usize {
        self.retracted
    }

    /// Is there a `(node, rdf:type, category)` triple.
    pub fn is_declared(&self, node: TermRef<'_>, category: Category) -> bool {
        self.has_type(node, category.iri())
    }

    /// Is there a `(node, rdf:type, class)` triple.
    pub fn has_type(&self, node: TermRef<'_>, class: NamedNodeRef<'_>) -> bool {
        Node::of(node).as_resource().is_some_and(|subject| {
            self.store
                .contains(TripleRef::new(subject, rdf::TYPE, class))
        })
    }

    fn has_any(&self, node: TermRef<'_>, predicates: &[NamedNodeRef<'_>]) -> bool {
        Node::of(node)
            .as_resource()
            .is_some_and(|subject| predicates.iter().any(|p| self.store.has(subject, *p)))
    }

    fn builtin_category(&self, node: TermRef<'_>) -> Option<Category> {
        match node {
            TermRef::NamedNode(node) => self.builtins.category(node),
            _ => None,
        }
    }

    /// `owl:unionOf`, `owl:intersectionOf` and `owl:oneOf` only count on nodes
    /// that do not read as data ranges.
    pub fn is_class_expression(&self, node: TermRef<'_>) -> bool {
        self.builtin_category(node) == Some(Category::Class)
            || self.is_declared(node, Category::Class)
            || self.is_declared(node, Category::Restriction)
            || self.has_any(node, &CLASS_EXPRESSION_MARKERS)
            || (self.has_any(node, &BOOLEAN_MARKERS) && !self.is_data_range(node))
    }

    pub fn is_data_range(&self, node: TermRef<'_>) -> bool {
        self.reads_as_datatype(node) || self.is_data_boolean(node)
    }

    fn reads_as_datatype(&self, node: TermRef<'_>) -> bool {
        self.builtin_category(node) == Some(Category::Datatype)
            || self.is_declared(node, Category::Datatype)
            || self.has_type(node, owl::DATA_RANGE)
            || self.has_any(node, &DATA_RANGE_MARKERS)
    }

    /// A union or intersection with a datatype member, or an enumeration of literals.
    ///
    /// Members are only looked at one level deep.
    fn is_data_boolean(&self, node: TermRef<'_>) -> bool {
        let Some(subject) = Node::of(node).as_resource() else {
            return false;
        };
        let lists = |predicate: NamedNodeRef<'static>| {
            self.store
                .objects(subject, predicate)
                .into_iter()
                .filter_map(move |list| read_list(&*self.store, list.as_ref()))
        };
        lists(owl::UNION_OF)
            .chain(lists(owl::INTERSECTION_OF))
            .any(|members| members.iter().any(|m| self.reads_as_datatype(m.as_ref())))
            || lists(owl::ONE_OF).any(|members| {
                !members.is_empty() && members.iter().all(|m| matches!(m, Term::Literal(_)))
            })
    }

    pub fn is_object_property_expression(&self, node: TermRef<'_>) -> bool {
        self.builtin_category(node) == Some(Category::ObjectProperty)
            || self.is_declared(node, Category::ObjectProperty)
            || self.has_any(node, &[owl::INVERSE_OF])
    }

    pub fn is_data_property(&self, node: TermRef<'_>) -> bool {
        self.builtin_category(node) == Some(Category::DataProperty)
            || self.is_declared(node, Category::DataProperty)
    }

    pub fn is_annotation_property(&self, node: TermRef<'_>) -> bool {
        self.builtin_category(node) == Some(Category::AnnotationProperty)
            || self.is_declared(node, Category::AnnotationProperty)
    }

    pub fn is_individual(&self, node: TermRef<'_>) -> bool {
        self.is_declared(node, Category::NamedIndividual)
            || self.is_declared(node, Category::AnonymousIndividual)
    }

    /// Declared `owl:Restriction` or carrying `owl:onProperty`/`owl:onProperties`.
    pub fn is_restriction(&self, node: TermRef<'_>) -> bool {
        self.is_declared(node, Category::Restriction) || self.has_any(node, &RESTRICTION_MARKERS)
    }

    /// Any named or anonymous resource that is neither a collection node nor reserved.
    pub fn looks_like_individual(&self, node: TermRef<'_>) -> bool {
        match Node::of(node) {
            Node::Uri(uri) => !self.builtins.is_reserved(uri) && !is_list_node(&*self.store, node),
            Node::Anonymous(_) => !is_list_node(&*self.store, node),
            Node::Literal(_) => false,
        }
    }

    /// Adds the `(node, rdf:type, category)` declaration.
    ///
    /// Literals and reserved resources are never declared.
    /// Anonymous nodes can not be properties: such a declaration is retracted instead of added.
    /// An anonymous individual gets the temporary anonymous individual marker.
    ///
    /// Returns `true` if a triple has been added.
    pub fn declare(&mut self, node: TermRef<'_>, category: Category) -> bool {
        let (subject, category) = match Node::of(node) {
            Node::Literal(_) => return false,
            Node::Uri(uri) if self.builtins.is_reserved(uri) => return false,
            Node::Uri(uri) => (
                NamedOrBlankNodeRef::from(uri),
                if category == Category::AnonymousIndividual {
                    Category::NamedIndividual
                } else {
                    category
                },
            ),
            Node::Anonymous(blank) if category.is_property() => {
                self.retract(blank.into(), category.iri());
                return false;
            }
            Node::Anonymous(blank)
                if matches!(
                    category,
                    Category::NamedIndividual | Category::AnonymousIndividual
                ) =>
            {
                self.retract(blank.into(), owl::NAMED_INDIVIDUAL);
                (blank.into(), Category::AnonymousIndividual)
            }
            Node::Anonymous(blank) => (blank.into(), category),
        };
        let inserted = self
            .store
            .insert(TripleRef::new(subject, rdf::TYPE, category.iri()));
        if inserted {
            self.added += 1;
        }
        inserted
    }

    /// Removes the `(subject, rdf:type, class)` triple if present.
    pub fn retract(&mut self, subject: NamedOrBlankNodeRef<'_>, class: NamedNodeRef<'_>) -> bool {
        let removed = self
            .store
            .remove(TripleRef::new(subject, rdf::TYPE, class));
        if removed {
            self.retracted += 1;
        }
        removed
    }

    /// Declares a class, except for restriction nodes that keep their more specific typing.
    pub fn declare_class(&mut self, node: TermRef<'_>) -> bool {
        if self.is_restriction(node) {
            return false;
        }
        self.declare(node, Category::Class)
    }

    pub fn declare_datatype(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::Datatype)
    }

    pub fn declare_object_property(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::ObjectProperty)
    }

    pub fn declare_data_property(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::DataProperty)
    }

    pub fn declare_annotation_property(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::AnnotationProperty)
    }

    /// `owl:NamedIndividual` for IRIs, the anonymous individual marker for blank nodes.
    pub fn declare_individual(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::NamedIndividual)
    }

    pub fn declare_restriction(&mut self, node: TermRef<'_>) -> bool {
        self.declare(node, Category::Restriction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;
    use oxrdf::vocab::{rdfs, xsd};
    use oxrdf::{BlankNode, Graph, Literal, NamedNode, Triple};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn declare_named_resources() {
        let builtins = BuiltIns::owl2();
        let mut graph = Graph::new();
        let mut classifier = Classifier::new(&mut graph, &builtins);
        assert!(classifier.declare_class(ex("A").as_ref().into()));
        assert!(!classifier.declare_class(ex("A").as_ref().into()));
        assert!(classifier.declare_individual(ex("a").as_ref().into()));
        assert!(classifier.is_class_expression(ex("A").as_ref().into()));
        assert!(classifier.is_individual(ex("a").as_ref().into()));
        assert_eq!(classifier.added(), 2);
        assert!(graph.contains(&Triple::new(ex("a"), rdf::TYPE, owl::NAMED_INDIVIDUAL)));
    }

    #[test]
    fn reserved_and_literals_are_never_declared() {
        let builtins = BuiltIns::owl2();
        let mut graph = Graph::new();
        let mut classifier = Classifier::new(&mut graph, &builtins);
        assert!(!classifier.declare_class(owl::THING.into()));
        assert!(!classifier.declare_object_property(owl::ON_PROPERTY.into()));
        assert!(!classifier.declare_individual(Literal::new_simple_literal("a").as_ref().into()));
        assert!(graph.is_empty());
    }

    #[test]
    fn anonymous_properties_are_retracted() {
        let builtins = BuiltIns::owl2();
        let blank = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(blank.clone(), rdf::TYPE, owl::OBJECT_PROPERTY));
        let mut classifier = Classifier::new(&mut graph, &builtins);
        assert!(!classifier.declare_object_property(blank.as_ref().into()));
        assert_eq!(classifier.retracted(), 1);
        assert!(graph.is_empty());
    }

    #[test]
    fn anonymous_individuals_get_the_marker() {
        let builtins = BuiltIns::owl2();
        let blank = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(blank.clone(), rdf::TYPE, owl::NAMED_INDIVIDUAL));
        let mut classifier = Classifier::new(&mut graph, &builtins);
        assert!(classifier.declare_individual(blank.as_ref().into()));
        assert!(classifier.is_individual(blank.as_ref().into()));
        assert!(graph.contains(&Triple::new(
            blank.clone(),
            rdf::TYPE,
            vocab::ANONYMOUS_INDIVIDUAL
        )));
        assert!(!graph.contains(&Triple::new(blank, rdf::TYPE, owl::NAMED_INDIVIDUAL)));
    }

    #[test]
    fn restrictions_keep_their_typing() {
        let builtins = BuiltIns::owl2();
        let blank = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(blank.clone(), owl::ON_PROPERTY, ex("p")));
        let mut classifier = Classifier::new(&mut graph, &builtins);
        assert!(classifier.is_restriction(blank.as_ref().into()));
        assert!(classifier.is_class_expression(blank.as_ref().into()));
        assert!(!classifier.declare_class(blank.as_ref().into()));
        assert!(classifier.declare_restriction(blank.as_ref().into()));
    }

    #[test]
    fn structural_markers() {
        let builtins = BuiltIns::owl2();
        let inverse = BlankNode::default();
        let complement = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(inverse.clone(), owl::INVERSE_OF, ex("p")));
        graph.insert(&Triple::new(
            complement.clone(),
            owl::DATATYPE_COMPLEMENT_OF,
            xsd::STRING,
        ));
        let classifier = Classifier::new(&mut graph, &builtins);
        assert!(classifier.is_object_property_expression(inverse.as_ref().into()));
        assert!(!classifier.is_data_property(inverse.as_ref().into()));
        assert!(classifier.is_data_range(complement.as_ref().into()));
        assert!(classifier.is_data_range(xsd::INTEGER.into()));
        assert!(!classifier.is_class_expression(complement.as_ref().into()));
    }

    #[test]
    fn data_unions_are_not_class_expressions() {
        let builtins = BuiltIns::owl2();
        let typed = BlankNode::default();
        let untyped = BlankNode::default();
        let classes = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(typed.clone(), rdf::TYPE, rdfs::DATATYPE));
        graph.insert(&Triple::new(typed.clone(), owl::UNION_OF, rdf::NIL));
        let cell = BlankNode::default();
        graph.insert(&Triple::new(cell.clone(), rdf::FIRST, xsd::INTEGER));
        graph.insert(&Triple::new(cell.clone(), rdf::REST, rdf::NIL));
        graph.insert(&Triple::new(untyped.clone(), owl::INTERSECTION_OF, cell));
        let cell = BlankNode::default();
        graph.insert(&Triple::new(cell.clone(), rdf::FIRST, ex("A")));
        graph.insert(&Triple::new(cell.clone(), rdf::REST, rdf::NIL));
        graph.insert(&Triple::new(classes.clone(), owl::UNION_OF, cell));
        let classifier = Classifier::new(&mut graph, &builtins);
        for node in [&typed, &untyped] {
            assert!(classifier.is_data_range(node.as_ref().into()));
            assert!(!classifier.is_class_expression(node.as_ref().into()));
        }
        assert!(classifier.is_class_expression(classes.as_ref().into()));
        assert!(!classifier.is_data_range(classes.as_ref().into()));
    }

    #[test]
    fn looks_like_individual() {
        let builtins = BuiltIns::owl2();
        let cell = BlankNode::default();
        let mut graph = Graph::new();
        graph.insert(&Triple::new(cell.clone(), rdf::FIRST, ex("a")));
        graph.insert(&Triple::new(cell.clone(), rdf::REST, rdf::NIL));
        let classifier = Classifier::new(&mut graph, &builtins);
        assert!(classifier.looks_like_individual(ex("a").as_ref().into()));
        assert!(classifier.looks_like_individual(BlankNode::default().as_ref().into()));
        assert!(!classifier.looks_like_individual(cell.as_ref().into()));
        assert!(!classifier.looks_like_individual(owl::THING.into()));
        assert!(!classifier.looks_like_individual(
            Literal::new_simple_literal("a").as_ref().into()
        ));
    }
}

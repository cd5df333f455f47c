//! The mutable triple store the engine reads from and writes declarations to.

use oxrdf::vocab::rdf;
use oxrdf::{
    Graph, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef, Triple, TripleRef,
};
use rustc_hash::FxHashSet;

/// A mutable set of triples with pattern lookup.
///
/// The engine is the only writer while it runs: triples inserted by a rule are visible to the lookups
/// of the next rules.
pub trait TripleStore {
    /// Returns the triples matching the pattern, `None` being a wildcard.
    fn find(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Vec<Triple>;

    fn contains(&self, triple: TripleRef<'_>) -> bool;

    /// Adds a triple, returns `true` if it was not already present.
    fn insert(&mut self, triple: TripleRef<'_>) -> bool;

    /// Removes a triple, returns `true` if it was present.
    fn remove(&mut self, triple: TripleRef<'_>) -> bool;

    /// The objects of the `(subject, predicate, ?)` triples.
    fn objects(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Vec<Term> {
        self.find(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| t.object)
            .collect()
    }

    /// The subjects of the `(?, predicate, object)` triples.
    fn subjects(
        &self,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> Vec<NamedOrBlankNode> {
        self.find(None, Some(predicate), Some(object))
            .into_iter()
            .map(|t| t.subject)
            .collect()
    }

    /// Is there a `(subject, predicate, ?)` triple.
    fn has(&self, subject: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> bool {
        !self.find(Some(subject), Some(predicate), None).is_empty()
    }
}

impl TripleStore for Graph {
    fn find(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Vec<Triple> {
        let matches = |t: &TripleRef<'_>| {
            subject.is_none_or(|s| t.subject == s)
                && predicate.is_none_or(|p| t.predicate == p)
                && object.is_none_or(|o| t.object == o)
        };
        if let Some(subject) = subject {
            self.triples_for_subject(subject)
                .filter(matches)
                .map(TripleRef::into_owned)
                .collect()
        } else if let Some(object) = object {
            self.triples_for_object(object)
                .filter(matches)
                .map(TripleRef::into_owned)
                .collect()
        } else if let Some(predicate) = predicate {
            self.triples_for_predicate(predicate)
                .map(TripleRef::into_owned)
                .collect()
        } else {
            self.iter().map(TripleRef::into_owned).collect()
        }
    }

    fn contains(&self, triple: TripleRef<'_>) -> bool {
        Graph::contains(self, triple)
    }

    fn insert(&mut self, triple: TripleRef<'_>) -> bool {
        Graph::insert(self, triple)
    }

    fn remove(&mut self, triple: TripleRef<'_>) -> bool {
        Graph::remove(self, triple)
    }
}

/// Reads the members of a well-formed RDF collection.
///
/// Returns `None` if `head` is not a list: a literal, a node without exactly one `rdf:first`
/// and one `rdf:rest`, or a cycle.
pub fn read_list<S: TripleStore + ?Sized>(store: &S, head: TermRef<'_>) -> Option<Vec<Term>> {
    let mut members = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = head.into_owned();
    loop {
        let node = match &current {
            Term::NamedNode(node) if node.as_ref() == rdf::NIL => return Some(members),
            Term::NamedNode(node) => NamedOrBlankNode::from(node.clone()),
            Term::BlankNode(node) => NamedOrBlankNode::from(node.clone()),
            Term::Literal(_) => return None,
        };
        if !visited.insert(node.clone()) {
            return None;
        }
        let [first] = <[Term; 1]>::try_from(store.objects(node.as_ref(), rdf::FIRST)).ok()?;
        let [rest] = <[Term; 1]>::try_from(store.objects(node.as_ref(), rdf::REST)).ok()?;
        members.push(first);
        current = rest;
    }
}

/// Is the node the head or a cell of a RDF collection.
pub fn is_list_node<S: TripleStore + ?Sized>(store: &S, node: TermRef<'_>) -> bool {
    match node {
        TermRef::NamedNode(node) if node == rdf::NIL => true,
        TermRef::NamedNode(node) => store.has(node.into(), rdf::FIRST),
        TermRef::BlankNode(node) => store.has(node.into(), rdf::FIRST),
        TermRef::Literal(_) => false,
    }
}

/// Sorts triples by their N-Triples serialization so rules see them in a reproducible order.
pub(crate) fn sort_triples(triples: &mut [Triple]) {
    triples.sort_by_cached_key(Triple::to_string);
}

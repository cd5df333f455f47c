use crate::vocab::{self, owl};
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{BlankNodeRef, LiteralRef, NamedNodeRef, NamedOrBlankNodeRef, TermRef};
use std::fmt;

/// The kind of declaration a resource can receive.
///
/// Each category is written to the graph as a `(resource, rdf:type, category)` triple,
/// the category being the IRI returned by [`Category::iri`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// `owl:Class`
    Class,
    /// `rdfs:Datatype`
    Datatype,
    /// `owl:ObjectProperty`
    ObjectProperty,
    /// `owl:DatatypeProperty`
    DataProperty,
    /// `owl:AnnotationProperty`
    AnnotationProperty,
    /// `owl:NamedIndividual`
    NamedIndividual,
    /// Temporary marker for blank node individuals, removed when the engine finishes.
    AnonymousIndividual,
    /// `owl:Restriction`
    Restriction,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Class,
        Self::Datatype,
        Self::ObjectProperty,
        Self::DataProperty,
        Self::AnnotationProperty,
        Self::NamedIndividual,
        Self::AnonymousIndividual,
        Self::Restriction,
    ];

    /// The object of the declaration triples of this category.
    #[inline]
    pub fn iri(self) -> NamedNodeRef<'static> {
        match self {
            Self::Class => owl::CLASS,
            Self::Datatype => rdfs::DATATYPE,
            Self::ObjectProperty => owl::OBJECT_PROPERTY,
            Self::DataProperty => owl::DATATYPE_PROPERTY,
            Self::AnnotationProperty => owl::ANNOTATION_PROPERTY,
            Self::NamedIndividual => owl::NAMED_INDIVIDUAL,
            Self::AnonymousIndividual => vocab::ANONYMOUS_INDIVIDUAL,
            Self::Restriction => owl::RESTRICTION,
        }
    }

    /// Looks up the category declared by a `rdf:type` object.
    pub fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.iri() == iri)
    }

    /// Properties must be named: blank nodes never receive these categories.
    #[inline]
    pub fn is_property(self) -> bool {
        matches!(
            self,
            Self::ObjectProperty | Self::DataProperty | Self::AnnotationProperty
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iri().fmt(f)
    }
}

/// The generic typings left by RDFS or malformed input (`rdf:Property` and `rdfs:Class`).
///
/// They are dropped at the end of a run from resources that also carry a real [`Category`].
pub const GARBAGE_CATEGORIES: [NamedNodeRef<'static>; 2] = [rdf::PROPERTY, rdfs::CLASS];

/// A graph node, seen through the only distinction the declaration rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node<'a> {
    Uri(NamedNodeRef<'a>),
    Anonymous(BlankNodeRef<'a>),
    Literal(LiteralRef<'a>),
}

impl<'a> Node<'a> {
    #[inline]
    pub fn of(term: TermRef<'a>) -> Self {
        match term {
            TermRef::NamedNode(node) => Self::Uri(node),
            TermRef::BlankNode(node) => Self::Anonymous(node),
            TermRef::Literal(literal) => Self::Literal(literal),
        }
    }

    /// The node as a possible triple subject, `None` for literals.
    #[inline]
    pub fn as_resource(self) -> Option<NamedOrBlankNodeRef<'a>> {
        match self {
            Self::Uri(node) => Some(node.into()),
            Self::Anonymous(node) => Some(node.into()),
            Self::Literal(_) => None,
        }
    }
}

impl<'a> From<NamedOrBlankNodeRef<'a>> for Node<'a> {
    #[inline]
    fn from(node: NamedOrBlankNodeRef<'a>) -> Self {
        match node {
            NamedOrBlankNodeRef::NamedNode(node) => Self::Uri(node),
            NamedOrBlankNodeRef::BlankNode(node) => Self::Anonymous(node),
        }
    }
}

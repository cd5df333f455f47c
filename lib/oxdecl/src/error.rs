use oxrdf::{BlankNode, NamedNode, Term};

/// An error raised while extending [`BuiltIns`](crate::BuiltIns) from a vocabulary graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuiltInsError {
    /// Only IRIs can be reserved.
    #[error("The blank node {0} can not be a reserved vocabulary term")]
    BlankNodeTerm(BlankNode),
    /// The `rdf:type` object is not one of the declaration categories.
    #[error("{category} is not a declaration category, the reserved term {term} can not be typed with it")]
    UnknownCategory { term: NamedNode, category: Term },
}

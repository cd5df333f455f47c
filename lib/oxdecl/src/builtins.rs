use crate::category::Category;
use crate::error::BuiltInsError;
use crate::vocab::{self, facet, owl, swrl};
use oxrdf::vocab::{rdf, rdfs, xsd};
use oxrdf::{Graph, NamedNode, NamedNodeRef, NamedOrBlankNodeRef, TermRef};
use rustc_hash::FxHashMap;

/// The reserved vocabulary: resources whose category is fixed by the OWL 2, RDF, RDFS and XSD specifications.
///
/// A reserved resource is never declared by the engine, and a reserved predicate is never read
/// as a property assertion.
/// Each engine gets its own value, so vocabularies for different profiles can coexist:
/// ```
/// use oxdecl::{BuiltIns, Category};
/// use oxrdf::NamedNode;
///
/// let extra = NamedNode::new("http://example.com/Thing")?;
/// let builtins = BuiltIns::owl2().with_builtin(extra.clone(), Category::Class);
/// assert!(builtins.is_class(extra.as_ref()));
/// assert!(!BuiltIns::owl2().is_reserved(extra.as_ref()));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuiltIns {
    /// IRI -> built-in category, `None` for purely syntactic terms
    terms: FxHashMap<String, Option<Category>>,
}

impl BuiltIns {
    /// A vocabulary without any reserved term.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The OWL 2 DL reserved vocabulary, with the datatype facets and the SWRL syntax terms.
    pub fn owl2() -> Self {
        let mut builtins = Self::default();
        for class in [owl::THING, owl::NOTHING] {
            builtins.insert(class, Some(Category::Class));
        }
        for datatype in [
            rdfs::LITERAL,
            vocab::RDF_PLAIN_LITERAL,
            rdf::XML_LITERAL,
            rdf::LANG_STRING,
            owl::REAL,
            owl::RATIONAL,
            xsd::ANY_URI,
            xsd::BASE_64_BINARY,
            xsd::BOOLEAN,
            xsd::BYTE,
            xsd::DATE_TIME,
            xsd::DATE_TIME_STAMP,
            xsd::DECIMAL,
            xsd::DOUBLE,
            xsd::FLOAT,
            xsd::HEX_BINARY,
            xsd::INT,
            xsd::INTEGER,
            xsd::LANGUAGE,
            xsd::LONG,
            xsd::NAME,
            xsd::NC_NAME,
            xsd::NEGATIVE_INTEGER,
            xsd::NMTOKEN,
            xsd::NON_NEGATIVE_INTEGER,
            xsd::NON_POSITIVE_INTEGER,
            xsd::NORMALIZED_STRING,
            xsd::POSITIVE_INTEGER,
            xsd::SHORT,
            xsd::STRING,
            xsd::TOKEN,
            xsd::UNSIGNED_BYTE,
            xsd::UNSIGNED_INT,
            xsd::UNSIGNED_LONG,
            xsd::UNSIGNED_SHORT,
        ] {
            builtins.insert(datatype, Some(Category::Datatype));
        }
        for property in [owl::TOP_OBJECT_PROPERTY, owl::BOTTOM_OBJECT_PROPERTY] {
            builtins.insert(property, Some(Category::ObjectProperty));
        }
        for property in [owl::TOP_DATA_PROPERTY, owl::BOTTOM_DATA_PROPERTY] {
            builtins.insert(property, Some(Category::DataProperty));
        }
        for property in [
            rdfs::LABEL,
            rdfs::COMMENT,
            rdfs::SEE_ALSO,
            rdfs::IS_DEFINED_BY,
            owl::VERSION_INFO,
            owl::DEPRECATED,
            owl::BACKWARD_COMPATIBLE_WITH,
            owl::INCOMPATIBLE_WITH,
            owl::PRIOR_VERSION,
        ] {
            builtins.insert(property, Some(Category::AnnotationProperty));
        }
        for term in SYNTAX_TERMS.iter().chain(&facet::ALL) {
            builtins.insert(*term, None);
        }
        for category in Category::ALL {
            builtins.insert(category.iri(), None);
        }
        builtins
    }

    fn insert(&mut self, term: NamedNodeRef<'_>, category: Option<Category>) {
        self.terms.insert(term.as_str().into(), category);
    }

    /// Adds a built-in resource of the given category.
    #[must_use]
    pub fn with_builtin(mut self, term: impl Into<NamedNode>, category: Category) -> Self {
        let term: NamedNode = term.into();
        self.terms.insert(term.into_string(), Some(category));
        self
    }

    /// Adds a reserved term without category (a syntax term like `owl:onProperty`).
    #[must_use]
    pub fn with_reserved(mut self, term: impl Into<NamedNode>) -> Self {
        let term: NamedNode = term.into();
        self.terms.entry(term.into_string()).or_insert(None);
        self
    }

    /// Reads `(term, rdf:type, category)` triples from a vocabulary graph and adds each `term` as a built-in of `category`.
    ///
    /// Returns the number of terms added.
    pub fn extend_from_graph(&mut self, graph: &Graph) -> Result<usize, BuiltInsError> {
        let mut added = 0;
        for triple in graph.triples_for_predicate(rdf::TYPE) {
            let term = match triple.subject {
                NamedOrBlankNodeRef::NamedNode(term) => term,
                NamedOrBlankNodeRef::BlankNode(node) => {
                    return Err(BuiltInsError::BlankNodeTerm(node.into_owned()));
                }
            };
            let category = match triple.object {
                TermRef::NamedNode(iri) => Category::from_iri(iri)
                    .filter(|category| *category != Category::AnonymousIndividual),
                _ => None,
            };
            let Some(category) = category else {
                return Err(BuiltInsError::UnknownCategory {
                    term: term.into_owned(),
                    category: triple.object.into_owned(),
                });
            };
            if self.terms.insert(term.as_str().into(), Some(category)) != Some(Some(category)) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// The category of a built-in resource, `None` for syntax terms and non reserved resources.
    pub fn category(&self, term: NamedNodeRef<'_>) -> Option<Category> {
        self.terms.get(term.as_str()).copied().flatten()
    }

    /// Is the resource part of the reserved vocabulary, whatever its category.
    pub fn is_reserved(&self, term: NamedNodeRef<'_>) -> bool {
        self.terms.contains_key(term.as_str())
    }

    pub fn is_class(&self, term: NamedNodeRef<'_>) -> bool {
        self.category(term) == Some(Category::Class)
    }

    pub fn is_datatype(&self, term: NamedNodeRef<'_>) -> bool {
        self.category(term) == Some(Category::Datatype)
    }

    pub fn is_object_property(&self, term: NamedNodeRef<'_>) -> bool {
        self.category(term) == Some(Category::ObjectProperty)
    }

    pub fn is_data_property(&self, term: NamedNodeRef<'_>) -> bool {
        self.category(term) == Some(Category::DataProperty)
    }

    pub fn is_annotation_property(&self, term: NamedNodeRef<'_>) -> bool {
        self.category(term) == Some(Category::AnnotationProperty)
    }

    /// Reserved, but not a built-in class: `rdf:type` objects that are not class assertions.
    pub fn is_reserved_non_class(&self, term: NamedNodeRef<'_>) -> bool {
        self.is_reserved(term) && !self.is_class(term)
    }

    /// Number of reserved terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

const SYNTAX_TERMS: &[NamedNodeRef<'static>] = &[
    rdf::TYPE,
    rdf::FIRST,
    rdf::REST,
    rdf::NIL,
    rdf::LIST,
    rdf::PROPERTY,
    rdf::STATEMENT,
    rdf::SUBJECT,
    rdf::PREDICATE,
    rdf::OBJECT,
    rdf::VALUE,
    rdfs::CLASS,
    rdfs::DOMAIN,
    rdfs::RANGE,
    rdfs::SUB_CLASS_OF,
    rdfs::SUB_PROPERTY_OF,
    rdfs::RESOURCE,
    rdfs::MEMBER,
    rdfs::CONTAINER,
    owl::ALL_DIFFERENT,
    owl::ALL_DISJOINT_CLASSES,
    owl::ALL_DISJOINT_PROPERTIES,
    owl::ALL_VALUES_FROM,
    owl::ANNOTATED_PROPERTY,
    owl::ANNOTATED_SOURCE,
    owl::ANNOTATED_TARGET,
    owl::ANNOTATION,
    owl::ASSERTION_PROPERTY,
    owl::ASYMMETRIC_PROPERTY,
    owl::AXIOM,
    owl::CARDINALITY,
    owl::COMPLEMENT_OF,
    owl::DATA_RANGE,
    owl::DATATYPE_COMPLEMENT_OF,
    owl::DEPRECATED_CLASS,
    owl::DEPRECATED_PROPERTY,
    owl::DIFFERENT_FROM,
    owl::DISJOINT_UNION_OF,
    owl::DISJOINT_WITH,
    owl::DISTINCT_MEMBERS,
    owl::EQUIVALENT_CLASS,
    owl::EQUIVALENT_PROPERTY,
    owl::FUNCTIONAL_PROPERTY,
    owl::HAS_KEY,
    owl::HAS_SELF,
    owl::HAS_VALUE,
    owl::IMPORTS,
    owl::INTERSECTION_OF,
    owl::INVERSE_FUNCTIONAL_PROPERTY,
    owl::INVERSE_OF,
    owl::IRREFLEXIVE_PROPERTY,
    owl::MAX_CARDINALITY,
    owl::MAX_QUALIFIED_CARDINALITY,
    owl::MEMBERS,
    owl::MIN_CARDINALITY,
    owl::MIN_QUALIFIED_CARDINALITY,
    owl::NEGATIVE_PROPERTY_ASSERTION,
    owl::ON_CLASS,
    owl::ON_DATA_RANGE,
    owl::ON_DATATYPE,
    owl::ONE_OF,
    owl::ON_PROPERTIES,
    owl::ON_PROPERTY,
    owl::ONTOLOGY,
    owl::ONTOLOGY_PROPERTY,
    owl::PROPERTY_CHAIN_AXIOM,
    owl::PROPERTY_DISJOINT_WITH,
    owl::QUALIFIED_CARDINALITY,
    owl::REFLEXIVE_PROPERTY,
    owl::SAME_AS,
    owl::SOME_VALUES_FROM,
    owl::SOURCE_INDIVIDUAL,
    owl::SYMMETRIC_PROPERTY,
    owl::TARGET_INDIVIDUAL,
    owl::TARGET_VALUE,
    owl::TRANSITIVE_PROPERTY,
    owl::UNION_OF,
    owl::VERSION_IRI,
    owl::WITH_RESTRICTIONS,
    swrl::ARGUMENT_1,
    swrl::ARGUMENT_2,
    swrl::ARGUMENTS,
    swrl::ATOM_LIST,
    swrl::BODY,
    swrl::BUILTIN,
    swrl::BUILTIN_ATOM,
    swrl::CLASS_ATOM,
    swrl::CLASS_PREDICATE,
    swrl::DATA_RANGE,
    swrl::DATA_RANGE_ATOM,
    swrl::DATAVALUED_PROPERTY_ATOM,
    swrl::DIFFERENT_INDIVIDUALS_ATOM,
    swrl::HEAD,
    swrl::IMP,
    swrl::INDIVIDUAL_PROPERTY_ATOM,
    swrl::PROPERTY_PREDICATE,
    swrl::SAME_INDIVIDUAL_ATOM,
    swrl::VARIABLE,
];

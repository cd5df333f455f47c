use crate::builtins::BuiltIns;
use crate::category::{Category, GARBAGE_CATEGORIES};
use crate::classifier::Classifier;
use crate::manifest;
use crate::reasoner::Reasoner;
use crate::store::TripleStore;
use oxrdf::vocab::rdf;
use oxrdf::{NamedOrBlankNode, Triple};
use tracing::debug;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of reasoner rounds, the first full pass included.
    pub max_rounds: usize,
    /// Default unclear properties to annotation properties once a round makes no progress.
    pub prefer_annotations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            prefer_annotations: true,
        }
    }
}

/// Infers the missing OWL 2 declarations of a triple store.
///
/// ```
/// use oxdecl::DeclarationEngine;
/// use oxdecl::vocab::owl;
/// use oxrdf::vocab::{rdf, rdfs};
/// use oxrdf::{Graph, NamedNode, Triple};
///
/// let a = NamedNode::new("http://example.com/A")?;
/// let b = NamedNode::new("http://example.com/B")?;
/// let mut graph = Graph::new();
/// graph.insert(&Triple::new(a.clone(), rdfs::SUB_CLASS_OF, b.clone()));
///
/// let report = DeclarationEngine::default().run(&mut graph);
/// assert!(report.is_complete());
/// assert!(graph.contains(&Triple::new(a, rdf::TYPE, owl::CLASS)));
/// assert!(graph.contains(&Triple::new(b, rdf::TYPE, owl::CLASS)));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct DeclarationEngine {
    builtins: BuiltIns,
    config: EngineConfig,
}

impl DeclarationEngine {
    pub fn new(builtins: BuiltIns) -> Self {
        Self::with_config(builtins, EngineConfig::default())
    }

    pub fn with_config(builtins: BuiltIns, config: EngineConfig) -> Self {
        Self { builtins, config }
    }

    pub fn builtins(&self) -> &BuiltIns {
        &self.builtins
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the manifest phase, the reasoner phase and the cleanup on the store.
    ///
    /// The engine never fails: statements it can not classify are listed in the report.
    pub fn run<S: TripleStore + ?Sized>(&self, store: &mut S) -> DeclarationReport {
        let mut classifier = Classifier::new(store, &self.builtins);
        manifest::apply(&mut classifier);
        let reasoner = Reasoner::new(self.config.max_rounds, self.config.prefer_annotations);
        let outcome = reasoner.run(&mut classifier);
        let (added, retracted) = (classifier.added(), classifier.retracted());
        let markers = remove_markers(store);
        let garbage = remove_garbage(store);
        let report = DeclarationReport {
            unresolved: outcome.unresolved.into_iter().map(|p| p.triple).collect(),
            rounds: outcome.rounds,
            declared: added.saturating_sub(markers),
            retracted: retracted + garbage,
        };
        debug!(
            "declared {} resources, retracted {} typings, {} statements unresolved",
            report.declared,
            report.retracted,
            report.unresolved.len()
        );
        report
    }
}

impl Default for DeclarationEngine {
    fn default() -> Self {
        Self::new(BuiltIns::owl2())
    }
}

/// Removes every anonymous individual marker.
fn remove_markers<S: TripleStore + ?Sized>(store: &mut S) -> usize {
    let markers = store.find(
        None,
        Some(rdf::TYPE),
        Some(Category::AnonymousIndividual.iri().into()),
    );
    markers
        .iter()
        .filter(|triple| store.remove(triple.as_ref()))
        .count()
}

/// Removes `rdf:Property` and `rdfs:Class` typings from resources that also have a real category.
fn remove_garbage<S: TripleStore + ?Sized>(store: &mut S) -> usize {
    let mut removed = 0;
    for garbage in GARBAGE_CATEGORIES {
        let typed: Vec<NamedOrBlankNode> = store
            .find(None, Some(rdf::TYPE), Some(garbage.into()))
            .into_iter()
            .map(|t| t.subject)
            .collect();
        for subject in typed {
            let declared = Category::ALL.into_iter().any(|category| {
                store.contains(Triple::new(subject.clone(), rdf::TYPE, category.iri()).as_ref())
            });
            if declared && store.remove(Triple::new(subject, rdf::TYPE, garbage).as_ref()) {
                removed += 1;
            }
        }
    }
    removed
}

/// The diagnostics of a [`DeclarationEngine::run`].
#[derive(Debug, Clone, Default)]
pub struct DeclarationReport {
    unresolved: Vec<Triple>,
    rounds: usize,
    declared: usize,
    retracted: usize,
}

impl DeclarationReport {
    /// The statements no rule could classify, in evaluation order.
    pub fn unresolved(&self) -> &[Triple] {
        &self.unresolved
    }

    /// Number of reasoner rounds run, the first full pass included.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Number of declaration triples left in the store by this run.
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// Number of typing triples removed: anonymous properties, stray named individuals and garbage typings.
    pub fn retracted(&self) -> usize {
        self.retracted
    }

    /// Has every statement been classified.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

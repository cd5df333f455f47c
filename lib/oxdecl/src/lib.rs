#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

mod builtins;
mod category;
mod classifier;
mod engine;
mod error;
pub mod manifest;
pub mod reasoner;
mod store;
pub mod vocab;

pub use crate::builtins::BuiltIns;
pub use crate::category::{Category, GARBAGE_CATEGORIES, Node};
pub use crate::classifier::Classifier;
pub use crate::engine::{DeclarationEngine, DeclarationReport, EngineConfig};
pub use crate::error::BuiltInsError;
pub use crate::store::{TripleStore, is_list_node, read_list};

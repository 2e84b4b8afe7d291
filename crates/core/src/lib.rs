//! Domain types shared across the film studio pipeline.

pub mod collaborator;
pub mod domain;
pub mod error;

pub use collaborator::{Generator, Retriever, SearchHit};
pub use domain::*;
pub use error::{CollaboratorError, CollaboratorErrorKind, CoreError, Result};

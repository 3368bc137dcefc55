//! Exact formulations of the rectangular Strip Packing Problem.
//!
//! A set of rectangles has to be placed without overlap in a strip of fixed width, minimizing the
//! used height. The problem is translated once into an abstract [`model::Model`] (integer and
//! boolean variables, a constraint list, a height objective), which is then lowered by a
//! [`solver::SolverBackend`] into the language of a concrete engine. Returned assignments are
//! decoded back into geometry and re-validated independently of the engine.

/// Entities to model the problem: instances and decoded packings
pub mod entities;

/// Lower and upper bounds on the strip height
pub mod bounds;

/// Engine-agnostic optimization model: variables, linear expressions and constraints
pub mod model;

/// Translation of an instance into a [`model::Model`]
pub mod formulation;

/// Capability interface to the solving engines and their lowerings
pub mod solver;

/// Conversion of solver assignments into geometry and back
pub mod decode;

/// Complete pipeline from instance to validated solution
pub mod solve;

/// Importing instances and exporting solutions
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;

mod error;

#[doc(inline)]
pub use error::{Error, Result, ValidationError};

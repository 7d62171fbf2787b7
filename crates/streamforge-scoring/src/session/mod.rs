//! Sessions: compiled runtime networks holding one working memory each.
//!
//! A [`ConstraintSessionFactory`] freezes the declaration graph of a
//! constraint provider once; every [`ConstraintSession`] built from it
//! compiles its own node network, so sessions never share mutable state.

mod compiler;
mod constraint_session;
mod fact_set;
mod factory;
mod inliner;
mod network;
mod node;
mod tuple;

pub use constraint_session::ConstraintSession;
pub use fact_set::FactSet;
pub use factory::{ConstraintSessionFactory, SessionFactoryBuilder};
pub use inliner::ConstraintTotal;
pub use tuple::TupleState;

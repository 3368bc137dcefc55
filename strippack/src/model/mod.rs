mod builder;
mod constraint;
mod expr;

#[doc(inline)]
pub use builder::Assignment;
#[doc(inline)]
pub use builder::Domain;
#[doc(inline)]
pub use builder::Model;
#[doc(inline)]
pub use builder::ModelBuilder;
#[doc(inline)]
pub use builder::Variable;
#[doc(inline)]
pub use constraint::Constraint;
#[doc(inline)]
pub use constraint::ConstraintKind;
#[doc(inline)]
pub use constraint::TaggedConstraint;
#[doc(inline)]
pub use constraint::Task;
#[doc(inline)]
pub use expr::LinExpr;
#[doc(inline)]
pub use expr::LinearConstraint;
#[doc(inline)]
pub use expr::Relation;
#[doc(inline)]
pub use expr::VarId;

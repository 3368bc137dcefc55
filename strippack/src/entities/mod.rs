mod instance;
mod packing;
mod solution;

#[doc(inline)]
pub use instance::Item;
#[doc(inline)]
pub use instance::SPInstance;
#[doc(inline)]
pub use packing::Packing;
#[doc(inline)]
pub use packing::Placement;
#[doc(inline)]
pub use solution::SPSolution;

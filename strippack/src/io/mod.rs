/// External (serializable) representations of the entities within the library.
pub mod ext_repr;

/// Parsing of instances in the line-oriented text format
pub mod import;

/// Result files and conversion into external representations
pub mod export;

/// All logic for drawing [`Packing`](crate::entities::Packing)s as SVG
pub mod svg;

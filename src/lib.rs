pub mod cli;
pub mod connectivity;
pub mod error;
pub mod extractor;
pub mod geometry;
pub mod naming;
pub mod netlist;
pub mod output;
pub mod schematic;
pub mod union_find;
pub mod validation;

// Re-export commonly used types
pub use connectivity::{build_partition, Element, Partition};
pub use error::{NetlistError, SchematicError};
pub use extractor::{
    extract_nets, validate_all_pins_have_nets, ExtractionConfig, ExtractionReport, NetExtractor,
};
pub use geometry::{point_distance, point_to_segment_distance, touches, Point};
pub use naming::{NamingWarning, NetOrigin, GROUND_NET};
pub use schematic::{Component, ComponentKind, Junction, NetLabel, Pin, Schematic, Wire};
pub use validation::{validate_schematic, SchematicValidator, ValidationIssue};

// Error types
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

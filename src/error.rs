use thiserror::Error;

/// Errors raised while building or loading a schematic model
#[derive(Error, Debug)]
pub enum SchematicError {
    #[error("Wire must have at least 2 distinct points, got {0}")]
    DegenerateWire(usize),
    #[error("Tolerance must be a finite, non-negative distance, got {0}")]
    InvalidTolerance(f64),
    #[error("Failed to read schematic '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid schematic JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while mapping resolved nets onto netlist nodes
#[derive(Error, Debug, PartialEq)]
pub enum NetlistError {
    #[error("Component {component} has unassigned pin {pin}")]
    UnassignedPin { component: String, pin: String },
}

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::error::NetlistError;
use crate::schematic::{ComponentKind, Schematic};

/// Node name emitted for a pin that carries an empty net
pub const UNDEFINED_NODE: &str = "NUNDEF";

lazy_static! {
    // Schematic net names with a fixed SPICE spelling
    static ref NODE_ALIASES: HashMap<&'static str, &'static str> = [
        ("VIN", "Vin"),
        ("PLUS", "Vplus"),
        ("MINUS", "Vminus"),
        ("OUT", "Vout"),
        ("VOUT", "Vout"),
        ("GND", "0"),
        ("0", "0"),
    ]
    .into_iter()
    .collect();
}

/// Map a resolved net name to the SPICE node identifier used in netlists
pub fn spice_node_name(net: &str) -> String {
    let upper = net.trim().to_uppercase();
    if upper.is_empty() {
        return UNDEFINED_NODE.to_string();
    }

    match NODE_ALIASES.get(upper.as_str()) {
        Some(alias) => alias.to_string(),
        None => upper,
    }
}

/// SPICE nodes of one circuit element, in pin order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentNodes {
    pub reference: String,
    pub kind: ComponentKind,
    pub value: f64,
    pub nodes: Vec<String>,
}

/// Collect SPICE nodes for every circuit element of an extracted schematic.
///
/// Ground and output markers are skipped. A pin that was never assigned a net
/// means extraction did not run and is reported as an error.
pub fn component_nodes(model: &Schematic) -> Result<Vec<ComponentNodes>, NetlistError> {
    model
        .components
        .iter()
        .filter(|comp| !comp.kind.is_marker())
        .map(|comp| -> Result<ComponentNodes, NetlistError> {
            let nodes = comp
                .pins
                .iter()
                .map(|pin| {
                    pin.net
                        .as_deref()
                        .map(spice_node_name)
                        .ok_or_else(|| NetlistError::UnassignedPin {
                            component: comp.reference.clone(),
                            pin: pin.name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ComponentNodes {
                reference: comp.reference.clone(),
                kind: comp.kind,
                value: comp.value,
                nodes,
            })
        })
        .collect()
}

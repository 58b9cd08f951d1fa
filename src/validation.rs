use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::extractor::{validate_all_pins_have_nets, ExtractionConfig, NetExtractor};
use crate::geometry::segment_intersection;
use crate::naming::GROUND_NET;
use crate::schematic::{ComponentKind, Schematic};
use crate::union_find::DisjointSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding of the schematic validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    pub severity: Severity,
    pub component_ref: Option<String>,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        ValidationIssue {
            message: message.into(),
            severity: Severity::Error,
            component_ref: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ValidationIssue {
            message: message.into(),
            severity: Severity::Warning,
            component_ref: None,
        }
    }

    pub fn for_component(mut self, reference: impl Into<String>) -> Self {
        self.component_ref = Some(reference.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Crossings closer than this to a wire end count as shared vertices
    pub crossing_clearance: f64,
    pub check_crossings: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            crossing_clearance: 1.0,
            check_crossings: true,
        }
    }
}

/// Net names treated as ground when checking a schematic after extraction
fn is_ground_net(net: &str) -> bool {
    let upper = net.trim().to_uppercase();
    upper == GROUND_NET || upper == "GND"
}

/// Pre-simulation checks over an already-extracted schematic
#[derive(Debug, Clone, Default)]
pub struct SchematicValidator {
    config: ValidatorConfig,
}

impl SchematicValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        SchematicValidator { config }
    }

    /// Run every check. Valid means no issue of error severity.
    pub fn check(&self, model: &Schematic) -> (bool, Vec<ValidationIssue>) {
        let mut issues = Vec::new();

        let (_, unconnected) = validate_all_pins_have_nets(model);
        issues.extend(
            unconnected
                .into_iter()
                .map(|desc| ValidationIssue::error(format!("Unconnected pin: {}", desc))),
        );

        if !has_ground_reference(model) {
            issues.push(ValidationIssue::error(
                "No ground reference found. Circuit must have at least one ground node (GND or 0).",
            ));
        }

        for group in find_floating_subcircuits(model) {
            issues.push(ValidationIssue::error(format!(
                "Floating subcircuit: Components {} are not connected to the rest of the circuit.",
                group.join(", ")
            )));
        }

        issues.extend(find_short_circuits(model));

        if self.config.check_crossings {
            issues.extend(find_unjunctioned_crossings(model, self.config.crossing_clearance));
        }

        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        info!(
            "Schematic validation: {} issues ({})",
            issues.len(),
            if valid { "valid" } else { "invalid" }
        );
        (valid, issues)
    }
}

/// Extract nets, then run every validator check
pub fn validate_schematic(
    model: &mut Schematic,
    config: &ExtractionConfig,
) -> (bool, Vec<ValidationIssue>) {
    NetExtractor::with_config(config.clone()).extract(model);
    SchematicValidator::new().check(model)
}

/// A ground symbol anywhere, or any primitive on a ground-named net
pub fn has_ground_reference(model: &Schematic) -> bool {
    if model.components.iter().any(|c| c.kind.is_ground()) {
        return true;
    }

    let on_ground = |net: &Option<String>| net.as_deref().is_some_and(is_ground_net);
    model.pins().any(|(_, pin)| on_ground(&pin.net))
        || model.wires.iter().any(|w| on_ground(&w.net))
        || model.junctions.iter().any(|j| on_ground(&j.net))
}

/// Components cut off from the main circuit.
///
/// Components are clustered through shared non-ground nets. The largest
/// cluster is the main circuit; any other cluster is floating unless it
/// touches ground, which every cluster shares as reference. Components with
/// no net at all are reported together as one extra group. Ground symbols
/// never float.
pub fn find_floating_subcircuits(model: &Schematic) -> Vec<Vec<String>> {
    let circuit: Vec<usize> = model
        .components
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.kind.is_ground())
        .map(|(i, _)| i)
        .collect();

    let mut dsu = DisjointSet::new(model.components.len());
    let mut first_on_net: HashMap<String, usize> = HashMap::new();
    let mut grounded = vec![false; model.components.len()];
    let mut has_net = vec![false; model.components.len()];
    let mut has_signal_net = vec![false; model.components.len()];

    for &index in &circuit {
        for pin in &model.components[index].pins {
            let Some(net) = pin.net.as_deref().filter(|n| !n.trim().is_empty()) else {
                continue;
            };
            has_net[index] = true;
            if is_ground_net(net) {
                grounded[index] = true;
                continue;
            }
            has_signal_net[index] = true;
            let owner = *first_on_net.entry(net.to_uppercase()).or_insert(index);
            dsu.union(owner, index);
        }
    }

    let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut unconnected = Vec::new();
    for &index in &circuit {
        if !has_net[index] {
            unconnected.push(model.components[index].reference.clone());
            continue;
        }
        let root = dsu.find(index);
        clusters.entry(root).or_default().push(index);
    }

    let mut floating: Vec<Vec<String>> = Vec::new();

    // a component tied only to ground floats when nothing else is there
    if let [only] = circuit.as_slice() {
        if has_net[*only] && !has_signal_net[*only] {
            unconnected.push(model.components[*only].reference.clone());
        }
    }

    if clusters.len() > 1 {
        let main_root = clusters
            .iter()
            .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(a.0)))
            .map(|(&root, _)| root);

        for (root, members) in &clusters {
            if Some(*root) == main_root {
                continue;
            }
            if members.iter().any(|&i| grounded[i]) {
                continue;
            }
            floating.push(
                members
                    .iter()
                    .map(|&i| model.components[i].reference.clone())
                    .collect(),
            );
        }
    }

    if !unconnected.is_empty() {
        floating.push(unconnected);
    }

    debug!("Floating subcircuits: {}", floating.len());
    floating
}

/// Outputs tied to ground and sources with both terminals on one net
pub fn find_short_circuits(model: &Schematic) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut output_nets: BTreeSet<String> = BTreeSet::new();
    for comp in &model.components {
        let is_output_pin = |name: &str| match comp.kind {
            ComponentKind::OutputMarker => true,
            ComponentKind::OpAmp => matches!(name.to_uppercase().as_str(), "OUT" | "OUTPUT"),
            _ => false,
        };
        for pin in &comp.pins {
            if let Some(net) = pin.net.as_deref() {
                if is_output_pin(&pin.name) && !net.is_empty() {
                    output_nets.insert(net.to_string());
                }
            }
        }
    }

    for net in output_nets.iter().filter(|n| is_ground_net(n)) {
        issues.push(ValidationIssue::error(format!(
            "Output node '{}' is shorted to ground.",
            net
        )));
    }

    for comp in model.components.iter().filter(|c| c.kind.is_source()) {
        if let [first, second] = comp.pins.as_slice() {
            if let (Some(a), Some(b)) = (first.net.as_deref(), second.net.as_deref()) {
                if a.eq_ignore_ascii_case(b) {
                    let kind = match comp.kind {
                        ComponentKind::VoltageSource => "Voltage",
                        _ => "Current",
                    };
                    issues.push(
                        ValidationIssue::error(format!(
                            "{} source {} is shorted: both terminals on net '{}'.",
                            kind, comp.reference, a
                        ))
                        .for_component(comp.reference.clone()),
                    );
                }
            }
        }
    }

    issues
}

/// Wires on different nets whose segments cross with no junction between them
pub fn find_unjunctioned_crossings(model: &Schematic, clearance: f64) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (i, first) in model.wires.iter().enumerate() {
        for second in model.wires.iter().skip(i + 1) {
            if first.net.is_some() && first.net == second.net {
                continue;
            }
            let crossing = first.segments().find_map(|(a1, a2)| {
                second
                    .segments()
                    .find_map(|(b1, b2)| segment_intersection(a1, a2, b1, b2, clearance))
            });
            if let Some(at) = crossing {
                issues.push(ValidationIssue::warning(format!(
                    "Wires cross at ({:.1}, {:.1}) without a junction; they are not connected.",
                    at.x, at.y
                )));
            }
        }
    }

    issues
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchematicError;
use crate::geometry::Point;

/// Kind tag carried by every placed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "R")]
    Resistor,
    #[serde(rename = "C")]
    Capacitor,
    #[serde(rename = "L")]
    Inductor,
    #[serde(rename = "D")]
    Diode,
    #[serde(rename = "Q")]
    Bjt,
    #[serde(rename = "M")]
    Mosfet,
    #[serde(rename = "V")]
    VoltageSource,
    #[serde(rename = "I")]
    CurrentSource,
    #[serde(rename = "G")]
    Vccs,
    #[serde(rename = "OPAMP")]
    OpAmp,
    #[serde(rename = "GND")]
    Ground,
    #[serde(rename = "VOUT")]
    OutputMarker,
    #[serde(other)]
    Other,
}

impl ComponentKind {
    /// Ground markers tie every one of their pins to the global reference net
    pub fn is_ground(&self) -> bool {
        matches!(self, ComponentKind::Ground)
    }

    /// Markers annotate nets but are not circuit elements
    pub fn is_marker(&self) -> bool {
        matches!(self, ComponentKind::Ground | ComponentKind::OutputMarker)
    }

    pub fn is_source(&self) -> bool {
        matches!(self, ComponentKind::VoltageSource | ComponentKind::CurrentSource)
    }
}

/// Connection point owned by a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub net: Option<String>,
}

impl Pin {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Pin {
            name: name.into(),
            x,
            y,
            net: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// A pin counts as assigned only when its net holds non-empty text
    pub fn has_net(&self) -> bool {
        self.net.as_deref().is_some_and(|net| !net.is_empty())
    }
}

/// Placed schematic component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "ref")]
    pub reference: String,
    pub kind: ComponentKind,
    #[serde(default)]
    pub value: f64,
    pub pins: Vec<Pin>,
}

impl Component {
    pub fn new(reference: impl Into<String>, kind: ComponentKind, pins: Vec<Pin>) -> Self {
        Component {
            reference: reference.into(),
            kind,
            value: 0.0,
            pins,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Single-pin ground marker at the given position
    pub fn ground(reference: impl Into<String>, x: f64, y: f64) -> Self {
        Component::new(reference, ComponentKind::Ground, vec![Pin::new("GND", x, y)])
    }
}

/// Wire drawn as a polyline; every vertex and segment is conductive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWire")]
pub struct Wire {
    points: Vec<Point>,
    #[serde(default)]
    pub net: Option<String>,
}

#[derive(Deserialize)]
struct RawWire {
    points: Vec<Point>,
    #[serde(default)]
    net: Option<String>,
}

impl TryFrom<RawWire> for Wire {
    type Error = SchematicError;

    fn try_from(raw: RawWire) -> Result<Self, Self::Error> {
        let mut wire = Wire::new(raw.points)?;
        wire.net = raw.net;
        Ok(wire)
    }
}

impl Wire {
    /// Build a wire, dropping consecutive duplicate points.
    pub fn new<P: Into<Point>>(
        points: impl IntoIterator<Item = P>,
    ) -> Result<Self, SchematicError> {
        let mut deduplicated: Vec<Point> = Vec::new();
        for point in points.into_iter().map(Into::into) {
            if deduplicated.last() != Some(&point) {
                deduplicated.push(point);
            }
        }

        if deduplicated.len() < 2 {
            return Err(SchematicError::DegenerateWire(deduplicated.len()));
        }

        Ok(Wire {
            points: deduplicated,
            net: None,
        })
    }

    /// Straight two-point wire
    pub fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, SchematicError> {
        Wire::new([(x1, y1), (x2, y2)])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Consecutive point pairs making up the polyline
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|seg| (seg[0], seg[1]))
    }
}

/// Explicit connection point placed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub net: Option<String>,
}

impl Junction {
    pub fn new(x: f64, y: f64) -> Self {
        Junction { x, y, net: None }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Text marker naming the net under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetLabel {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

impl NetLabel {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        NetLabel {
            x,
            y,
            name: name.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Key used to match labels across the canvas: trimmed and upper-cased.
    /// Whitespace-only labels have no key.
    pub fn normalized_name(&self) -> Option<String> {
        normalize_label(&self.name)
    }
}

pub fn normalize_label(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Complete schematic as handed over by the drawing surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub junctions: Vec<Junction>,
    #[serde(default)]
    pub net_labels: Vec<NetLabel>,
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schematic snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchematicError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SchematicError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SchematicError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn add_component(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn add_wire(&mut self, wire: Wire) -> &mut Self {
        self.wires.push(wire);
        self
    }

    pub fn add_junction(&mut self, junction: Junction) -> &mut Self {
        self.junctions.push(junction);
        self
    }

    pub fn add_label(&mut self, label: NetLabel) -> &mut Self {
        self.net_labels.push(label);
        self
    }

    pub fn pin_count(&self) -> usize {
        self.components.iter().map(|c| c.pins.len()).sum()
    }

    /// Iterate every pin with its owning component
    pub fn pins(&self) -> impl Iterator<Item = (&Component, &Pin)> {
        self.components
            .iter()
            .flat_map(|comp| comp.pins.iter().map(move |pin| (comp, pin)))
    }

    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.reference == reference)
    }

    /// Net of the named pin, if both exist and the pin is assigned
    pub fn pin_net(&self, reference: &str, pin: &str) -> Option<&str> {
        self.component(reference)?
            .pins
            .iter()
            .find(|p| p.name == pin)?
            .net
            .as_deref()
    }

    /// Clear every net slot, as if extraction had never run
    pub fn clear_nets(&mut self) {
        for comp in &mut self.components {
            for pin in &mut comp.pins {
                pin.net = None;
            }
        }
        for wire in &mut self.wires {
            wire.net = None;
        }
        for junction in &mut self.junctions {
            junction.net = None;
        }
    }

    pub fn print_summary(&self) {
        println!("Components: {}", self.components.len());
        println!("Pins: {}", self.pin_count());
        println!("Wires: {}", self.wires.len());
        println!("Junctions: {}", self.junctions.len());
        println!("Net labels: {}", self.net_labels.len());
    }
}

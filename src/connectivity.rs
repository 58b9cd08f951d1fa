use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::geometry::{point_distance, polyline_touches, touches, Point};
use crate::naming::is_ground_token;
use crate::schematic::Schematic;
use crate::union_find::DisjointSet;

/// One primitive taking part in net extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Element {
    Pin { component: usize, pin: usize },
    Wire(usize),
    Junction(usize),
    Label(usize),
}

/// Stable handle assignment for one pass: pins in component order, then
/// wires, junctions and labels.
#[derive(Debug, Clone)]
pub struct Arena {
    elements: Vec<Element>,
    wire_offset: usize,
    junction_offset: usize,
    label_offset: usize,
}

impl Arena {
    pub fn new(model: &Schematic) -> Self {
        let mut elements = Vec::with_capacity(
            model.pin_count() + model.wires.len() + model.junctions.len() + model.net_labels.len(),
        );

        for (component, comp) in model.components.iter().enumerate() {
            elements.extend((0..comp.pins.len()).map(|pin| Element::Pin { component, pin }));
        }
        let wire_offset = elements.len();
        elements.extend((0..model.wires.len()).map(Element::Wire));
        let junction_offset = elements.len();
        elements.extend((0..model.junctions.len()).map(Element::Junction));
        let label_offset = elements.len();
        elements.extend((0..model.net_labels.len()).map(Element::Label));

        Arena {
            elements,
            wire_offset,
            junction_offset,
            label_offset,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, handle: usize) -> Element {
        self.elements[handle]
    }

    pub fn pin_count(&self) -> usize {
        self.wire_offset
    }

    pub fn wire(&self, index: usize) -> usize {
        self.wire_offset + index
    }

    pub fn junction(&self, index: usize) -> usize {
        self.junction_offset + index
    }

    pub fn label(&self, index: usize) -> usize {
        self.label_offset + index
    }
}

/// One equivalence class of the partition
#[derive(Debug, Clone, PartialEq)]
pub struct NetGroup {
    pub members: Vec<Element>,
    pub is_ground: bool,
}

impl NetGroup {
    pub fn pins(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.members.iter().filter_map(|m| match *m {
            Element::Pin { component, pin } => Some((component, pin)),
            _ => None,
        })
    }

    pub fn wires(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().filter_map(|m| match *m {
            Element::Wire(i) => Some(i),
            _ => None,
        })
    }

    pub fn junctions(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().filter_map(|m| match *m {
            Element::Junction(i) => Some(i),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().filter_map(|m| match *m {
            Element::Label(i) => Some(i),
            _ => None,
        })
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.members.contains(element)
    }
}

/// Partition of every primitive into electrically connected groups.
///
/// Groups are ordered by their first member in arena order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub groups: Vec<NetGroup>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_of(&self, element: &Element) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(element))
    }

    pub fn ground_groups(&self) -> impl Iterator<Item = &NetGroup> {
        self.groups.iter().filter(|g| g.is_ground)
    }
}

/// Group label indices by their normalized text.
///
/// This is the only non-geometric connection rule: labels sharing a key are
/// one net however far apart they sit. Labels without a key are left out, and
/// so are ground tokens: only a ground symbol puts a net on ground.
pub fn label_key_groups(model: &Schematic) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, label) in model.net_labels.iter().enumerate() {
        match label.normalized_name() {
            Some(key) if !is_ground_token(&key) => groups.entry(key).or_default().push(index),
            _ => {}
        }
    }
    groups
}

/// Builds the connectivity partition for one extraction pass
pub struct ConnectivityBuilder<'a> {
    model: &'a Schematic,
    tolerance: f64,
    arena: Arena,
    dsu: DisjointSet,
    pin_positions: Vec<Point>,
    ground_pins: Vec<usize>,
}

impl<'a> ConnectivityBuilder<'a> {
    pub fn new(model: &'a Schematic, tolerance: f64) -> Self {
        let arena = Arena::new(model);
        let dsu = DisjointSet::new(arena.len());
        let pin_positions = model.pins().map(|(_, pin)| pin.position()).collect();

        ConnectivityBuilder {
            model,
            tolerance,
            arena,
            dsu,
            pin_positions,
            ground_pins: Vec::new(),
        }
    }

    /// Apply every connection rule and materialize the partition
    pub fn build(mut self) -> Partition {
        self.union_ground_pins();
        self.union_wires_with_junctions();
        self.union_wires_with_pins();
        self.union_pins_with_junctions();
        self.union_wires_with_wires();
        self.union_labels_by_proximity();
        self.union_labels_by_name();

        self.into_partition()
    }

    fn union_ground_pins(&mut self) {
        let mut handle = 0;
        for comp in &self.model.components {
            for _ in &comp.pins {
                if comp.kind.is_ground() {
                    self.ground_pins.push(handle);
                }
                handle += 1;
            }
        }

        if let Some((&first, rest)) = self.ground_pins.split_first() {
            for &other in rest {
                self.dsu.union(first, other);
            }
        }
        debug!("Ground pre-pass tagged {} pins", self.ground_pins.len());
    }

    fn union_wires_with_junctions(&mut self) {
        let mut merged = 0;
        for (w, wire) in self.model.wires.iter().enumerate() {
            for (j, junction) in self.model.junctions.iter().enumerate() {
                if polyline_touches(wire.points(), junction.position(), self.tolerance)
                    && self.dsu.union(self.arena.wire(w), self.arena.junction(j))
                {
                    merged += 1;
                }
            }
        }
        debug!("Wire-junction unions: {}", merged);
    }

    fn union_wires_with_pins(&mut self) {
        let mut merged = 0;
        for (w, wire) in self.model.wires.iter().enumerate() {
            for (handle, &position) in self.pin_positions.iter().enumerate() {
                if polyline_touches(wire.points(), position, self.tolerance)
                    && self.dsu.union(handle, self.arena.wire(w))
                {
                    merged += 1;
                }
            }
        }
        debug!("Wire-pin unions: {}", merged);
    }

    fn union_pins_with_junctions(&mut self) {
        let mut merged = 0;
        for (handle, &position) in self.pin_positions.iter().enumerate() {
            for (j, junction) in self.model.junctions.iter().enumerate() {
                if touches(point_distance(position, junction.position()), self.tolerance)
                    && self.dsu.union(handle, self.arena.junction(j))
                {
                    merged += 1;
                }
            }
        }
        debug!("Pin-junction unions: {}", merged);
    }

    /// Wires join only through shared vertices; crossings stay separate.
    fn union_wires_with_wires(&mut self) {
        let wires = &self.model.wires;
        let mut merged = 0;
        for (i, first) in wires.iter().enumerate() {
            for (k, second) in wires.iter().enumerate().skip(i + 1) {
                let shares_vertex = first.points().iter().any(|&p| {
                    second
                        .points()
                        .iter()
                        .any(|&q| touches(point_distance(p, q), self.tolerance))
                });
                if shares_vertex && self.dsu.union(self.arena.wire(i), self.arena.wire(k)) {
                    merged += 1;
                }
            }
        }
        debug!("Wire-wire unions: {}", merged);
    }

    fn union_labels_by_proximity(&mut self) {
        let mut merged = 0;
        for (l, label) in self.model.net_labels.iter().enumerate() {
            let at = label.position();
            let label_handle = self.arena.label(l);

            for (handle, &position) in self.pin_positions.iter().enumerate() {
                if touches(point_distance(at, position), self.tolerance)
                    && self.dsu.union(label_handle, handle)
                {
                    merged += 1;
                }
            }
            for (j, junction) in self.model.junctions.iter().enumerate() {
                if touches(point_distance(at, junction.position()), self.tolerance)
                    && self.dsu.union(label_handle, self.arena.junction(j))
                {
                    merged += 1;
                }
            }
            for (w, wire) in self.model.wires.iter().enumerate() {
                if polyline_touches(wire.points(), at, self.tolerance)
                    && self.dsu.union(label_handle, self.arena.wire(w))
                {
                    merged += 1;
                }
            }
        }
        debug!("Label proximity unions: {}", merged);
    }

    fn union_labels_by_name(&mut self) {
        let mut merged = 0;
        for (key, members) in label_key_groups(self.model) {
            if let Some((&first, rest)) = members.split_first() {
                for &other in rest {
                    if self.dsu.union(self.arena.label(first), self.arena.label(other)) {
                        merged += 1;
                    }
                }
            }
            if members.len() > 1 {
                debug!("Label '{}' joins {} placements", key, members.len());
            }
        }
        debug!("Label identity unions: {}", merged);
    }

    fn into_partition(mut self) -> Partition {
        let mut ground_root = vec![false; self.arena.len()];
        for &handle in &self.ground_pins {
            let root = self.dsu.find(handle);
            ground_root[root] = true;
        }

        let groups = self
            .dsu
            .groups()
            .into_iter()
            .map(|handles| {
                let is_ground = handles
                    .first()
                    .map(|&h| ground_root[self.dsu.find(h)])
                    .unwrap_or(false);
                NetGroup {
                    members: handles.iter().map(|&h| self.arena.element(h)).collect(),
                    is_ground,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Partitioned {} primitives into {} groups",
            self.arena.len(),
            groups.len()
        );
        Partition { groups }
    }
}

/// Partition `model` into connected groups using the given tolerance radius
pub fn build_partition(model: &Schematic, tolerance: f64) -> Partition {
    ConnectivityBuilder::new(model, tolerance).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::{Component, ComponentKind, Junction, NetLabel, Pin, Wire};

    fn resistor(reference: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> Component {
        Component::new(
            reference,
            ComponentKind::Resistor,
            vec![Pin::new("1", x1, y1), Pin::new("2", x2, y2)],
        )
    }

    fn pin(component: usize, pin: usize) -> Element {
        Element::Pin { component, pin }
    }

    #[test]
    fn test_arena_handle_layout() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 0.0, 0.0, 40.0, 0.0))
            .add_wire(Wire::segment(0.0, 0.0, 0.0, 50.0).unwrap())
            .add_junction(Junction::new(0.0, 50.0))
            .add_label(NetLabel::new("A", 0.0, 50.0));

        let arena = Arena::new(&model);
        assert_eq!(arena.len(), 5);
        assert_eq!(arena.pin_count(), 2);
        assert_eq!(arena.element(arena.wire(0)), Element::Wire(0));
        assert_eq!(arena.element(arena.junction(0)), Element::Junction(0));
        assert_eq!(arena.element(arena.label(0)), Element::Label(0));
    }

    #[test]
    fn test_pin_mid_segment_joins_wire() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 50.0, 0.0, 50.0, 40.0))
            .add_wire(Wire::segment(0.0, 0.0, 100.0, 0.0).unwrap());

        let partition = build_partition(&model, 5.0);
        let g = partition.group_of(&pin(0, 0)).unwrap();
        assert_eq!(partition.group_of(&Element::Wire(0)), Some(g));
        assert_ne!(partition.group_of(&pin(0, 1)), Some(g));
    }

    #[test]
    fn test_polyline_interior_vertex_connects() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 100.0, 0.0, 200.0, 0.0))
            .add_wire(Wire::new([(0.0, 50.0), (100.0, 0.0), (100.0, -50.0)]).unwrap());

        let partition = build_partition(&model, 2.0);
        assert_eq!(
            partition.group_of(&pin(0, 0)),
            partition.group_of(&Element::Wire(0))
        );
    }

    #[test]
    fn test_crossing_wires_stay_separate() {
        let mut model = Schematic::new();
        model
            .add_wire(Wire::segment(0.0, 50.0, 100.0, 50.0).unwrap())
            .add_wire(Wire::segment(50.0, 0.0, 50.0, 100.0).unwrap());

        let partition = build_partition(&model, 5.0);
        assert_eq!(partition.len(), 2);
    }

    #[test]
    fn test_crossing_wires_join_through_junction() {
        let mut model = Schematic::new();
        model
            .add_wire(Wire::segment(0.0, 50.0, 100.0, 50.0).unwrap())
            .add_wire(Wire::segment(50.0, 0.0, 50.0, 100.0).unwrap())
            .add_junction(Junction::new(50.0, 50.0));

        let partition = build_partition(&model, 5.0);
        assert_eq!(partition.len(), 1);
    }

    #[test]
    fn test_wires_sharing_endpoint_join() {
        let mut model = Schematic::new();
        model
            .add_wire(Wire::segment(0.0, 0.0, 50.0, 0.0).unwrap())
            .add_wire(Wire::segment(52.0, 0.0, 52.0, 80.0).unwrap());

        assert_eq!(build_partition(&model, 5.0).len(), 1);
        assert_eq!(build_partition(&model, 1.0).len(), 2);
    }

    #[test]
    fn test_pin_joins_junction_without_wire() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 0.0, 0.0, 40.0, 0.0))
            .add_component(resistor("R2", 40.0, 0.0, 80.0, 0.0))
            .add_junction(Junction::new(41.0, 1.0));

        let partition = build_partition(&model, 3.0);
        let g = partition.group_of(&pin(0, 1)).unwrap();
        assert_eq!(partition.group_of(&pin(1, 0)), Some(g));
        assert_eq!(partition.group_of(&Element::Junction(0)), Some(g));
    }

    #[test]
    fn test_ground_pins_join_across_canvas() {
        let mut model = Schematic::new();
        model
            .add_component(Component::ground("GND1", 0.0, 0.0))
            .add_component(Component::ground("GND2", 900.0, 900.0));

        let partition = build_partition(&model, 5.0);
        assert_eq!(partition.len(), 1);
        assert!(partition.groups[0].is_ground);
    }

    #[test]
    fn test_label_identity_ignores_distance() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 0.0, 0.0, 40.0, 0.0))
            .add_component(resistor("R2", 500.0, 500.0, 540.0, 500.0))
            .add_label(NetLabel::new("BUS1", 0.0, 0.0))
            .add_label(NetLabel::new("bus1 ", 500.0, 500.0));

        let partition = build_partition(&model, 5.0);
        assert_eq!(partition.group_of(&pin(0, 0)), partition.group_of(&pin(1, 0)));
        assert_ne!(partition.group_of(&pin(0, 1)), partition.group_of(&pin(1, 1)));
        assert!(partition.ground_groups().next().is_none());
    }

    #[test]
    fn test_label_key_groups() {
        let mut model = Schematic::new();
        model
            .add_label(NetLabel::new("Vcc", 0.0, 0.0))
            .add_label(NetLabel::new("OUT", 0.0, 0.0))
            .add_label(NetLabel::new(" VCC", 10.0, 0.0))
            .add_label(NetLabel::new("  ", 10.0, 0.0))
            .add_label(NetLabel::new("gnd", 20.0, 0.0))
            .add_label(NetLabel::new("GND", 30.0, 0.0));

        let groups = label_key_groups(&model);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["VCC"], vec![0, 2]);
        assert_eq!(groups["OUT"], vec![1]);
    }

    #[test]
    fn test_partition_independent_of_input_order() {
        let mut model = Schematic::new();
        model
            .add_component(resistor("R1", 0.0, 0.0, 40.0, 0.0))
            .add_wire(Wire::segment(40.0, 0.0, 80.0, 0.0).unwrap())
            .add_wire(Wire::segment(80.0, 0.0, 80.0, 40.0).unwrap())
            .add_junction(Junction::new(80.0, 40.0));

        let forward = build_partition(&model, 2.0);

        model.wires.reverse();
        let reversed = build_partition(&model, 2.0);

        let sizes = |p: &Partition| {
            let mut s: Vec<usize> = p.groups.iter().map(|g| g.members.len()).collect();
            s.sort();
            s
        };
        assert_eq!(sizes(&forward), sizes(&reversed));
        assert_eq!(forward.len(), 2);
    }
}

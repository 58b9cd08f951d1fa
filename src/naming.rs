use std::collections::{BTreeSet, HashSet};
use std::fmt;

use lazy_static::lazy_static;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::connectivity::{NetGroup, Partition};
use crate::schematic::Schematic;

/// Reserved name of the global reference net
pub const GROUND_NET: &str = "0";

/// Prefix of generated net names (`N001`, `N002`, ...)
pub const AUTO_NET_PREFIX: &str = "N";

lazy_static! {
    /// Normalized label texts that denote ground
    static ref GROUND_TOKENS: HashSet<&'static str> = ["0", "GND"].into_iter().collect();
}

/// True if the normalized label text names the ground net
pub fn is_ground_token(normalized: &str) -> bool {
    GROUND_TOKENS.contains(normalized)
}

/// Where a net's canonical name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetOrigin {
    Ground,
    Label,
    Auto,
}

/// Canonical name chosen for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetName {
    pub name: String,
    pub origin: NetOrigin,
}

/// Non-fatal naming problems found during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingWarning {
    /// Several distinct label texts ended up on one net
    LabelConflict { chosen: String, candidates: Vec<String> },
    /// A ground-token label sits on a net that has no ground pin
    GroundLabelIgnored { label: String, net: String },
    /// A non-ground label sits on the ground net
    LabelShadowedByGround { label: String },
}

impl fmt::Display for NamingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingWarning::LabelConflict { chosen, candidates } => write!(
                f,
                "Net label conflict: labels {} merged into one net, using '{}'",
                candidates.join(", "),
                chosen
            ),
            NamingWarning::GroundLabelIgnored { label, net } => write!(
                f,
                "Ground label '{}' is not connected to a ground symbol; net named '{}' instead",
                label, net
            ),
            NamingWarning::LabelShadowedByGround { label } => {
                write!(f, "Label '{}' is attached to the ground net and is ignored", label)
            }
        }
    }
}

/// Sequential generator for unlabeled nets.
///
/// Names already claimed by labels in the same pass are skipped so a
/// generated name never collides with a labeled net.
#[derive(Debug, Clone)]
pub struct AutoNamer {
    next: usize,
    reserved: HashSet<String>,
}

impl AutoNamer {
    pub fn new(reserved: HashSet<String>) -> Self {
        AutoNamer { next: 1, reserved }
    }

    pub fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("{}{:03}", AUTO_NET_PREFIX, self.next);
            self.next += 1;
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl Default for AutoNamer {
    fn default() -> Self {
        Self::new(HashSet::new())
    }
}

/// Names for every group of a partition, in partition order
#[derive(Debug, Clone, Default)]
pub struct NamingOutcome {
    pub names: Vec<NetName>,
    pub warnings: Vec<NamingWarning>,
}

/// Label texts usable for naming a group, plus the ground tokens dropped on the way
fn label_candidates(group: &NetGroup, model: &Schematic) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut names = BTreeSet::new();
    let mut ground_tokens = BTreeSet::new();

    for index in group.labels() {
        if let Some(key) = model.net_labels[index].normalized_name() {
            if is_ground_token(&key) {
                ground_tokens.insert(key);
            } else {
                names.insert(key);
            }
        }
    }

    (names, ground_tokens)
}

/// Choose one canonical name per group: ground first, then labels, then auto.
pub fn name_groups(partition: &Partition, model: &Schematic) -> NamingOutcome {
    let mut outcome = NamingOutcome::default();

    let candidates: Vec<_> = partition
        .groups
        .iter()
        .map(|group| label_candidates(group, model))
        .collect();

    let reserved: HashSet<String> = partition
        .groups
        .iter()
        .zip(&candidates)
        .filter(|(group, _)| !group.is_ground)
        .filter_map(|(_, (names, _))| names.iter().next().cloned())
        .collect();
    let mut auto = AutoNamer::new(reserved);

    for (group, (names, ground_tokens)) in partition.groups.iter().zip(candidates) {
        if group.is_ground {
            for label in names {
                outcome
                    .warnings
                    .push(NamingWarning::LabelShadowedByGround { label });
            }
            outcome.names.push(NetName {
                name: GROUND_NET.to_string(),
                origin: NetOrigin::Ground,
            });
            continue;
        }

        let net = match names.iter().next() {
            Some(chosen) => {
                if names.len() > 1 {
                    outcome.warnings.push(NamingWarning::LabelConflict {
                        chosen: chosen.clone(),
                        candidates: names.iter().cloned().collect(),
                    });
                }
                NetName {
                    name: chosen.clone(),
                    origin: NetOrigin::Label,
                }
            }
            None => NetName {
                name: auto.next_name(),
                origin: NetOrigin::Auto,
            },
        };

        for label in ground_tokens {
            outcome.warnings.push(NamingWarning::GroundLabelIgnored {
                label,
                net: net.name.clone(),
            });
        }
        outcome.names.push(net);
    }

    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    outcome
}

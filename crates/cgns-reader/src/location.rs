//! `GridLocation` tag probes.
//!
//! Writers have stored a step group's location in several ways over time.
//! Each encoding is an independent probe, tried in order; the first one that
//! yields a non-empty label wins.

use hdf5::types::{FixedAscii, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Attribute, Dataset, Group};
use iric_common::{GridLocation, NODE_DATA};

use crate::native::{descriptor, read_bytes, decode_ascii};
use crate::pointers::Probe;

pub const LOCATION_NAME: &str = "GridLocation";

type LocationProbe = fn(&Group) -> Probe<String>;

/// Probes in priority order.
const PROBES: [LocationProbe; 3] = [probe_attribute, probe_node, probe_dataset];

/// Read and normalize a step group's location tag.
pub fn read_location(group: &Group) -> Option<GridLocation> {
    PROBES
        .iter()
        .find_map(|probe| probe(group).into_option())
        .and_then(|raw| GridLocation::parse(&raw))
}

fn nonempty(s: String) -> Probe<String> {
    let s = decode_ascii(s.as_bytes());
    if s.is_empty() {
        Probe::NotApplicable
    } else {
        Probe::Found(s)
    }
}

fn read_attr_string(attr: &Attribute) -> Option<String> {
    match descriptor(attr)? {
        TypeDescriptor::VarLenUnicode => attr
            .read_scalar::<VarLenUnicode>()
            .ok()
            .map(|s| s.as_str().to_string()),
        TypeDescriptor::VarLenAscii => attr
            .read_scalar::<VarLenAscii>()
            .ok()
            .map(|s| s.as_str().to_string()),
        TypeDescriptor::FixedAscii(_) | TypeDescriptor::FixedUnicode(_) => attr
            .read_scalar::<FixedAscii<256>>()
            .ok()
            .map(|s| s.as_str().to_string()),
        _ => None,
    }
}

/// (1) String attribute on the step group.
pub fn probe_attribute(group: &Group) -> Probe<String> {
    let has_attr = group
        .attr_names()
        .map(|names| names.iter().any(|n| n == LOCATION_NAME))
        .unwrap_or(false);
    if !has_attr {
        return Probe::NotApplicable;
    }
    match group.attr(LOCATION_NAME).ok().and_then(|a| read_attr_string(&a)) {
        Some(s) => nonempty(s),
        None => Probe::NotApplicable,
    }
}

/// (2) Child CGNS node whose `" data"` holds 8-bit characters.
pub fn probe_node(group: &Group) -> Probe<String> {
    if !group.link_exists(LOCATION_NAME) {
        return Probe::NotApplicable;
    }
    let Ok(node) = group.group(LOCATION_NAME) else {
        return Probe::NotApplicable;
    };
    if !node.link_exists(NODE_DATA) {
        return Probe::NotApplicable;
    }
    match node.dataset(NODE_DATA).ok().and_then(|ds| read_bytes(&ds).ok().flatten()) {
        Some(bytes) => nonempty(decode_ascii(&bytes)),
        None => Probe::NotApplicable,
    }
}

fn read_dataset_string(ds: &Dataset) -> Option<String> {
    if let Some(bytes) = read_bytes(ds).ok().flatten() {
        return Some(decode_ascii(&bytes));
    }
    match descriptor(ds)? {
        TypeDescriptor::VarLenUnicode => ds
            .read_scalar::<VarLenUnicode>()
            .ok()
            .map(|s| s.as_str().to_string()),
        TypeDescriptor::VarLenAscii => ds
            .read_scalar::<VarLenAscii>()
            .ok()
            .map(|s| s.as_str().to_string()),
        TypeDescriptor::FixedAscii(_) | TypeDescriptor::FixedUnicode(_) => ds
            .read_scalar::<FixedAscii<256>>()
            .ok()
            .map(|s| s.as_str().to_string()),
        _ => None,
    }
}

/// (3) Child dataset of 8-bit characters or a string.
pub fn probe_dataset(group: &Group) -> Probe<String> {
    if !group.link_exists(LOCATION_NAME) {
        return Probe::NotApplicable;
    }
    let Ok(ds) = group.dataset(LOCATION_NAME) else {
        return Probe::NotApplicable;
    };
    match read_dataset_string(&ds) {
        Some(s) => nonempty(s),
        None => Probe::NotApplicable,
    }
}

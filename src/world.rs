//! Raw world description as loaded from a logic dump
//!
//! These types mirror the JSON produced by the randomizer's logic dump. The
//! compiler in [`crate::compiler`] turns them into a [`crate::RequirementGraph`];
//! nothing else in the crate touches them.
//!
//! Map fields use `BTreeMap` so iteration order (and therefore requirement
//! order in the compiled graph) is deterministic regardless of the order keys
//! appear in the dump.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// When an area, entrance or exit can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeOfDay {
    DayOnly,
    NightOnly,
    Both,
}

impl TryFrom<u8> for TimeOfDay {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TimeOfDay::DayOnly),
            2 => Ok(TimeOfDay::NightOnly),
            3 => Ok(TimeOfDay::Both),
            other => Err(format!("invalid time of day {}", other)),
        }
    }
}

impl From<TimeOfDay> for u8 {
    fn from(tod: TimeOfDay) -> u8 {
        match tod {
            TimeOfDay::DayOnly => 1,
            TimeOfDay::NightOnly => 2,
            TimeOfDay::Both => 3,
        }
    }
}

/// An area node in the nested world description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArea {
    pub name: String,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub can_sleep: bool,
    pub hint_region: Option<String>,
    pub allowed_time_of_day: TimeOfDay,
    #[serde(default)]
    pub entrances: Option<Vec<String>>,
    /// Exit name (relative or `\`-rooted) to requirement expression.
    #[serde(default)]
    pub exits: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub sub_areas: BTreeMap<String, RawArea>,
    /// Location name to requirement expression.
    #[serde(default)]
    pub locations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntrance {
    pub allowed_time_of_day: TimeOfDay,
    #[serde(rename = "can-start-at", default)]
    pub can_start_at: Option<bool>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    pub short_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExit {
    pub allowed_time_of_day: TimeOfDay,
    /// Short name of the vanilla destination entrance, if any.
    #[serde(default)]
    pub vanilla: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    pub short_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCheck {
    #[serde(rename = "type")]
    pub check_type: Option<String>,
    pub short_name: String,
}

/// An interior/exterior exit pairing in a linked entrance pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExitLink {
    /// Either a single exit id, or `[canonical exit, auto-taken return exit]`.
    pub exit_from_outside: OneOrPair,
    pub exit_from_inside: String,
}

/// A single string or an ordered pair of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrPair {
    One(String),
    Pair(String, String),
}

impl OneOrPair {
    /// The canonical (first) value.
    pub fn canonical(&self) -> &str {
        match self {
            OneOrPair::One(s) => s,
            OneOrPair::Pair(first, _) => first,
        }
    }

    /// The secondary value of a pair, if present.
    pub fn secondary(&self) -> Option<&str> {
        match self {
            OneOrPair::One(_) => None,
            OneOrPair::Pair(_, second) => Some(second),
        }
    }
}

/// The whole logic dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWorld {
    /// Every fact name in the universe: items, checks, exits, area/ToD
    /// variants, marker facts. Order assigns fact indices.
    pub items: Vec<String>,
    pub checks: BTreeMap<String, RawCheck>,
    /// Gossip stone id to display name.
    #[serde(default)]
    pub gossip_stones: BTreeMap<String, String>,
    pub exits: BTreeMap<String, RawExit>,
    pub entrances: BTreeMap<String, RawEntrance>,
    pub areas: RawArea,
    /// Pool name (dungeons, silent realms, ...) to pool entries.
    #[serde(default)]
    pub linked_entrances: BTreeMap<String, BTreeMap<String, RawExitLink>>,
    /// Dungeon name to the check id that marks the dungeon completed.
    #[serde(default)]
    pub dungeon_completion_requirements: BTreeMap<String, String>,
}

//! Subject classification.
//!
//! Maps a canonical subject token (upper-cased, trimmed) to one of a closed
//! set of categories using fixed membership tables. Tokens that appear in no
//! table are [`SubjectCategory::Other`].

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectCategory {
    Nature,
    Water,
    Structure,
    Landscape,
    Weather,
    Other,
}

impl SubjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectCategory::Nature => "NATURE",
            SubjectCategory::Water => "WATER",
            SubjectCategory::Structure => "STRUCTURE",
            SubjectCategory::Landscape => "LANDSCAPE",
            SubjectCategory::Weather => "WEATHER",
            SubjectCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for SubjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const NATURE: &[&str] = &[
    "TREE",
    "TREES",
    "CONIFER",
    "DECIDUOUS",
    "PALM_TREES",
    "BUSHES",
    "CACTUS",
    "FLOWERS",
    "GRASS",
];

const WATER: &[&str] = &[
    "LAKE",
    "LAKES",
    "RIVER",
    "OCEAN",
    "WAVES",
    "WATERFALL",
    "BEACH",
];

const STRUCTURE: &[&str] = &[
    "STRUCTURE",
    "CABIN",
    "BARN",
    "BRIDGE",
    "BUILDING",
    "DOCK",
    "FARM",
    "FENCE",
    "LIGHTHOUSE",
    "MILL",
    "WINDMILL",
    "BOAT",
    "PATH",
];

const LANDSCAPE: &[&str] = &[
    "MOUNTAIN",
    "MOUNTAINS",
    "SNOWY_MOUNTAIN",
    "HILLS",
    "CLIFF",
    "ROCKS",
];

const WEATHER: &[&str] = &[
    "CLOUDS",
    "CIRRUS",
    "CUMULUS",
    "FOG",
    "SNOW",
    "WINTER",
    "SUN",
    "MOON",
    "NIGHT",
    "AURORA_BOREALIS",
];

const TABLES: &[(SubjectCategory, &[&str])] = &[
    (SubjectCategory::Nature, NATURE),
    (SubjectCategory::Water, WATER),
    (SubjectCategory::Structure, STRUCTURE),
    (SubjectCategory::Landscape, LANDSCAPE),
    (SubjectCategory::Weather, WEATHER),
];

pub fn classify(token: &str) -> SubjectCategory {
    TABLES
        .iter()
        .find(|(_, members)| members.contains(&token))
        .map(|(category, _)| *category)
        .unwrap_or(SubjectCategory::Other)
}

/// Every subject named in the membership tables, with its category.
/// Used to seed the `subjects` table.
pub fn known_subjects() -> impl Iterator<Item = (&'static str, SubjectCategory)> {
    TABLES
        .iter()
        .flat_map(|(category, members)| members.iter().map(move |m| (*m, *category)))
}

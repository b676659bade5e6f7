//! Animated 3D battler sprite sheets.
//!
//! The archive sits in a MediaFire folder with no stable direct link, so
//! it has to be downloaded by hand. Files are named `{index:03}[_{k}]`
//! where `k` counts the alternate forms of an entity in game order.

use anyhow::Result;

use super::{SourceDefinition, SpriteSetConfig};
use crate::forms::{registry, FEMALE, MEGA, MEGA_X, MEGA_Y, ALOLA, NORMAL};
use crate::overrides::{form, normal, OverrideValue, PathOverrideTable};
use crate::pipeline::post_process::PostProcessor;

use OverrideValue::Dismiss;

const PREFIX: &str = "3d-battlers-animated/";

/// Highest entity index covered by the pack.
const LAST_INDEX: u32 = 807;

/// Forms of one entity by alternate number: `(k, form)`, `k == 0` being
/// the file without a `_k` suffix.
type Alternates = &'static [(u32, &'static str)];

const ALTERNATES: &[(u32, Alternates)] = &[
    (3, &[(1, MEGA)]),
    (6, &[(1, MEGA_X), (2, MEGA_Y)]),
    (9, &[(1, MEGA)]),
    (15, &[(1, MEGA)]),
    (18, &[(1, MEGA)]),
    (19, &[(1, ALOLA)]),
    (20, &[(1, ALOLA)]),
    (26, &[(1, ALOLA)]),
    (27, &[(1, ALOLA)]),
    (28, &[(1, ALOLA)]),
    (37, &[(1, ALOLA)]),
    (38, &[(1, ALOLA)]),
    (50, &[(1, ALOLA)]),
    (51, &[(1, ALOLA)]),
    (52, &[(1, ALOLA)]),
    (65, &[(1, MEGA)]),
    (74, &[(1, ALOLA)]),
    (75, &[(1, ALOLA)]),
    (76, &[(1, ALOLA)]),
    (80, &[(1, MEGA)]),
    (88, &[(1, ALOLA)]),
    (89, &[(1, ALOLA)]),
    (94, &[(1, MEGA)]),
    (103, &[(1, ALOLA)]),
    (105, &[(1, ALOLA)]),
    (115, &[(1, MEGA)]),
    (127, &[(1, MEGA)]),
    (130, &[(1, MEGA)]),
    (142, &[(1, MEGA)]),
    (150, &[(1, MEGA_X), (2, MEGA_Y)]),
    (181, &[(1, MEGA)]),
    (
        201,
        &[
            (0, "a"),
            (1, "b"),
            (2, "d"),
            (3, "c"),
            (4, "e"),
            (5, "f"),
            (6, "g"),
            (7, "h"),
            (8, "i"),
            (9, "j"),
            (10, "k"),
            (11, "l"),
            (12, "m"),
            (13, "n"),
            (14, "o"),
            (15, "p"),
            (16, "q"),
            (17, "r"),
            (18, "s"),
            (19, "t"),
            (20, "u"),
            (21, "v"),
            (22, "w"),
            (23, "x"),
            (24, "y"),
            (25, "z"),
            (26, "question"),
            (27, "exclamation"),
        ],
    ),
    (208, &[(1, MEGA)]),
    (212, &[(1, MEGA)]),
    (214, &[(1, MEGA)]),
    (229, &[(1, MEGA)]),
    (248, &[(1, MEGA)]),
    (254, &[(1, MEGA)]),
    (257, &[(1, MEGA)]),
    (260, &[(1, MEGA)]),
    (282, &[(1, MEGA)]),
    (302, &[(1, MEGA)]),
    (303, &[(1, MEGA)]),
    (306, &[(1, MEGA)]),
    (308, &[(1, MEGA)]),
    (310, &[(1, MEGA)]),
    (319, &[(1, MEGA)]),
    (323, &[(1, MEGA)]),
    (334, &[(1, MEGA)]),
    (351, &[(1, "sunny"), (2, "rainy"), (3, "snowy")]),
    (354, &[(1, MEGA)]),
    (359, &[(1, MEGA)]),
    (362, &[(1, MEGA)]),
    (373, &[(1, MEGA)]),
    (376, &[(1, MEGA)]),
    (380, &[(1, MEGA)]),
    (381, &[(1, MEGA)]),
    (382, &[(1, "primal")]),
    (383, &[(1, "primal")]),
    (384, &[(1, MEGA)]),
    (386, &[(1, "attack"), (2, "defense"), (3, "speed")]),
    (412, &[(0, "plant"), (1, "sandy"), (2, "trash")]),
    (413, &[(0, "plant"), (1, "sandy"), (2, "trash")]),
    (421, &[(0, "overcast"), (1, "sunshine")]),
    (422, &[(0, "west"), (1, "east")]),
    (423, &[(0, "west"), (1, "east")]),
    (428, &[(1, MEGA)]),
    (445, &[(1, MEGA)]),
    (448, &[(1, MEGA)]),
    (460, &[(1, MEGA)]),
    (475, &[(1, MEGA)]),
    (479, &[(1, "heat"), (2, "wash"), (3, "frost"), (4, "fan"), (5, "mow")]),
    (487, &[(0, "altered"), (1, "origin")]),
    (492, &[(0, "land"), (1, "sky")]),
    (
        493,
        &[
            (1, "fighting"),
            (2, "flying"),
            (3, "poison"),
            (4, "ground"),
            (5, "rock"),
            (6, "bug"),
            (7, "ghost"),
            (8, "steel"),
            (10, "fire"),
            (11, "water"),
            (12, "grass"),
            (13, "electric"),
            (14, "psychic"),
            (15, "ice"),
            (16, "dragon"),
            (17, "dark"),
            (18, "fairy"),
        ],
    ),
    (531, &[(1, MEGA)]),
    (550, &[(0, "red-striped"), (1, "blue-striped")]),
    (555, &[(1, "zen")]),
    (585, &[(0, "spring"), (1, "summer"), (2, "autumn"), (3, "winter")]),
    (586, &[(0, "spring"), (1, "summer"), (2, "autumn"), (3, "winter")]),
    (641, &[(0, "incarnate"), (1, "therian")]),
    (642, &[(0, "incarnate"), (1, "therian")]),
    (645, &[(0, "incarnate"), (1, "therian")]),
    (646, &[(1, "white"), (2, "black")]),
    (647, &[(0, "ordinary"), (1, "resolute")]),
    (648, &[(0, "aria"), (1, "pirouette")]),
    (649, &[(1, "shock"), (2, "burn"), (3, "chill"), (4, "douse")]),
    (
        666,
        &[
            (0, "meadow"),
            (1, "polar"),
            (2, "tundra"),
            (3, "continental"),
            (4, "garden"),
            (5, "elegant"),
            (6, "icy-snow"),
            (7, "modern"),
            (8, "marine"),
            (9, "archipelago"),
            (10, "high-plains"),
            (11, "sandstorm"),
            (12, "river"),
            (13, "monsoon"),
            (14, "savanna"),
            (15, "sun"),
            (16, "ocean"),
            (17, "jungle"),
            (18, "fancy"),
            (19, "poke-ball"),
        ],
    ),
    (669, &[(0, "red"), (1, "yellow"), (2, "orange"), (3, "blue"), (4, "white")]),
    (670, &[(0, "red"), (1, "yellow"), (2, "orange"), (3, "blue"), (4, "white")]),
    (671, &[(0, "red"), (1, "yellow"), (2, "orange"), (3, "blue"), (4, "white")]),
    (681, &[(0, "shield"), (1, "blade")]),
    (716, &[(0, "active")]),
    (718, &[(0, "50-percent"), (1, "10-percent"), (2, "complete")]),
    (719, &[(1, MEGA)]),
    (720, &[(0, "confined"), (1, "unbound")]),
    (741, &[(0, "baile"), (1, "pom-pom"), (2, "pau"), (3, "sensu")]),
    (745, &[(0, "midday"), (1, "midnight"), (2, "dusk")]),
    (746, &[(0, "solo"), (1, "school")]),
    (
        773,
        &[
            (1, "fighting"),
            (2, "flying"),
            (3, "poison"),
            (4, "ground"),
            (5, "rock"),
            (6, "bug"),
            (7, "ghost"),
            (8, "steel"),
            (10, "fire"),
            (11, "water"),
            (12, "grass"),
            (13, "electric"),
            (14, "psychic"),
            (15, "ice"),
            (16, "dragon"),
            (17, "dark"),
            (18, "fairy"),
        ],
    ),
    (
        774,
        &[
            (0, "meteor"),
            (1, "core-red"),
            (2, "core-orange"),
            (3, "core-yellow"),
            (4, "core-green"),
            (5, "core-blue"),
            (6, "core-indigo"),
            (7, "core-violet"),
        ],
    ),
    (778, &[(0, "disguised"), (1, "busted")]),
    (800, &[(1, "dusk-mane"), (2, "dawn-wings"), (3, "ultra")]),
    (801, &[(1, "original-color")]),
];

/// Raw file stem of alternate `k` of `index`.
fn raw_stem(index: u32, alternate: u32) -> String {
    if alternate == 0 {
        format!("{:03}", index)
    } else {
        format!("{:03}_{}", index, alternate)
    }
}

fn overrides() -> Result<PathOverrideTable> {
    let registry = registry();
    let mut entries: Vec<(String, OverrideValue)> = Vec::new();

    // File names are zero padded, so even normal forms need an entry
    for index in 1..=LAST_INDEX {
        if registry.get(index, NORMAL)?.is_some() {
            entries.push((raw_stem(index, 0), normal(index)?));
        }
    }

    for &(index, alternates) in ALTERNATES {
        for &(alternate, name) in alternates {
            entries.push((raw_stem(index, alternate), form(index, name)?));
        }
    }

    // The only file without zero padding
    entries.push(("53_1".to_string(), form(53, ALOLA)?));

    for index in [521, 592, 593, 668, 678] {
        entries.push((format!("{}-female", index), form(index, FEMALE)?));
    }

    // Size variants: keep the largest one only
    for index in [710, 711] {
        for alternate in 0..3 {
            entries.push((raw_stem(index, alternate), Dismiss));
        }
        entries.push((raw_stem(index, 3), normal(index)?));
    }

    PathOverrideTable::with_prefix(PREFIX, entries)
}

pub fn battlers() -> Result<SourceDefinition> {
    Ok(SourceDefinition::manual(
        "Battlers",
        "https://www.mediafire.com/folder/mi31mvoxx98ij/3D_Battlers",
        "3D Battlers [All].7z",
        "a282265f827aaf309f08c1be7ea98726de14bca942823ea85e6d7c77338d1205",
    )
    .sprite_set(
        SpriteSetConfig::new("Front", "*.png")
            .dest("3d-battlers-animated")
            .extra(&[
                ("Female/521.png", "521-female.png"),
                ("Female/592.png", "592-female.png"),
                ("Female/593.png", "593-female.png"),
                ("Female/668.png", "668-female.png"),
                ("Female/678.png", "678-female.png"),
            ])
            .post_process(PostProcessor::ExtractSheetFrames),
    )
    .overrides(overrides()?)
    .index_delimiter('_'))
}

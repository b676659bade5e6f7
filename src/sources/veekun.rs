//! veekun.com pokedex dumps: main sprites per generation, icons and
//! Sugimori artwork.

use anyhow::Result;

use super::{SourceDefinition, SpriteSetConfig as Set};
use crate::forms::{FEMALE, NORMAL};
use crate::overrides::{form, normal, OverrideValue, PathOverrideTable};
use crate::pipeline::post_process::{PostProcessor, WhitenTarget};

use OverrideValue::Dismiss;

pub fn gen1() -> Result<SourceDefinition> {
    Ok(SourceDefinition::http(
        "Gen1",
        "https://veekun.com/static/pokedex/downloads/generation-1.tar.gz",
        "2d0923f5abf1171b7e011b3ce9b879e8eee1fd56ec82dfbe597a2eafa63ca21c",
    )
    .sprite_set(Set::new("pokemon/main-sprites/red-blue", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/red-green", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/yellow", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/yellow/gbc", "*.png").dest("yellow-gbc")))
}

pub fn gen2() -> Result<SourceDefinition> {
    // Gen 2 Unown sprites carry no letter, except the animated Crystal one
    let overrides = PathOverrideTable::from_entries([
        ("gold/201", Dismiss),
        ("silver/201", Dismiss),
        ("crystal/201", Dismiss),
        ("crystal-animated/201", form(201, "u")?),
    ])?;

    Ok(SourceDefinition::http(
        "Gen2",
        "https://veekun.com/static/pokedex/downloads/generation-2.tar.gz",
        "1a01266008cf726df5d273da96ec3cbbbd3da0f17bfada4b0b153a4c92b4517a",
    )
    .sprite_set(Set::new("pokemon/main-sprites/gold", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/silver", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/crystal", "*.png"))
    .sprite_set(
        Set::new("pokemon/main-sprites/crystal/animated", "*.gif")
            .dest("crystal-animated")
            .post_process(PostProcessor::SplitFrames),
    )
    .overrides(overrides))
}

pub fn gen3() -> Result<SourceDefinition> {
    let overrides = PathOverrideTable::from_entries([
        ("ruby-sapphire/201", form(201, "j")?),
        ("ruby-sapphire/386-normal", normal(386)?),
        ("emerald/201", form(201, "j")?),
        ("emerald/386-normal", normal(386)?),
        ("emerald-animated/386-normal", normal(386)?),
        // empty images
        ("emerald-frame2/201*", Dismiss),
        ("emerald-frame2/327", Dismiss),
        ("emerald-frame2/351*", Dismiss),
        ("emerald-frame2/386*", Dismiss),
        ("firered-leafgreen/386-normal", normal(386)?),
    ])?;

    Ok(SourceDefinition::http(
        "Gen3",
        "https://veekun.com/static/pokedex/downloads/generation-3.tar.gz",
        "15b733baf9ef91fbde3ae957edb4d2ba75615601a515b41590ab87043370319c",
    )
    .sprite_set(Set::new("pokemon/main-sprites/ruby-sapphire", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/emerald", "*.png"))
    .sprite_set(
        Set::new("pokemon/main-sprites/emerald/animated", "*.gif")
            .dest("emerald-animated")
            .post_process(PostProcessor::SplitFrames),
    )
    .sprite_set(Set::new("pokemon/main-sprites/emerald/frame2", "*.png").dest("emerald-frame2"))
    .sprite_set(Set::new("pokemon/main-sprites/firered-leafgreen", "*.png"))
    .overrides(overrides))
}

/// Default forms for the entities that veekun stores without a form suffix
/// from generation 4 on.
fn gen4_defaults(set: &str) -> Result<Vec<(String, OverrideValue)>> {
    let defaults = [
        (386, NORMAL, "386-normal"),
        (412, "plant", "412"),
        (413, "plant", "413"),
        (421, "overcast", "421"),
        (487, "altered", "487"),
        (492, "land", "492"),
        (493, NORMAL, "493-normal"),
    ];
    let mut entries = Vec::new();
    for (index, name, stem) in defaults {
        entries.push((format!("{}/{}", set, stem), form(index, name)?));
    }
    entries.push((format!("{}/493-unknown", set), Dismiss));
    Ok(entries)
}

pub fn gen4() -> Result<SourceDefinition> {
    let mut overrides = PathOverrideTable::new();
    let mut add = |entries: Vec<(String, OverrideValue)>| -> Result<()> {
        for (pattern, value) in entries {
            overrides.insert(pattern, value)?;
        }
        Ok(())
    };

    add(vec![("diamond-pearl/201".into(), form(201, "a")?)])?;
    add(gen4_defaults("diamond-pearl")?)?;
    add(vec![
        ("diamond-pearl/422".into(), form(422, "west")?),
        ("diamond-pearl/423".into(), form(423, "west")?),
        // empty images
        ("diamond-pearl-frame2/201*".into(), Dismiss),
        // mixed forms
        ("diamond-pearl-frame2/422".into(), Dismiss),
        ("diamond-pearl-frame2/423".into(), Dismiss),
    ])?;
    add(gen4_defaults("diamond-pearl-frame2")?)?;

    add(vec![
        ("platinum/201".into(), form(201, "a")?),
        ("platinum/422".into(), form(422, "west")?),
        ("platinum/423".into(), form(423, "west")?),
    ])?;
    add(gen4_defaults("platinum")?)?;
    add(vec![
        // empty images
        ("platinum-frame2/201*".into(), Dismiss),
        ("platinum-frame2/351*".into(), Dismiss),
        ("platinum-frame2/386*".into(), Dismiss),
        ("platinum-frame2/422".into(), form(422, "west")?),
        ("platinum-frame2/423".into(), form(423, "west")?),
    ])?;
    add(gen4_defaults("platinum-frame2")?)?;

    for set in ["heartgold-soulsilver", "heartgold-soulsilver-frame2"] {
        add(vec![
            (format!("{}/422", set), form(422, "west")?),
            (format!("{}/423", set), form(423, "west")?),
            // no entity
            (format!("{}/egg", set), Dismiss),
            (format!("{}/egg-manaphy", set), Dismiss),
            (format!("{}/substitute", set), Dismiss),
        ])?;
        add(gen4_defaults(set)?)?;
    }
    add(vec![
        ("heartgold-soulsilver/201".into(), form(201, "a")?),
        ("heartgold-soulsilver/172-beta".into(), Dismiss),
        ("heartgold-soulsilver/412-beta".into(), Dismiss),
        ("heartgold-soulsilver/421-beta".into(), Dismiss),
        ("heartgold-soulsilver-frame2/201*".into(), Dismiss),
    ])?;

    Ok(SourceDefinition::http(
        "Gen4",
        "https://veekun.com/static/pokedex/downloads/generation-4.tar.gz",
        "b1b69463aac872b54adf56f1159e8e6d2dfcbbecb7d71c7ebf832fe44140da41",
    )
    .sprite_set(Set::new("pokemon/main-sprites/diamond-pearl", "*.png"))
    .sprite_set(
        Set::new("pokemon/main-sprites/diamond-pearl/frame2", "*.png").dest("diamond-pearl-frame2"),
    )
    .sprite_set(Set::new("pokemon/main-sprites/platinum", "*.png"))
    .sprite_set(Set::new("pokemon/main-sprites/platinum/frame2", "*.png").dest("platinum-frame2"))
    .sprite_set(Set::new("pokemon/main-sprites/heartgold-soulsilver", "*.png"))
    .sprite_set(
        Set::new("pokemon/main-sprites/heartgold-soulsilver/frame2", "*.png")
            .dest("heartgold-soulsilver-frame2"),
    )
    .overrides(overrides))
}

/// Unown letters in Black/White sit on a black background. Most only need
/// the corner filled; the rest have enclosed pockets with extra seeds.
fn black_white_unown_targets() -> Vec<WhitenTarget> {
    let corner_only = [
        "d",
        "e",
        "exclamation",
        "h",
        "i",
        "j",
        "k",
        "l",
        "m",
        "n",
        "p",
        "q",
        "question",
        "r",
        "s",
        "t",
        "w",
        "x",
        "y",
        "z",
    ];
    let mut targets: Vec<_> = corner_only
        .iter()
        .map(|letter| WhitenTarget::new(format!("201-{}", letter)))
        .collect();

    // 201-a ships as plain "201"
    targets.push(WhitenTarget::with_seeds("201", &[(0, 0), (48, 55)]));
    targets.push(WhitenTarget::with_seeds("201-b", &[(0, 0), (47, 56)]));
    targets.push(WhitenTarget::with_seeds(
        "201-c",
        &[(0, 0), (47, 36), (38, 45), (39, 41), (43, 54)],
    ));
    targets.push(WhitenTarget::with_seeds("201-f", &[(0, 0), (55, 44)]));
    targets.push(WhitenTarget::with_seeds("201-g", &[(0, 0), (48, 35)]));
    targets.push(WhitenTarget::with_seeds("201-o", &[(0, 0), (47, 38)]));
    targets.push(WhitenTarget::with_seeds("201-u", &[(0, 0), (43, 54), (51, 55)]));
    targets.push(WhitenTarget::with_seeds("201-v", &[(0, 0), (46, 40)]));
    targets
}

/// Entities listed by bare index although they have no normal form.
fn bare_index_defaults(set: &str) -> Result<Vec<(String, OverrideValue)>> {
    let defaults = [
        (412, "plant"),
        (413, "plant"),
        (421, "overcast"),
        (422, "west"),
        (423, "west"),
        (487, "altered"),
        (492, "land"),
        (550, "red-striped"),
        (585, "spring"),
        (586, "spring"),
        (641, "incarnate"),
        (642, "incarnate"),
        (645, "incarnate"),
        (647, "ordinary"),
        (648, "aria"),
    ];
    let mut entries = Vec::new();
    for (index, name) in defaults {
        entries.push((format!("{}/{}", set, index), form(index, name)?));
    }
    Ok(entries)
}

pub fn gen5() -> Result<SourceDefinition> {
    let mut overrides = PathOverrideTable::from_entries([
        // no entity
        ("black-white/0".to_string(), Dismiss),
        ("black-white/201".to_string(), form(201, "a")?),
        ("black-white/386-normal".to_string(), normal(386)?),
        ("black-white/493-normal".to_string(), normal(493)?),
        ("black-white/555".to_string(), normal(555)?),
        ("black-white/555-standard".to_string(), normal(555)?),
        ("black-white/555-zen".to_string(), form(555, "zen")?),
        ("black-white/egg".to_string(), Dismiss),
        ("black-white/egg-manaphy".to_string(), Dismiss),
        ("black-white/substitute".to_string(), Dismiss),
    ])?;
    for (pattern, value) in bare_index_defaults("black-white")? {
        overrides.insert(pattern, value)?;
    }

    Ok(SourceDefinition::http(
        "Gen5",
        "https://veekun.com/static/pokedex/downloads/generation-5.tar.gz",
        "ee037a3319b2a6143c5c90f679be13a06126c2f5424e46023fe0f53d2631aa62",
    )
    .sprite_set(
        Set::new("pokemon/main-sprites/black-white", "*.png")
            .extra(&[
                ("female/521.png", "521-female.png"),
                ("female/592.png", "592-female.png"),
                ("female/593.png", "593-female.png"),
            ])
            .post_process(PostProcessor::WhitenAreas(black_white_unown_targets())),
    )
    .overrides(overrides))
}

/// Pikachu costume names as veekun spells them.
fn cosplay_overrides(set: &str) -> Result<Vec<(String, OverrideValue)>> {
    let costumes = [
        ("cosplay", "cosplay"),
        ("rock-star", "cosplay-rock-star"),
        ("belle", "cosplay-belle"),
        ("pop-star", "cosplay-pop-star"),
        ("phd", "cosplay-phd"),
        ("libre", "cosplay-libre"),
    ];
    let mut entries = Vec::new();
    for (file, name) in costumes {
        entries.push((format!("{}/25-{}", set, file), form(25, name)?));
    }
    Ok(entries)
}

pub fn icons() -> Result<SourceDefinition> {
    let mut overrides = PathOverrideTable::new();
    for (pattern, value) in cosplay_overrides("icons")? {
        overrides.insert(pattern, value)?;
    }
    overrides.insert("icons/201", form(201, "a")?)?;
    overrides.insert("icons/386-normal", normal(386)?)?;
    for (pattern, value) in bare_index_defaults("icons")? {
        overrides.insert(pattern, value)?;
    }
    let rest = [
        // type forms that look exactly like the normal form
        ("icons/493-*", Dismiss),
        ("icons/649-*", Dismiss),
        ("icons/555", normal(555)?),
        ("icons/555-standard", normal(555)?),
        ("icons/555-zen", form(555, "zen")?),
        ("icons/666", form(666, "meadow")?),
        ("icons/669", form(669, "red")?),
        ("icons/670", form(670, "red")?),
        ("icons/670-eternal", Dismiss),
        ("icons/671", form(671, "red")?),
        ("icons/676", normal(676)?),
        ("icons/676-natural", normal(676)?),
        ("icons/678-male", normal(678)?),
        ("icons/678-female", form(678, FEMALE)?),
        ("icons/681", form(681, "shield")?),
        // size variants
        ("icons/710-*", Dismiss),
        ("icons/711-*", Dismiss),
        ("icons/716", form(716, "active")?),
        ("icons/718", form(718, "50-percent")?),
        ("icons/720", form(720, "confined")?),
        ("icons/egg", Dismiss),
    ];
    for (pattern, value) in rest {
        overrides.insert(pattern, value)?;
    }

    Ok(SourceDefinition::http(
        "Icons",
        "https://veekun.com/static/pokedex/downloads/pokemon-icons.tar.gz",
        "f9850ce82d8e6e69c163112c47553458fd27805034217a5331a1ae12b2a1c8ac",
    )
    .sprite_set(Set::new("pokemon/icons", "*.png").extra(&[
        ("female/521.png", "521-female.png"),
        ("female/592.png", "592-female.png"),
        ("female/593.png", "593-female.png"),
        ("female/668.png", "668-female.png"),
        ("female/678.png", "678-female.png"),
    ]))
    .overrides(overrides))
}

pub fn sugimori() -> Result<SourceDefinition> {
    let mut overrides = PathOverrideTable::new();
    for (pattern, value) in cosplay_overrides("sugimori")? {
        overrides.insert(pattern, value)?;
    }
    let explicit = [
        ("sugimori/201-f", form(201, "f")?),
        ("sugimori/201", form(201, "f")?),
        ("sugimori/386-normal", normal(386)?),
        // artwork shows the sunshine/east variants
        ("sugimori/421", form(421, "sunshine")?),
        ("sugimori/422", form(422, "east")?),
        ("sugimori/423", form(423, "east")?),
        ("sugimori/493-normal", normal(493)?),
        ("sugimori/555", normal(555)?),
        ("sugimori/555-standard", normal(555)?),
        ("sugimori/666", form(666, "meadow")?),
        ("sugimori/669", form(669, "red")?),
        ("sugimori/670", form(670, "red")?),
        ("sugimori/671", form(671, "red")?),
        ("sugimori/676", normal(676)?),
        ("sugimori/678", normal(678)?),
        // both forms in one image
        ("sugimori/681", Dismiss),
        ("sugimori/716", form(716, "active")?),
        ("sugimori/718", form(718, "50-percent")?),
        ("sugimori/720", form(720, "confined")?),
    ];
    for (pattern, value) in explicit {
        overrides.insert(pattern, value)?;
    }
    for (pattern, value) in bare_index_defaults("sugimori")? {
        if !overrides.contains(&pattern) {
            overrides.insert(pattern, value)?;
        }
    }

    Ok(SourceDefinition::http(
        "Sugimori",
        "https://veekun.com/static/pokedex/downloads/pokemon-sugimori.tar.gz",
        "9dcb5ab803725db99ec235df72da9cc20e96ac843d88394cff95a6b0bb06da16",
    )
    .sprite_set(Set::new("pokemon/sugimori", "*.png").extra(&[
        ("female/521.png", "521-female.png"),
        ("female/592.png", "592-female.png"),
        ("female/593.png", "593-female.png"),
        ("female/668.png", "668-female.png"),
    ]))
    .overrides(overrides))
}

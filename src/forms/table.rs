//! Hand-authored list of entities with more than one visual form.
//!
//! Entities missing from this table only have the implicit normal form.
//! The table is ground truth; nothing here is validated beyond the
//! uniqueness checks the registry performs when it is built.
//!
//! Gender variants are only listed from generation 5 on, where male and
//! female sprites start to differ noticeably (521, 592, 593, 668, 678).
//! Size variants (710, 711) are not forms for this dataset.

use super::{ALOLA, FEMALE, GALAR, GIGANTAMAX, HISUI, MEGA, MEGA_X, MEGA_Y};

/// Whether the implicit normal form is inserted in front of the listed forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Base {
    WithNormal,
    NoNormal,
}

use Base::{NoNormal, WithNormal};

pub(super) const HIGHEST_INDEX: u32 = 898;

pub(super) const ENTRIES: &[(u32, Base, &[&str])] = &[
    (3, WithNormal, &[MEGA, GIGANTAMAX]),          // Venusaur
    (6, WithNormal, &[MEGA_X, MEGA_Y, GIGANTAMAX]), // Charizard
    (9, WithNormal, &[MEGA, GIGANTAMAX]),          // Blastoise
    (12, WithNormal, &[GIGANTAMAX]),               // Butterfree
    (15, WithNormal, &[MEGA]),                     // Beedrill
    (18, WithNormal, &[MEGA]),                     // Pidgeot
    (19, WithNormal, &[ALOLA]),                    // Rattata
    (20, WithNormal, &[ALOLA]),                    // Raticate
    (
        25,
        WithNormal,
        &[
            GIGANTAMAX,
            "cosplay",
            "cosplay-rock-star",
            "cosplay-belle",
            "cosplay-pop-star",
            "cosplay-phd",
            "cosplay-libre",
            "cap-original",
            "cap-hoenn",
            "cap-sinnoh",
            "cap-unova",
            "cap-kalos",
            "cap-alola",
            "cap-partner",
            "cap-world",
        ],
    ), // Pikachu
    (26, WithNormal, &[ALOLA]),                    // Raichu
    (27, WithNormal, &[ALOLA]),                    // Sandshrew
    (28, WithNormal, &[ALOLA]),                    // Sandslash
    (37, WithNormal, &[ALOLA]),                    // Vulpix
    (38, WithNormal, &[ALOLA]),                    // Ninetales
    (50, WithNormal, &[ALOLA]),                    // Diglett
    (51, WithNormal, &[ALOLA]),                    // Dugtrio
    (52, WithNormal, &[ALOLA, GALAR, GIGANTAMAX]), // Meowth
    (53, WithNormal, &[ALOLA]),                    // Persian
    (58, WithNormal, &[HISUI]),                    // Growlithe
    (65, WithNormal, &[MEGA]),                     // Alakazam
    (68, WithNormal, &[GIGANTAMAX]),               // Machamp
    (74, WithNormal, &[ALOLA]),                    // Geodude
    (75, WithNormal, &[ALOLA]),                    // Graveler
    (76, WithNormal, &[ALOLA]),                    // Golem
    (77, WithNormal, &[GALAR]),                    // Ponyta
    (78, WithNormal, &[GALAR]),                    // Rapidash
    (79, WithNormal, &[GALAR]),                    // Slowpoke
    (80, WithNormal, &[MEGA, GALAR]),              // Slowbro
    (83, WithNormal, &[GALAR]),                    // Farfetch'd
    (88, WithNormal, &[ALOLA]),                    // Grimer
    (89, WithNormal, &[ALOLA]),                    // Muk
    (94, WithNormal, &[MEGA, GIGANTAMAX]),         // Gengar
    (99, WithNormal, &[GIGANTAMAX]),               // Kingler
    (103, WithNormal, &[ALOLA]),                   // Exeggutor
    (105, WithNormal, &[ALOLA]),                   // Marowak
    (110, WithNormal, &[GALAR]),                   // Weezing
    (115, WithNormal, &[MEGA]),                    // Kangaskhan
    (122, WithNormal, &[GALAR]),                   // Mr. Mime
    (127, WithNormal, &[MEGA]),                    // Pinsir
    (130, WithNormal, &[MEGA]),                    // Gyarados
    (131, WithNormal, &[GIGANTAMAX]),              // Lapras
    (133, WithNormal, &[GIGANTAMAX]),              // Eevee
    (142, WithNormal, &[MEGA]),                    // Aerodactyl
    (143, WithNormal, &[GIGANTAMAX]),              // Snorlax
    (144, WithNormal, &[GALAR]),                   // Articuno
    (145, WithNormal, &[GALAR]),                   // Zapdos
    (146, WithNormal, &[GALAR]),                   // Moltres
    (150, WithNormal, &[MEGA_X, MEGA_Y]),          // Mewtwo
    (172, WithNormal, &["spiky-eared"]),           // Pichu
    (181, WithNormal, &[MEGA]),                    // Ampharos
    (199, WithNormal, &[GALAR]),                   // Slowking
    (
        201,
        NoNormal,
        &[
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
            "r", "s", "t", "u", "v", "w", "x", "y", "z", "exclamation", "question",
        ],
    ), // Unown
    (208, WithNormal, &[MEGA]),                    // Steelix
    (212, WithNormal, &[MEGA]),                    // Scizor
    (214, WithNormal, &[MEGA]),                    // Heracross
    (222, WithNormal, &[GALAR]),                   // Corsola
    (229, WithNormal, &[MEGA]),                    // Houndoom
    (248, WithNormal, &[MEGA]),                    // Tyranitar
    (254, WithNormal, &[MEGA]),                    // Sceptile
    (257, WithNormal, &[MEGA]),                    // Blaziken
    (260, WithNormal, &[MEGA]),                    // Swampert
    (263, WithNormal, &[GALAR]),                   // Zigzagoon
    (264, WithNormal, &[GALAR]),                   // Linoone
    (282, WithNormal, &[MEGA]),                    // Gardevoir
    (302, WithNormal, &[MEGA]),                    // Sableye
    (303, WithNormal, &[MEGA]),                    // Mawile
    (306, WithNormal, &[MEGA]),                    // Aggron
    (308, WithNormal, &[MEGA]),                    // Medicham
    (310, WithNormal, &[MEGA]),                    // Manectric
    (319, WithNormal, &[MEGA]),                    // Sharpedo
    (323, WithNormal, &[MEGA]),                    // Camerupt
    (334, WithNormal, &[MEGA]),                    // Altaria
    (351, WithNormal, &["sunny", "rainy", "snowy"]), // Castform
    (354, WithNormal, &[MEGA]),                    // Banette
    (359, WithNormal, &[MEGA]),                    // Absol
    (362, WithNormal, &[MEGA]),                    // Glalie
    (373, WithNormal, &[MEGA]),                    // Salamence
    (376, WithNormal, &[MEGA]),                    // Metagross
    (380, WithNormal, &[MEGA]),                    // Latias
    (381, WithNormal, &[MEGA]),                    // Latios
    (382, WithNormal, &["primal"]),                // Kyogre
    (383, WithNormal, &["primal"]),                // Groudon
    (384, WithNormal, &[MEGA]),                    // Rayquaza
    (386, WithNormal, &["attack", "defense", "speed"]), // Deoxys
    (412, NoNormal, &["plant", "sandy", "trash"]), // Burmy
    (413, NoNormal, &["plant", "sandy", "trash"]), // Wormadam
    (421, NoNormal, &["overcast", "sunshine"]),    // Cherrim
    (422, NoNormal, &["east", "west"]),            // Shellos
    (423, NoNormal, &["east", "west"]),            // Gastrodon
    (428, WithNormal, &[MEGA]),                    // Lopunny
    (445, WithNormal, &[MEGA]),                    // Garchomp
    (448, WithNormal, &[MEGA]),                    // Lucario
    (460, WithNormal, &[MEGA]),                    // Abomasnow
    (475, WithNormal, &[MEGA]),                    // Gallade
    (479, WithNormal, &["fan", "frost", "heat", "mow", "wash"]), // Rotom
    (487, NoNormal, &["altered", "origin"]),       // Giratina
    (492, NoNormal, &["land", "sky"]),             // Shaymin
    (
        493,
        WithNormal,
        &[
            "bug", "dark", "dragon", "electric", "fighting", "fire", "flying", "ghost", "grass",
            "ground", "ice", "fairy", "poison", "psychic", "rock", "steel", "water",
        ],
    ), // Arceus
    (521, WithNormal, &[FEMALE]),                  // Unfezant
    (531, WithNormal, &[MEGA]),                    // Audino
    (550, NoNormal, &["blue-striped", "red-striped"]), // Basculin
    (554, WithNormal, &[GALAR]),                   // Darumaka
    (555, WithNormal, &["zen", GALAR, "galar-zen"]), // Darmanitan
    (569, WithNormal, &[GIGANTAMAX]),              // Garbodor
    (585, NoNormal, &["spring", "summer", "autumn", "winter"]), // Deerling
    (586, NoNormal, &["spring", "summer", "autumn", "winter"]), // Sawsbuck
    (592, WithNormal, &[FEMALE]),                  // Frillish
    (593, WithNormal, &[FEMALE]),                  // Jellicent
    (628, WithNormal, &[HISUI]),                   // Braviary
    (641, NoNormal, &["incarnate", "therian"]),    // Tornadus
    (642, NoNormal, &["incarnate", "therian"]),    // Thundurus
    (643, WithNormal, &["overdrive"]),             // Reshiram
    (644, WithNormal, &["overdrive"]),             // Zekrom
    (645, NoNormal, &["incarnate", "therian"]),    // Landorus
    (
        646,
        WithNormal,
        &["black", "black-overdrive", "white", "white-overdrive"],
    ), // Kyurem
    (647, NoNormal, &["ordinary", "resolute"]),    // Keldeo
    (648, NoNormal, &["aria", "pirouette"]),       // Meloetta
    (649, WithNormal, &["burn", "chill", "douse", "shock"]), // Genesect
    (658, WithNormal, &["ash"]),                   // Greninja
    (
        666,
        WithNormal,
        &[
            "archipelago", "continental", "elegant", "fancy", "garden", "high-plains", "icy-snow",
            "jungle", "marine", "meadow", "modern", "monsoon", "ocean", "poke-ball", "polar",
            "river", "sandstorm", "savanna", "sun", "tundra",
        ],
    ), // Vivillon
    (668, WithNormal, &[FEMALE]),                  // Pyroar
    (669, NoNormal, &["blue", "orange", "red", "white", "yellow"]), // Flabébé
    (670, WithNormal, &["blue", "orange", "red", "white", "yellow", "az"]), // Floette
    (671, WithNormal, &["blue", "orange", "red", "white", "yellow"]), // Florges
    (
        676,
        WithNormal,
        &[
            "dandy", "debutante", "diamond", "heart", "kabuki", "la-reine", "matron", "pharaoh",
            "star",
        ],
    ), // Furfrou
    (678, WithNormal, &[FEMALE]),                  // Meowstic
    (681, NoNormal, &["blade", "shield"]),         // Aegislash
    (716, NoNormal, &["active", "neutral"]),       // Xerneas
    (
        718,
        NoNormal,
        &["cell", "core", "10-percent", "50-percent", "complete"],
    ), // Zygarde
    (719, WithNormal, &[MEGA]),                    // Diancie
    (720, NoNormal, &["confined", "unbound"]),     // Hoopa
    (741, NoNormal, &["baile", "pau", "pom-pom", "sensu"]), // Oricorio
    (745, NoNormal, &["dusk", "midday", "midnight"]), // Lycanroc
    (746, NoNormal, &["solo", "school"]),          // Wishiwashi
    (
        773,
        WithNormal,
        &[
            "bug", "dark", "dragon", "electric", "fairy", "fighting", "fire", "flying", "ghost",
            "grass", "ground", "ice", "poison", "psychic", "rock", "steel", "water",
        ],
    ), // Silvally
    (774, NoNormal, &["meteor"]),                  // Minior, cores in COLOR_ONLY
    (778, NoNormal, &["busted", "disguised"]),     // Mimikyu
    (791, WithNormal, &["radiant-sun"]),           // Solgaleo
    (792, WithNormal, &["full-moon"]),             // Lunala
    (800, WithNormal, &["dusk-mane", "dawn-wings", "ultra"]), // Necrozma
    (801, WithNormal, &["original-color"]),        // Magearna
    (802, WithNormal, &["zenith"]),                // Marshadow
    (809, WithNormal, &[GIGANTAMAX]),              // Melmetal
    (812, WithNormal, &[GIGANTAMAX]),              // Rillaboom
    (815, WithNormal, &[GIGANTAMAX]),              // Cinderace
    (818, WithNormal, &[GIGANTAMAX]),              // Inteleon
    (823, WithNormal, &[GIGANTAMAX]),              // Corviknight
    (826, WithNormal, &[GIGANTAMAX]),              // Orbeetle
    (834, WithNormal, &[GIGANTAMAX]),              // Drednaw
    (839, WithNormal, &[GIGANTAMAX]),              // Coalossal
    (841, WithNormal, &[GIGANTAMAX]),              // Flapple
    (842, WithNormal, &[GIGANTAMAX]),              // Appletun
    (844, WithNormal, &[GIGANTAMAX]),              // Sandaconda
    (845, WithNormal, &["gorging", "gulping"]),    // Cramorant
    (849, NoNormal, &[GIGANTAMAX, "amped", "low-key"]), // Toxtricity
    (851, WithNormal, &[GIGANTAMAX]),              // Centiskorch
    (854, NoNormal, &["antique", "phony"]),        // Sinistea
    (855, NoNormal, &["antique", "phony"]),        // Polteageist
    (858, WithNormal, &[GIGANTAMAX]),              // Hatterene
    (861, WithNormal, &[GIGANTAMAX]),              // Grimmsnarl
    (869, NoNormal, &[GIGANTAMAX]),                // Alcremie, flavors generated
    (875, NoNormal, &["ice-face", "noice-face"]),  // Eiscue
    (877, NoNormal, &["full-belly", "hangry"]),    // Morpeko
    (879, WithNormal, &[GIGANTAMAX]),              // Copperajah
    (884, WithNormal, &[GIGANTAMAX]),              // Duraludon
    (888, NoNormal, &["hero-of-many-battles", "crowned-sword"]), // Zacian
    (889, NoNormal, &["hero-of-many-battles", "crowned-shield"]), // Zamazenta
    (890, WithNormal, &["eternamax"]),             // Eternatus
    (892, NoNormal, &[GIGANTAMAX, "single-strike", "rapid-strike"]), // Urshifu
    (893, WithNormal, &["dada"]),                  // Zarude
    (898, WithNormal, &["ice-rider", "shadow-rider"]), // Calyrex
];

/// Forms appended after an entry's regular forms, flagged as recolors.
pub(super) const COLOR_ONLY: &[(u32, &[&str])] = &[(
    774,
    &[
        "core-blue",
        "core-green",
        "core-indigo",
        "core-orange",
        "core-red",
        "core-violet",
        "core-yellow",
    ],
)];

/// Alcremie's cream × sweet combinations, appended as recolors of 869.
pub(super) const ALCREMIE_INDEX: u32 = 869;

pub(super) const ALCREMIE_CREAMS: &[&str] = &[
    "vanilla-cream",
    "ruby-cream",
    "matcha-cream",
    "mint-cream",
    "lemon-cream",
    "salted-cream",
    "ruby-swirl",
    "caramel-swirl",
    "rainbow-swirl",
];

pub(super) const ALCREMIE_SWEETS: &[&str] = &[
    "strawberry-sweet",
    "love-sweet",
    "berry-sweet",
    "clover-sweet",
    "flower-sweet",
    "star-sweet",
    "ribbon-sweet",
];

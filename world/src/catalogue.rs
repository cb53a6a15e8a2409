//! Built-in level progression.

use crate::level::{LevelDefinition, LevelError};

struct Layout {
    size: usize,
    rows: &'static [&'static str],
    par: u32,
    description: &'static str,
}

const LAYOUTS: &[Layout] = &[
    Layout {
        size: 4,
        rows: &["....", "S-L.", "..LE", "...."],
        par: 4,
        description: "Guide the light.",
    },
    Layout {
        size: 4,
        rows: &["S-L.", "..|.", "..LE", "...."],
        par: 6,
        description: "S-Bends.",
    },
    Layout {
        size: 5,
        rows: &["SL...", ".LL..", "..LL.", "...LL", "....E"],
        par: 8,
        description: "Stairway.",
    },
    Layout {
        size: 5,
        rows: &["S-L..", "..L-L", "....|", "..L-L", "..E.."],
        par: 10,
        description: "Zig Zag.",
    },
    Layout {
        size: 5,
        rows: &["S-L..", "..+..", "..L-E", ".....", "....."],
        par: 8,
        description: "Crossovers.",
    },
    Layout {
        size: 5,
        rows: &["S-A..", "..|..", "..L-A", "....|", "....E"],
        par: 8,
        description: "Quantum Sync.",
    },
    Layout {
        size: 5,
        rows: &["....E", "S-C-A", ".....", ".....", "....."],
        par: 8,
        description: "Aligned Phases.",
    },
    Layout {
        size: 5,
        rows: &["S-A..", "..L-A", "....|", "....E", "....."],
        par: 12,
        description: "Staircase Sync.",
    },
    Layout {
        size: 6,
        rows: &["S-L...", "..|...", "..C...", "..|...", "..A-E.", "......"],
        par: 14,
        description: "Quantum Tunneling.",
    },
    Layout {
        size: 6,
        rows: &["S-L...", "..|...", "..L-L.", "....+.", "....LE", "......"],
        par: 15,
        description: "Long Path.",
    },
    Layout {
        size: 6,
        rows: &["S-J...", "..@...", "......", "..@...", "..L-7.", "....E."],
        par: 12,
        description: "Wormhole.",
    },
    Layout {
        size: 6,
        rows: &["S---@.", "....|.", ".@--J.", ".|....", ".L--7.", "....E."],
        par: 14,
        description: "Portal Maze.",
    },
    Layout {
        size: 6,
        rows: &["S-A-@.", "....|.", "..@-J.", "..|...", "..L-7.", "....E."],
        par: 16,
        description: "Alpha Jump.",
    },
    Layout {
        size: 6,
        rows: &["S-*...", "....|.", "..G-L.", "..|...", "..L-E.", "......"],
        par: 8,
        description: "Logic Gate: hit the switch to open the fence.",
    },
    Layout {
        size: 6,
        rows: &["S-L...", "..G-@.", "..*...", "......", "..@-L.", "....E."],
        par: 10,
        description: "Sequence.",
    },
    Layout {
        size: 6,
        rows: &["S-J...", "..*...", "L-G-7.", "|.....", "L---E."],
        par: 12,
        description: "U-Turn.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-L...L",
            "..|...|",
            "..*-G.|",
            "....|.|",
            "L-G.|.|",
            "|...L-L",
            "L-L...E",
        ],
        par: 20,
        description: "Binary Path.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-A-@.A",
            "..|...|",
            "..G-A.|",
            "..*...|",
            "A-A.|.|",
            "|...A-A",
            "A-A...E",
        ],
        par: 22,
        description: "Quantum Logic.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-L....",
            "..A...*",
            "..L-G.|",
            "....|.|",
            "B...|.|",
            "L---B.|",
            "......E",
        ],
        par: 16,
        description: "Locked Sector.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-*-G-D",
            "......|",
            "......D",
            "......|",
            "......D",
            "......|",
            "C-C-C-E",
        ],
        par: 14,
        description: "Power Grid.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-L.L-L",
            "..|.|..",
            "..L+L..",
            "...*...",
            "..G+L..",
            "..|.|..",
            "L-L.L-E",
        ],
        par: 25,
        description: "System Core.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-A.A-A",
            "..|.|..",
            "*-G.A-B",
            "|.....|",
            "B-A.A-B",
            "..|.|..",
            "..A.A-E",
        ],
        par: 30,
        description: "Firewall.",
    },
    Layout {
        size: 7,
        rows: &[
            "#.#V#.#",
            "#.#*#.#",
            "#.G.B.#",
            "#.A.A.#",
            "#.B.B.#",
            "#.#A#.#",
            "#.#E#.#",
        ],
        par: 20,
        description: "Pressure Plate.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-C-C-L",
            "|.....|",
            "*-G-C-C",
            "......|",
            "......C",
            "......|",
            "......E",
        ],
        par: 10,
        description: "Direct Current.",
    },
    Layout {
        size: 7,
        rows: &[
            "S...*..",
            "....G..",
            "....L-L",
            "......|",
            "L-L-L-L",
            "|......",
            "L-----E",
        ],
        par: 15,
        description: "Long Loop.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-A-*-A",
            "|...G.|",
            "B.....B",
            "|.....|",
            "A.....A",
            "|.....|",
            "L.....E",
        ],
        par: 22,
        description: "Outer Logic.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-A-*-C",
            "|.+.G.|",
            "C.+.+.C",
            "|.+.+.|",
            "B.+.+.B",
            "|.+.+.|",
            "L-C-D-E",
        ],
        par: 20,
        description: "Interference.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-*-G-L",
            "|.....|",
            "L-C-C-L",
            "......|",
            "L-C-C-L",
            "|......",
            "L-C-C-E",
        ],
        par: 25,
        description: "The Spiral V2.",
    },
    Layout {
        size: 7,
        rows: &[
            "S-A-A-A",
            "|.B-*-|",
            "|.|.G.|",
            "|.L-C.|",
            "|...|.|",
            "|.B-B.|",
            "A-A-A-E",
        ],
        par: 30,
        description: "Deep Logic.",
    },
    Layout {
        size: 7,
        rows: &[
            "S.A.B.A",
            ".C.D.C.",
            "A.B.A.B",
            ".D.+.D.",
            "B.A.B.A",
            ".C.D.C.",
            "A.B.A.E",
        ],
        par: 40,
        description: "End of Loop.",
    },
];

/// Number of built-in levels.
#[must_use]
pub fn len() -> usize {
    LAYOUTS.len()
}

/// Returns the built-in level with the provided one-based number.
pub fn level(number: u32) -> Option<Result<LevelDefinition, LevelError>> {
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    let layout = LAYOUTS.get(index)?;
    Some(LevelDefinition::from_layout(
        number,
        layout.size,
        layout.rows,
        layout.par,
        layout.description,
    ))
}

//! Mapping from board cell codes to their display attributes.

/// Every cell code the game server is known to emit, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Tank1,
    Tank2,
    Wall,
    DamagedWall,
    Mine,
    Shell,
    Empty,
    /// A code outside the known set, kept so it is visible instead of blank.
    Unknown(char),
}

/// All known kinds, in the order the board legend lists them.
pub const KNOWN_KINDS: [CellKind; 7] = [
    CellKind::Tank1,
    CellKind::Tank2,
    CellKind::Wall,
    CellKind::DamagedWall,
    CellKind::Mine,
    CellKind::Shell,
    CellKind::Empty,
];

impl CellKind {
    /// Classify a raw code from the server. Never fails; codes outside the
    /// known set become [`CellKind::Unknown`].
    pub fn from_code(code: char) -> Self {
        match code {
            '1' => CellKind::Tank1,
            '2' => CellKind::Tank2,
            '#' => CellKind::Wall,
            '$' => CellKind::DamagedWall,
            '@' => CellKind::Mine,
            '*' => CellKind::Shell,
            ' ' => CellKind::Empty,
            other => CellKind::Unknown(other),
        }
    }

    /// The code this kind is sent as.
    pub fn code(self) -> char {
        match self {
            CellKind::Tank1 => '1',
            CellKind::Tank2 => '2',
            CellKind::Wall => '#',
            CellKind::DamagedWall => '$',
            CellKind::Mine => '@',
            CellKind::Shell => '*',
            CellKind::Empty => ' ',
            CellKind::Unknown(c) => c,
        }
    }

    /// Emoji glyph used by the board view. Empty cells have none.
    pub fn glyph(self) -> &'static str {
        match self {
            CellKind::Tank1 => "🟦",
            CellKind::Tank2 => "🟩",
            CellKind::Wall => "⬛",
            CellKind::DamagedWall => "🧱",
            CellKind::Mine => "⛳",
            CellKind::Shell => "💥",
            CellKind::Empty => "",
            CellKind::Unknown(_) => "❔",
        }
    }

    /// Tooltip text describing the cell.
    pub fn title(self) -> &'static str {
        match self {
            CellKind::Tank1 => "Player 1 Tank",
            CellKind::Tank2 => "Player 2 Tank",
            CellKind::Wall => "Wall",
            CellKind::DamagedWall => "Damaged Wall",
            CellKind::Mine => "Mine",
            CellKind::Shell => "Shell",
            CellKind::Empty => "Empty",
            CellKind::Unknown(_) => "Unknown",
        }
    }

    /// Style class name; the terminal front end keys its colours on this.
    pub fn style_class(self) -> &'static str {
        match self {
            CellKind::Tank1 => "tank1",
            CellKind::Tank2 => "tank2",
            CellKind::Wall => "wall",
            CellKind::DamagedWall => "weak",
            CellKind::Mine => "mine",
            CellKind::Shell => "shell",
            CellKind::Empty => "empty",
            CellKind::Unknown(_) => "unknown",
        }
    }
}

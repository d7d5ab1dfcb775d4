//! Built-in grid layouts

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{cell::Cell, grid::Grid};
use crate::{Error, Result};

/// Named built-in grids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPreset {
    /// 4x4 with two walls and one pit
    #[default]
    Small,
    /// 6x6 with six walls and three pits
    Standard,
}

impl GridPreset {
    pub const ALL: [GridPreset; 2] = [GridPreset::Small, GridPreset::Standard];

    pub fn as_str(self) -> &'static str {
        match self {
            GridPreset::Small => "small",
            GridPreset::Standard => "standard",
        }
    }

    /// The other preset, for flipping between grid sizes
    pub fn toggled(self) -> GridPreset {
        match self {
            GridPreset::Small => GridPreset::Standard,
            GridPreset::Standard => GridPreset::Small,
        }
    }

    pub fn grid(self) -> Grid {
        match self {
            GridPreset::Small => small_grid(),
            GridPreset::Standard => standard_grid(),
        }
    }
}

impl fmt::Display for GridPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "4x4" => Ok(GridPreset::Small),
            "standard" | "6x6" => Ok(GridPreset::Standard),
            _ => Err(Error::UnknownPreset {
                name: s.to_string(),
                expected: "small, standard".to_string(),
            }),
        }
    }
}

fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
    coords.iter().copied().map(Cell::from).collect()
}

fn preset(
    name: &str,
    size: usize,
    walls: &[(usize, usize)],
    pits: &[(usize, usize)],
) -> Grid {
    let grid = Grid::new(
        name,
        size,
        size,
        Cell::new(0, 0),
        Cell::new(size - 1, size - 1),
        cells(walls),
        cells(pits),
    );
    match grid {
        Ok(grid) => grid,
        // Preset layouts are fixed data covered by tests.
        Err(err) => unreachable!("built-in grid '{name}' is invalid: {err}"),
    }
}

/// 4x4 grid: start (0,0), goal (3,3), walls (1,1) (2,1), pit (2,2)
pub fn small_grid() -> Grid {
    preset("Small (4x4)", 4, &[(1, 1), (2, 1)], &[(2, 2)])
}

/// 6x6 grid: start (0,0), goal (5,5)
pub fn standard_grid() -> Grid {
    preset(
        "Standard (6x6)",
        6,
        &[(1, 1), (2, 1), (3, 1), (3, 3), (4, 3), (1, 4)],
        &[(4, 1), (2, 3), (0, 5)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_build() {
        let small = GridPreset::Small.grid();
        assert_eq!((small.rows(), small.cols()), (4, 4));
        assert_eq!(small.walls().len(), 2);
        assert_eq!(small.pits().len(), 1);

        let standard = GridPreset::Standard.grid();
        assert_eq!((standard.rows(), standard.cols()), (6, 6));
        assert_eq!(standard.goal(), Cell::new(5, 5));
        assert_eq!(standard.walls().len(), 6);
        assert_eq!(standard.pits().len(), 3);
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!("Small".parse::<GridPreset>().unwrap(), GridPreset::Small);
        assert_eq!("6x6".parse::<GridPreset>().unwrap(), GridPreset::Standard);
        assert!(matches!(
            "huge".parse::<GridPreset>(),
            Err(Error::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_toggle_alternates() {
        assert_eq!(GridPreset::Small.toggled(), GridPreset::Standard);
        assert_eq!(GridPreset::Standard.toggled(), GridPreset::Small);
    }
}

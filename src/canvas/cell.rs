use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PlaceError;

/// Hex color triplet, always held as upper-case `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse `#RRGGBB` or the `#RGB` shorthand, case-insensitive
    pub fn parse(s: &str) -> Result<Self, PlaceError> {
        let invalid = || PlaceError::InvalidInput(format!("Invalid color: {:?}", s));

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let full = match hex.len() {
            6 => hex.to_ascii_uppercase(),
            3 => hex
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_uppercase(),
            _ => return Err(invalid()),
        };

        Ok(Self(format!("#{}", full)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The color's red, green and blue channels
    pub fn rgb(&self) -> [u8; 3] {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        [channel(1), channel(3), channel(5)]
    }
}

impl TryFrom<String> for Color {
    type Error = PlaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One grid position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub color: Color,
    pub last_updated: i64,
    /// Empty until someone paints the cell
    pub last_updated_by: String,
}

/// Square grid of cells, indexed `pixels[y][x]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub size: usize,
    pub pixels: Vec<Vec<Cell>>,
}

impl Canvas {
    /// A fresh grid with every cell at `color` and no writer
    pub fn new(size: usize, color: &Color, now: i64) -> Self {
        let blank = Cell {
            color: color.clone(),
            last_updated: now,
            last_updated_by: String::new(),
        };

        Self {
            size,
            pixels: vec![vec![blank; size]; size],
        }
    }

    /// Whether the coordinate falls inside the grid
    pub fn contains(size: usize, x: i64, y: i64) -> bool {
        let n = size as i64;
        (0..n).contains(&x) && (0..n).contains(&y)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.pixels.get(y).and_then(|row| row.get(x))
    }

    /// Replace a cell, returning false if the coordinate is outside the grid
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        match self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Whether the grid really is `size` rows of `size` cells
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.size && self.pixels.iter().all(|row| row.len() == self.size)
    }
}

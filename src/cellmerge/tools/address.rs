use std::fmt;
use std::str::FromStr;

use crate::cellmerge::tools::error::ToolError;

/// Largest column index (`XFD`) accepted in an address, one-based.
pub const MAX_COLUMNS: u32 = 16_384;
/// Largest row number accepted in an address, one-based.
pub const MAX_ROWS: u32 = 1_048_576;

/// Zero-based coordinates of a single worksheet cell parsed from an A1-style
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Coordinates in the `(row, column)` order used by `calamine`.
    pub fn position(&self) -> (u32, u32) {
        (self.row, self.column)
    }
}

impl FromStr for CellAddress {
    type Err = ToolError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolError::InvalidCellAddress(input.to_string());
        let mut rest = input.trim();
        rest = rest.strip_prefix('$').unwrap_or(rest);

        let letters_end = rest
            .find(|ch: char| !ch.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (letters, digits) = rest.split_at(letters_end);
        if letters.is_empty() || letters.len() > 3 {
            return Err(invalid());
        }
        let digits = digits.strip_prefix('$').unwrap_or(digits);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let column = letters
            .bytes()
            .map(|b| u32::from(b.to_ascii_uppercase() - b'A') + 1)
            .fold(0u32, |acc, value| acc * 26 + value);
        let row: u32 = digits.parse().map_err(|_| invalid())?;

        if column > MAX_COLUMNS || row == 0 || row > MAX_ROWS {
            return Err(invalid());
        }

        Ok(Self {
            row: row - 1,
            column: column - 1,
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut remaining = self.column + 1;
        while remaining > 0 {
            let digit = (remaining - 1) % 26;
            letters.push(char::from(b'A' + digit as u8));
            remaining = (remaining - 1) / 26;
        }
        for letter in letters.iter().rev() {
            write!(f, "{letter}")?;
        }
        write!(f, "{}", self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_absolute_references() {
        assert_eq!("A1".parse::<CellAddress>().unwrap(), CellAddress::new(0, 0));
        assert_eq!("B3".parse::<CellAddress>().unwrap(), CellAddress::new(2, 1));
        assert_eq!("$D$10".parse::<CellAddress>().unwrap(), CellAddress::new(9, 3));
        assert_eq!("aa10".parse::<CellAddress>().unwrap(), CellAddress::new(9, 26));
        assert_eq!(
            "XFD1048576".parse::<CellAddress>().unwrap(),
            CellAddress::new(1_048_575, 16_383)
        );
    }

    #[test]
    fn rejects_ranges_and_out_of_bounds_references() {
        for input in ["", "A", "12", "A0", "A1:B2", "XFE1", "A1048577", "ABCD1", "B-3", "1A"] {
            assert!(
                matches!(
                    input.parse::<CellAddress>(),
                    Err(ToolError::InvalidCellAddress(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn displays_canonical_reference() {
        let address: CellAddress = "$ab$7".parse().unwrap();
        assert_eq!(address.to_string(), "AB7");
        assert_eq!(CellAddress::new(0, 25).to_string(), "Z1");
    }
}

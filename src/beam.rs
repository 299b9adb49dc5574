use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A ground track identifier of the form `gtXY`, where X is the beam pair
/// (1, 2 or 3) and Y the side (`l` or `r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Beam {
    pair: u8,
    side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Error, Debug, PartialEq)]
#[error("invalid beam {0:?}: expected gt1l, gt1r, gt2l, gt2r, gt3l or gt3r")]
pub struct BeamParseError(pub String);

impl Beam {
    pub const ALL: [Beam; 6] = [
        Beam::new_unchecked(1, Side::Left),
        Beam::new_unchecked(1, Side::Right),
        Beam::new_unchecked(2, Side::Left),
        Beam::new_unchecked(2, Side::Right),
        Beam::new_unchecked(3, Side::Left),
        Beam::new_unchecked(3, Side::Right),
    ];

    const fn new_unchecked(pair: u8, side: Side) -> Self {
        Self { pair, side }
    }

    pub fn pair(&self) -> u8 {
        self.pair
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Prepends this beam's group to a variable path within the beam.
    pub fn qualify(&self, variable: &str) -> String {
        format!("{}/{}", self, variable)
    }
}

impl fmt::Display for Beam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Left => 'l',
            Side::Right => 'r',
        };
        write!(f, "gt{}{}", self.pair, side)
    }
}

impl FromStr for Beam {
    type Err = BeamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BeamParseError(s.to_string());

        let rest = s.strip_prefix("gt").ok_or_else(err)?;
        let mut chars = rest.chars();
        let pair = match chars.next() {
            Some(c @ '1'..='3') => c as u8 - b'0',
            _ => return Err(err()),
        };
        let side = match chars.next() {
            Some('l') => Side::Left,
            Some('r') => Side::Right,
            _ => return Err(err()),
        };
        if chars.next().is_some() {
            return Err(err());
        }

        Ok(Beam { pair, side })
    }
}

impl<'de> Deserialize<'de> for Beam {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

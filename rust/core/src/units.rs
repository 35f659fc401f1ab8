// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing unit extraction
//!
//! Maps the drawing-wide `$INSUNITS` header code onto a length unit.
//! Code 0 means "unitless" and, like any unknown code, leaves the unit unset.

use crate::error::{Error, Result};

/// Length unit of a drawing, as declared by its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawingUnit {
    Inches,
    Feet,
    Miles,
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
    Yards,
    Decimeters,
}

impl DrawingUnit {
    /// Look up a unit by its `$INSUNITS` code
    ///
    /// Returns `Ok(None)` for code 0 (unitless).
    pub fn from_code(code: i64) -> Result<Option<Self>> {
        let unit = match code {
            0 => return Ok(None),
            1 => DrawingUnit::Inches,
            2 => DrawingUnit::Feet,
            3 => DrawingUnit::Miles,
            4 => DrawingUnit::Millimeters,
            5 => DrawingUnit::Centimeters,
            6 => DrawingUnit::Meters,
            7 => DrawingUnit::Kilometers,
            10 => DrawingUnit::Yards,
            14 => DrawingUnit::Decimeters,
            other => return Err(Error::UnknownUnitCode(other)),
        };
        Ok(Some(unit))
    }

    /// Short unit symbol ("mm", "in", ...)
    pub fn symbol(&self) -> &'static str {
        match self {
            DrawingUnit::Inches => "in",
            DrawingUnit::Feet => "ft",
            DrawingUnit::Miles => "mi",
            DrawingUnit::Millimeters => "mm",
            DrawingUnit::Centimeters => "cm",
            DrawingUnit::Meters => "m",
            DrawingUnit::Kilometers => "km",
            DrawingUnit::Yards => "yd",
            DrawingUnit::Decimeters => "dm",
        }
    }

    /// Multiplier converting a coordinate in this unit to meters
    #[inline]
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            DrawingUnit::Inches => 0.0254,
            DrawingUnit::Feet => 0.3048,
            DrawingUnit::Miles => 1609.344,
            DrawingUnit::Millimeters => 1e-3,
            DrawingUnit::Centimeters => 1e-2,
            DrawingUnit::Meters => 1.0,
            DrawingUnit::Kilometers => 1e3,
            DrawingUnit::Yards => 0.9144,
            DrawingUnit::Decimeters => 1e-1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(DrawingUnit::from_code(4), Ok(Some(DrawingUnit::Millimeters)));
        assert_eq!(DrawingUnit::from_code(6), Ok(Some(DrawingUnit::Meters)));
        assert_eq!(DrawingUnit::from_code(14), Ok(Some(DrawingUnit::Decimeters)));
        assert_eq!(DrawingUnit::from_code(1).unwrap().unwrap().symbol(), "in");
    }

    #[test]
    fn test_unitless_and_unknown() {
        assert_eq!(DrawingUnit::from_code(0), Ok(None));
        assert_eq!(DrawingUnit::from_code(8), Err(Error::UnknownUnitCode(8)));
    }

    #[test]
    fn test_meters_per_unit() {
        assert_eq!(DrawingUnit::Millimeters.meters_per_unit(), 0.001);
        assert_eq!(DrawingUnit::Meters.meters_per_unit(), 1.0);
        assert_eq!(DrawingUnit::Kilometers.meters_per_unit(), 1000.0);
    }
}

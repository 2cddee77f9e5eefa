use serde::{Deserialize, Serialize};

use crate::record::ForestType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Dominant-type colours shared by every chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub lodgepole: Rgb,
    pub ponderosa: Rgb,
    pub spruce_fir: Rgb,
    /// Records whose dominant type is undefined.
    pub unresolved: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            lodgepole: Rgb(27, 158, 119),  // teal green
            ponderosa: Rgb(217, 95, 2),    // burnt orange
            spruce_fir: Rgb(117, 112, 179), // slate purple
            unresolved: Rgb(160, 160, 160),
        }
    }
}

impl Palette {
    pub fn forest(&self, ft: ForestType) -> Rgb {
        match ft {
            ForestType::Lodgepole => self.lodgepole,
            ForestType::Ponderosa => self.ponderosa,
            ForestType::SpruceFir => self.spruce_fir,
        }
    }

    pub fn color(&self, dominant: Option<ForestType>) -> Rgb {
        dominant.map_or(self.unresolved, |ft| self.forest(ft))
    }
}

/// Viridis control points, dark purple → yellow.
const YEAR_RAMP: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

/// Continuous colour scale for `t` in [0, 1]; values outside are clamped.
pub fn ramp(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YEAR_RAMP.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(YEAR_RAMP.len() - 2);
    YEAR_RAMP[i].lerp(YEAR_RAMP[i + 1], scaled - i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_six_digits() {
        assert_eq!(Rgb(255, 0, 16).hex(), "#ff0010");
    }

    #[test]
    fn palette_maps_each_type_to_a_distinct_colour() {
        let p = Palette::default();
        let colours: Vec<_> = ForestType::ALL.iter().map(|&ft| p.forest(ft)).collect();
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert_ne!(colours[0], colours[2]);
        assert_eq!(p.color(None), p.unresolved);
        assert_eq!(p.color(Some(ForestType::Ponderosa)), p.ponderosa);
    }

    #[test]
    fn ramp_hits_endpoints_and_clamps() {
        assert_eq!(ramp(0.0), YEAR_RAMP[0]);
        assert_eq!(ramp(1.0), YEAR_RAMP[4]);
        assert_eq!(ramp(-3.0), YEAR_RAMP[0]);
        assert_eq!(ramp(7.0), YEAR_RAMP[4]);
        assert_eq!(ramp(0.5), YEAR_RAMP[2]);
        assert_eq!(ramp(f64::NAN), YEAR_RAMP[0]);
    }
}

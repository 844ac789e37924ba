use core::fmt;

use serde::{Deserialize, Serialize};

/// What a polygon would be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LandUseType {
    #[default]
    Solar,
    Reforestation,
}

impl LandUseType {
    pub const ALL: [LandUseType; 2] = [LandUseType::Solar, LandUseType::Reforestation];

    /// The other land use.
    pub fn toggled(self) -> Self {
        match self {
            LandUseType::Solar => LandUseType::Reforestation,
            LandUseType::Reforestation => LandUseType::Solar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LandUseType::Solar => "solar",
            LandUseType::Reforestation => "reforestation",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            LandUseType::Solar => 0,
            LandUseType::Reforestation => 1,
        }
    }
}

impl fmt::Display for LandUseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per land-use type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerLandUse<T> {
    values: [T; 2],
}

impl<T> PerLandUse<T> {
    pub fn new(solar: T, reforestation: T) -> Self {
        Self {
            values: [solar, reforestation],
        }
    }
    pub fn get(&self, land_use: LandUseType) -> &T {
        &self.values[land_use.index()]
    }
    pub fn get_mut(&mut self, land_use: LandUseType) -> &mut T {
        &mut self.values[land_use.index()]
    }
    pub fn set(&mut self, land_use: LandUseType, value: T) {
        self.values[land_use.index()] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        for t in LandUseType::ALL {
            assert_ne!(t.toggled(), t);
            assert_eq!(t.toggled().toggled(), t);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&LandUseType::Solar).unwrap(),
            "\"solar\""
        );
        let t: LandUseType = serde_json::from_str("\"reforestation\"").unwrap();
        assert_eq!(t, LandUseType::Reforestation);
        assert_eq!(LandUseType::Reforestation.to_string(), "reforestation");
    }

    #[test]
    fn test_per_land_use() {
        let mut v = PerLandUse::new(1, 2);
        assert_eq!(*v.get(LandUseType::Solar), 1);
        v.set(LandUseType::Reforestation, 5);
        *v.get_mut(LandUseType::Solar) += 1;
        assert_eq!(v, PerLandUse::new(2, 5));
    }
}

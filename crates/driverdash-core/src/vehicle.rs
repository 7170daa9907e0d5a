//! Vehicle Profiles
//!
//! Energy/fuel economy and price for the active vehicle. The dashboard keeps
//! settings for every kind at once so switching back and forth restores the
//! figures previously entered for each.

use serde::{Deserialize, Serialize};

/// Vehicle type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// Battery electric, priced per kWh
    Electric,
    /// Gasoline, priced per liter
    Gasoline,
    /// Ethanol, priced per liter
    Ethanol,
}

impl VehicleKind {
    /// All kinds in display order
    pub const ALL: [VehicleKind; 3] = [
        VehicleKind::Electric,
        VehicleKind::Gasoline,
        VehicleKind::Ethanol,
    ];

    /// Unit the energy/fuel is bought in
    pub fn energy_unit(&self) -> &'static str {
        match self {
            VehicleKind::Electric => "kWh",
            VehicleKind::Gasoline | VehicleKind::Ethanol => "L",
        }
    }

    /// Unit of the economy figure
    pub fn economy_unit(&self) -> &'static str {
        match self {
            VehicleKind::Electric => "kWh/100km",
            VehicleKind::Gasoline | VehicleKind::Ethanol => "km/L",
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VehicleKind::Electric => "electric",
            VehicleKind::Gasoline => "gasoline",
            VehicleKind::Ethanol => "ethanol",
        };
        f.pad(name)
    }
}

/// Economy and price of the vehicle in use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VehicleProfile {
    /// Battery electric
    Electric {
        /// Price per kWh
        price_per_kwh: f64,
        /// Consumption in kWh per 100 km
        kwh_per_100km: f64,
    },
    /// Gasoline
    Gasoline {
        /// Price per liter
        price_per_liter: f64,
        /// Economy in km per liter
        km_per_liter: f64,
    },
    /// Ethanol
    Ethanol {
        /// Price per liter
        price_per_liter: f64,
        /// Economy in km per liter
        km_per_liter: f64,
    },
}

impl VehicleProfile {
    /// The profile's type tag
    pub fn kind(&self) -> VehicleKind {
        match self {
            VehicleProfile::Electric { .. } => VehicleKind::Electric,
            VehicleProfile::Gasoline { .. } => VehicleKind::Gasoline,
            VehicleProfile::Ethanol { .. } => VehicleKind::Ethanol,
        }
    }
}

impl Default for VehicleProfile {
    fn default() -> Self {
        VehicleSettings::default().active()
    }
}

/// Electric vehicle figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricSettings {
    /// Price per kWh
    pub price_per_kwh: f64,
    /// Consumption in kWh per 100 km
    pub kwh_per_100km: f64,
}

/// Liquid fuel figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidFuelSettings {
    /// Price per liter
    pub price_per_liter: f64,
    /// Economy in km per liter
    pub km_per_liter: f64,
}

/// Per-kind vehicle settings plus the selected kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSettings {
    /// Kind used for live metrics
    pub selected: VehicleKind,
    /// Electric figures
    pub electric: ElectricSettings,
    /// Gasoline figures
    pub gasoline: LiquidFuelSettings,
    /// Ethanol figures
    pub ethanol: LiquidFuelSettings,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            selected: VehicleKind::Electric,
            electric: ElectricSettings {
                price_per_kwh: 1.20,
                kwh_per_100km: 15.0,
            },
            gasoline: LiquidFuelSettings {
                price_per_liter: 6.29,
                km_per_liter: 14.0,
            },
            ethanol: LiquidFuelSettings {
                price_per_liter: 4.29,
                km_per_liter: 9.0,
            },
        }
    }
}

impl VehicleSettings {
    /// Profile for the selected kind
    pub fn active(&self) -> VehicleProfile {
        self.profile(self.selected)
    }

    /// Profile for any kind
    pub fn profile(&self, kind: VehicleKind) -> VehicleProfile {
        match kind {
            VehicleKind::Electric => VehicleProfile::Electric {
                price_per_kwh: self.electric.price_per_kwh,
                kwh_per_100km: self.electric.kwh_per_100km,
            },
            VehicleKind::Gasoline => VehicleProfile::Gasoline {
                price_per_liter: self.gasoline.price_per_liter,
                km_per_liter: self.gasoline.km_per_liter,
            },
            VehicleKind::Ethanol => VehicleProfile::Ethanol {
                price_per_liter: self.ethanol.price_per_liter,
                km_per_liter: self.ethanol.km_per_liter,
            },
        }
    }

    /// Store a profile's figures and select its kind
    pub fn apply(&mut self, profile: VehicleProfile) {
        match profile {
            VehicleProfile::Electric {
                price_per_kwh,
                kwh_per_100km,
            } => {
                self.electric = ElectricSettings {
                    price_per_kwh,
                    kwh_per_100km,
                }
            }
            VehicleProfile::Gasoline {
                price_per_liter,
                km_per_liter,
            } => {
                self.gasoline = LiquidFuelSettings {
                    price_per_liter,
                    km_per_liter,
                }
            }
            VehicleProfile::Ethanol {
                price_per_liter,
                km_per_liter,
            } => {
                self.ethanol = LiquidFuelSettings {
                    price_per_liter,
                    km_per_liter,
                }
            }
        }
        self.selected = profile.kind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switching_kind_keeps_figures() {
        let mut settings = VehicleSettings::default();
        settings.apply(VehicleProfile::Gasoline {
            price_per_liter: 5.99,
            km_per_liter: 12.0,
        });
        settings.selected = VehicleKind::Electric;
        settings.selected = VehicleKind::Gasoline;

        assert_eq!(
            settings.active(),
            VehicleProfile::Gasoline {
                price_per_liter: 5.99,
                km_per_liter: 12.0
            }
        );
        assert_eq!(settings.electric.kwh_per_100km, 15.0);
    }

    #[test]
    fn test_every_kind_has_a_profile_of_that_kind() {
        let settings = VehicleSettings::default();
        for kind in VehicleKind::ALL {
            assert_eq!(settings.profile(kind).kind(), kind);
        }
        assert_eq!(VehicleKind::Electric.economy_unit(), "kWh/100km");
        assert_eq!(VehicleKind::Ethanol.economy_unit(), "km/L");
    }

    #[test]
    fn test_profile_serde_tag() {
        let json = serde_json::to_string(&VehicleProfile::Ethanol {
            price_per_liter: 4.29,
            km_per_liter: 9.0,
        })
        .unwrap();
        assert!(json.contains("\"kind\":\"ethanol\""));
    }
}

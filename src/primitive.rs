//! Predefined haptic effect primitives
//!
//! Primitives are short hardware-rendered effects identified by stable
//! numeric ids. Compositions chain primitives with per-segment scale and
//! delay; support is queried per actuator before dispatch.

use std::fmt;

/// Predefined effect primitives
///
/// The numeric ids are part of the actuator-service contract and must
/// not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Primitive {
    /// Crisp click, the basic confirmation effect (ID: 1)
    Click = 1,
    /// Deep thud, a heavier landing effect (ID: 2)
    Thud = 2,
    /// Circular spin sensation (ID: 3)
    Spin = 3,
    /// Fast rising ramp (ID: 4)
    QuickRise = 4,
    /// Slow rising ramp (ID: 5)
    SlowRise = 5,
    /// Fast falling ramp (ID: 6)
    QuickFall = 6,
    /// Light tick, softer than a click (ID: 7)
    Tick = 7,
    /// Very light tick at low frequency (ID: 8)
    LowTick = 8,
}

/// All primitives in id order
pub const ALL_PRIMITIVES: [Primitive; 8] = [
    Primitive::Click,
    Primitive::Thud,
    Primitive::Spin,
    Primitive::QuickRise,
    Primitive::SlowRise,
    Primitive::QuickFall,
    Primitive::Tick,
    Primitive::LowTick,
];

impl Primitive {
    /// Convert primitive to its raw service id
    pub fn to_id(self) -> u32 {
        self as u32
    }

    /// Create from a raw service id
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Click),
            2 => Some(Self::Thud),
            3 => Some(Self::Spin),
            4 => Some(Self::QuickRise),
            5 => Some(Self::SlowRise),
            6 => Some(Self::QuickFall),
            7 => Some(Self::Tick),
            8 => Some(Self::LowTick),
            _ => None,
        }
    }

    /// Get human-readable name for the primitive
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::Thud => "Thud",
            Self::Spin => "Spin",
            Self::QuickRise => "Quick Rise",
            Self::SlowRise => "Slow Rise",
            Self::QuickFall => "Quick Fall",
            Self::Tick => "Tick",
            Self::LowTick => "Low Tick",
        }
    }

    /// Create from config name string (snake_case)
    ///
    /// Returns None if the name is not recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "thud" => Some(Self::Thud),
            "spin" => Some(Self::Spin),
            "quick_rise" => Some(Self::QuickRise),
            "slow_rise" => Some(Self::SlowRise),
            "quick_fall" => Some(Self::QuickFall),
            "tick" => Some(Self::Tick),
            "low_tick" => Some(Self::LowTick),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.to_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_id_round_trip() {
        for primitive in ALL_PRIMITIVES {
            assert_eq!(Primitive::from_id(primitive.to_id()), Some(primitive));
        }
    }

    #[test]
    fn test_primitive_ids_are_stable() {
        assert_eq!(Primitive::Click.to_id(), 1);
        assert_eq!(Primitive::Thud.to_id(), 2);
        assert_eq!(Primitive::Spin.to_id(), 3);
        assert_eq!(Primitive::QuickRise.to_id(), 4);
        assert_eq!(Primitive::SlowRise.to_id(), 5);
        assert_eq!(Primitive::QuickFall.to_id(), 6);
        assert_eq!(Primitive::Tick.to_id(), 7);
        assert_eq!(Primitive::LowTick.to_id(), 8);
    }

    #[test]
    fn test_unknown_id_returns_none() {
        assert_eq!(Primitive::from_id(0), None);
        assert_eq!(Primitive::from_id(9), None);
        assert_eq!(Primitive::from_id(u32::MAX), None);
    }

    #[test]
    fn test_from_name_round_trip() {
        assert_eq!(Primitive::from_name("click"), Some(Primitive::Click));
        assert_eq!(Primitive::from_name("quick_rise"), Some(Primitive::QuickRise));
        assert_eq!(Primitive::from_name("low_tick"), Some(Primitive::LowTick));
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(Primitive::from_name("buzz"), None);
        assert_eq!(Primitive::from_name(""), None);
        assert_eq!(Primitive::from_name("Click"), None); // case-sensitive
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Primitive::Click.to_string(), "Click (1)");
        assert_eq!(Primitive::QuickFall.to_string(), "Quick Fall (6)");
    }

    #[test]
    fn test_all_primitives_in_id_order() {
        for (i, primitive) in ALL_PRIMITIVES.iter().enumerate() {
            assert_eq!(primitive.to_id(), i as u32 + 1);
        }
    }
}

use core::fmt;

/// Discrete resting orientation of the device, named after the axis aligned
/// with gravity.
///
/// `Start` only exists before the first classification. It has no wire name
/// and is never sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    Flat,
    #[default]
    Start,
}

impl Orientation {
    /// Every orientation that can be reported to the host.
    pub const RESTING: [Orientation; 5] = [
        Orientation::PositiveX,
        Orientation::NegativeX,
        Orientation::PositiveY,
        Orientation::NegativeY,
        Orientation::Flat,
    ];

    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            Orientation::PositiveX => Some("X_POS"),
            Orientation::NegativeX => Some("X_NEG"),
            Orientation::PositiveY => Some("Y_POS"),
            Orientation::NegativeY => Some("Y_NEG"),
            Orientation::Flat => Some("FLAT"),
            Orientation::Start => None,
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "X_POS" => Some(Orientation::PositiveX),
            "X_NEG" => Some(Orientation::NegativeX),
            "Y_POS" => Some(Orientation::PositiveY),
            "Y_NEG" => Some(Orientation::NegativeY),
            "FLAT" => Some(Orientation::Flat),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.wire_name().unwrap_or("START"))
    }
}

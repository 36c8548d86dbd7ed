use std::fmt;

/// Version announced in every document this side produces.
pub const PROTOCOL_VERSION: f64 = 1.0;

/// Protocol version carried as a JSON number, read as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Splits the shortest decimal rendering of `value`, so `1.0` is 1/0 and
    /// `1.01` is 1/1. Exponent forms and negatives do not parse.
    pub fn from_number(value: f64) -> Option<Self> {
        let text = format!("{value:?}");
        let (major, minor) = text.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    pub fn is_supported(&self) -> bool {
        self.major == 1 && self.minor == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

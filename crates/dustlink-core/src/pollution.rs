//! Pollution categories and their one-byte wire codes.
//!
//! Code table (ASCII):
//!   Good           'G'    Unhealthy       'u'
//!   Moderate       'M'    Very_Unhealthy  'V'
//!   Unhealthy_S    'U'    Hazardous       'H'
//!   anything else  'X'

/// Closed set of pollution categories, plus `Unknown` for unrecognised labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollutionCategory {
    Good,
    Moderate,
    /// Unhealthy for sensitive groups.
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    Unknown,
}

/// Wire code for [`PollutionCategory::Unknown`].
pub const UNKNOWN_CODE: u8 = b'X';

impl PollutionCategory {
    /// Every category with a defined label, in increasing severity.
    pub const KNOWN: [Self; 6] = [
        Self::Good,
        Self::Moderate,
        Self::UnhealthySensitive,
        Self::Unhealthy,
        Self::VeryUnhealthy,
        Self::Hazardous,
    ];

    /// Exact, case-sensitive label match. Total: unrecognised input is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Good" => Self::Good,
            "Moderate" => Self::Moderate,
            "Unhealthy_S" => Self::UnhealthySensitive,
            "Unhealthy" => Self::Unhealthy,
            "Very_Unhealthy" => Self::VeryUnhealthy,
            "Hazardous" => Self::Hazardous,
            _ => Self::Unknown,
        }
    }

    /// CSV label. `None` for `Unknown`.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Good => Some("Good"),
            Self::Moderate => Some("Moderate"),
            Self::UnhealthySensitive => Some("Unhealthy_S"),
            Self::Unhealthy => Some("Unhealthy"),
            Self::VeryUnhealthy => Some("Very_Unhealthy"),
            Self::Hazardous => Some("Hazardous"),
            Self::Unknown => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Good => b'G',
            Self::Moderate => b'M',
            Self::UnhealthySensitive => b'U',
            Self::Unhealthy => b'u',
            Self::VeryUnhealthy => b'V',
            Self::Hazardous => b'H',
            Self::Unknown => UNKNOWN_CODE,
        }
    }

    /// Inverse of [`code`](Self::code). `None` for bytes outside the alphabet.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'G' => Some(Self::Good),
            b'M' => Some(Self::Moderate),
            b'U' => Some(Self::UnhealthySensitive),
            b'u' => Some(Self::Unhealthy),
            b'V' => Some(Self::VeryUnhealthy),
            b'H' => Some(Self::Hazardous),
            UNKNOWN_CODE => Some(Self::Unknown),
            _ => None,
        }
    }

    /// AQI index assigned to this category by the hourly aggregation stage.
    pub fn aqi(self) -> Option<u16> {
        match self {
            Self::Good => Some(50),
            Self::Moderate => Some(100),
            Self::UnhealthySensitive => Some(150),
            Self::Unhealthy => Some(200),
            Self::VeryUnhealthy => Some(300),
            Self::Hazardous => Some(500),
            Self::Unknown => None,
        }
    }

    /// Category for a PM2.5 concentration in µg/m³.
    ///
    /// Breakpoints compare in double precision, so a stored `35.4f32`
    /// (slightly above 35.4) lands in the next band. Values below zero fall
    /// through to `Moderate` and NaN to `Hazardous`, matching the
    /// aggregation stage that produced existing data.
    pub fn from_concentration(pm25: f32) -> Self {
        let c = f64::from(pm25);
        if (0.0..=12.0).contains(&c) {
            Self::Good
        } else if c <= 35.4 {
            Self::Moderate
        } else if c <= 55.4 {
            Self::UnhealthySensitive
        } else if c <= 150.4 {
            Self::Unhealthy
        } else if c <= 250.4 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }
}

impl From<&str> for PollutionCategory {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

/// Map a category label straight to its wire code.
pub fn map(category: &str) -> u8 {
    PollutionCategory::from_label(category).code()
}

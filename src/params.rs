/// Measurement function of the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    CurrentDc,
    CurrentAc,
    VoltageDc,
    VoltageAc,
    Resistance,
    FourWireResistance,
    Period,
    Frequency,
    Temperature,
    Continuity,
}

impl Mode {
    pub(crate) fn scpi_code(self) -> &'static str {
        match self {
            Self::CurrentDc          => "CURR:DC",
            Self::CurrentAc          => "CURR:AC",
            Self::VoltageDc          => "VOLT:DC",
            Self::VoltageAc          => "VOLT:AC",
            Self::Resistance         => "RES",
            Self::FourWireResistance => "FRES",
            Self::Period             => "PER",
            Self::Frequency          => "FREQ",
            Self::Temperature        => "TEMP",
            Self::Continuity         => "CONT",
        }
    }

    pub(crate) fn from_scpi_code(code: &str) -> Option<Mode> {
        match code {
            "CURR:DC" => Some(Self::CurrentDc),
            "CURR:AC" => Some(Self::CurrentAc),
            "VOLT:DC" => Some(Self::VoltageDc),
            "VOLT:AC" => Some(Self::VoltageAc),
            "RES"     => Some(Self::Resistance),
            "FRES"    => Some(Self::FourWireResistance),
            "PER"     => Some(Self::Period),
            "FREQ"    => Some(Self::Frequency),
            "TEMP"    => Some(Self::Temperature),
            "CONT"    => Some(Self::Continuity),
            _ => None,
        }
    }

    /// Selectable ranges of the mode, ascending. Period, frequency, temperature, and
    /// continuity have no range to select.
    pub(crate) fn ranges(self) -> Option<&'static [f64]> {
        match self {
            Self::CurrentDc => Some(&[0.02, 0.1, 1.0, 3.0]),
            Self::CurrentAc => Some(&[1.0, 3.0]),
            Self::VoltageDc => Some(&[0.1, 1.0, 10.0, 100.0, 1000.0]),
            Self::VoltageAc => Some(&[0.1, 1.0, 10.0, 100.0, 750.0]),
            Self::Resistance | Self::FourWireResistance =>
                Some(&[1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8]),
            _ => None,
        }
    }

    /// Inclusive bounds on the display digits setting. Continuity has a fixed display.
    pub(crate) fn digits(self) -> Option<(u8, u8)> {
        match self {
            Self::Continuity => None,
            _ => Some((4, 7)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Ascii,
    Single,
    Double,
}

impl DataFormat {
    pub(crate) fn scpi_code(self) -> &'static str {
        match self {
            Self::Ascii  => "ASC",
            Self::Single => "SRE",
            Self::Double => "DRE",
        }
    }

    pub(crate) fn from_scpi_code(code: &str) -> Option<DataFormat> {
        match code {
            "ASC" => Some(Self::Ascii),
            "SRE" => Some(Self::Single),
            "DRE" => Some(Self::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Normal,
    Swapped,
}

impl ByteOrder {
    pub(crate) fn scpi_code(self) -> &'static str {
        match self {
            Self::Normal  => "NORM",
            Self::Swapped => "SWAP",
        }
    }

    pub(crate) fn from_scpi_code(code: &str) -> Option<ByteOrder> {
        match code {
            "NORM" => Some(Self::Normal),
            "SWAP" => Some(Self::Swapped),
            _ => None,
        }
    }
}

/// One field of a measurement record.
///
/// `Units` is not a field of its own: when enabled, the instrument glues a unit token
/// onto the reading it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Reading,
    Timestamp,
    ReadingNumber,
    Channel,
    Limits,
    Units,
}

impl Element {
    pub(crate) fn scpi_code(self) -> &'static str {
        match self {
            Self::Reading       => "READ",
            Self::Timestamp     => "TST",
            Self::ReadingNumber => "RNUM",
            Self::Channel       => "CHAN",
            Self::Limits        => "LIM",
            Self::Units         => "UNIT",
        }
    }

    pub(crate) fn scpi_long_code(self) -> &'static str {
        match self {
            Self::Reading       => "READing",
            Self::Timestamp     => "TSTamp",
            Self::ReadingNumber => "RNUMber",
            Self::Channel       => "CHANnel",
            Self::Limits        => "LIMits",
            Self::Units         => "UNITs",
        }
    }

    pub(crate) fn from_scpi_code(code: &str) -> Option<Element> {
        match code {
            "READ" => Some(Self::Reading),
            "TST"  => Some(Self::Timestamp),
            "RNUM" => Some(Self::ReadingNumber),
            "CHAN" => Some(Self::Channel),
            "LIM"  => Some(Self::Limits),
            "UNIT" => Some(Self::Units),
            _ => None,
        }
    }
}

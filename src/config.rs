//! Data transfer configuration applied to the instrument as one unit.

use crate::params::{ByteOrder, DataFormat, Element};

/// Describes what a measurement transfer contains and how it is encoded.
///
/// The default matches the instrument's power-up state: ascii transfers carrying only
/// the readings, normal byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    pub format: DataFormat,
    pub readings: bool,
    pub timestamp: bool,
    pub reading_number: bool,
    pub channel: bool,
    pub limits: bool,
    pub units: bool,
    pub byte_order: ByteOrder,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            format: DataFormat::Ascii,
            readings: true,
            timestamp: false,
            reading_number: false,
            channel: false,
            limits: false,
            units: false,
            byte_order: ByteOrder::Normal,
        }
    }
}

impl FormatConfig {
    /// Included elements, in the order the instrument emits the fields of a record.
    pub fn elements(&self) -> Vec<Element> {
        let mut elements = Vec::new();
        if self.readings {
            elements.push(Element::Reading);
        }
        if self.units {
            elements.push(Element::Units);
        }
        if self.timestamp {
            elements.push(Element::Timestamp);
        }
        if self.reading_number {
            elements.push(Element::ReadingNumber);
        }
        if self.channel {
            elements.push(Element::Channel);
        }
        if self.limits {
            elements.push(Element::Limits);
        }
        elements
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_elements() {
        assert_eq!(FormatConfig::default().elements(), vec![Element::Reading]);
    }

    #[test]
    fn test_element_order_is_emission_order() {
        let config = FormatConfig {
            timestamp: true,
            limits: true,
            units: true,
            ..Default::default()
        };
        assert_eq!(config.elements(),
            vec![Element::Reading, Element::Units, Element::Timestamp, Element::Limits]);
    }
}

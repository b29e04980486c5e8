//! Decoding of the measurement streams returned by the instrument.

use std::fmt;

use bitflags::bitflags;

use crate::params::{DataFormat, Element};
use crate::{Error, Result};

// `SECS` is listed before `SEC`, which prefixes it; stripping `SEC` first would leave
// a stray `S` in every timestamp field.
const UNIT_TOKENS: [&str; 9] =
    ["ADC", "AAC", "VDC", "VAC", "SECS", "HZ", "SEC", "RDNG#", "LIMITS"];

bitflags! {
    /// Comparator statuses packed into the limits byte of a measurement record.
    ///
    /// Bit 0 is high limit 2 and bit 3 is low limit 1. The pairing looks reversed, but
    /// it is fixed by the instrument protocol; bits 4..8 carry no meaning and are kept
    /// as received.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LimitFlags: u8 {
        const HighLimit2 = 1<<0;
        const LowLimit2  = 1<<1;
        const HighLimit1 = 1<<2;
        const LowLimit1  = 1<<3;
    }
}

impl LimitFlags {
    pub fn high_limit_2(self) -> bool {
        self.contains(Self::HighLimit2)
    }

    pub fn low_limit_2(self) -> bool {
        self.contains(Self::LowLimit2)
    }

    pub fn high_limit_1(self) -> bool {
        self.contains(Self::HighLimit1)
    }

    pub fn low_limit_1(self) -> bool {
        self.contains(Self::LowLimit1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The element list contains no field that occupies a slot of its own.
    NoElements,
    /// The flat field count does not divide evenly into samples.
    FieldCount { fields: usize, per_sample: usize },
    /// A field failed to convert to the type its element calls for.
    Field { element: Element, sample: usize, text: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoElements =>
                write!(f, "element list has no fields to parse"),
            Self::FieldCount { fields, per_sample } =>
                write!(f, "{} fields do not divide into samples of {}", fields, per_sample),
            Self::Field { element, sample, text } =>
                write!(f, "sample {} has a malformed {:?} field: {:?}", sample, element, text),
        }
    }
}

impl std::error::Error for ParseError {}

/// Decoded measurement records, one column per requested element.
///
/// Columns for elements that were not requested are `None` rather than empty; requested
/// columns all have the same length, one entry per sample. `Units` never produces a
/// column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasurementSet {
    pub readings: Option<Vec<f64>>,
    pub timestamps: Option<Vec<f64>>,
    pub reading_numbers: Option<Vec<u32>>,
    pub channels: Option<Vec<String>>,
    pub limits: Option<Vec<LimitFlags>>,
}

impl MeasurementSet {
    /// Decodes the raw text of a measurement transfer.
    ///
    /// `elements` must be the exact element list the instrument was configured with when
    /// the text was acquired; the text itself carries no way to recover it. Fields are
    /// interleaved per sample, so for `[Reading, Timestamp]` the text
    /// `"1.0,0.1,2.0,0.2"` decodes to readings `[1.0, 2.0]` and timestamps
    /// `[0.1, 0.2]`. When `Units` is active its tokens are stripped from the text
    /// before splitting and discarded.
    ///
    /// Only the ascii transfer format is implemented; the binary formats fail with
    /// [`Error::NotImplemented`].
    pub fn parse(raw: &str, elements: &[Element], format: DataFormat) -> Result<MeasurementSet> {
        if format != DataFormat::Ascii {
            return Err(Error::NotImplemented("binary transfer decoding"));
        }
        let per_sample = elements.iter().filter(|&&element| element != Element::Units).count();
        if per_sample == 0 {
            return Err(ParseError::NoElements.into());
        }
        let mut text = raw.to_owned();
        if elements.contains(&Element::Units) {
            for token in UNIT_TOKENS {
                text = text.replace(token, "");
            }
        }
        let text = text.trim();
        let fields = if text.is_empty() {
            Vec::new()
        } else {
            text.split(',').collect::<Vec<_>>()
        };
        if fields.len() % per_sample != 0 {
            return Err(ParseError::FieldCount { fields: fields.len(), per_sample }.into());
        }
        log::debug!("parsing {} samples of {:?}", fields.len() / per_sample, elements);

        let mut set = MeasurementSet::default();
        let mut position = 0;
        for &element in elements {
            if element == Element::Units {
                continue;
            }
            let column = fields.iter().copied().skip(position).step_by(per_sample);
            match element {
                Element::Reading =>
                    set.readings = Some(parse_fields(column, element)?),
                Element::Timestamp =>
                    set.timestamps = Some(parse_fields(column, element)?),
                Element::ReadingNumber =>
                    set.reading_numbers = Some(parse_fields(column, element)?),
                Element::Channel =>
                    set.channels = Some(column.map(|field| field.trim().to_owned()).collect()),
                Element::Limits => {
                    let bytes: Vec<u8> = parse_fields(column, element)?;
                    set.limits =
                        Some(bytes.into_iter().map(LimitFlags::from_bits_retain).collect());
                }
                Element::Units => unreachable!(),
            }
            position += 1;
        }
        Ok(set)
    }

    /// Sample count of the decoded columns.
    pub fn len(&self) -> usize {
        [
            self.readings.as_ref().map(Vec::len),
            self.timestamps.as_ref().map(Vec::len),
            self.reading_numbers.as_ref().map(Vec::len),
            self.channels.as_ref().map(Vec::len),
            self.limits.as_ref().map(Vec::len),
        ]
        .into_iter()
        .flatten()
        .next()
        .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arithmetic mean of the readings.
    ///
    /// `None` when there are no readings to average, either because `Reading` was not
    /// among the requested elements or because the set holds zero samples.
    pub fn mean(&self) -> Option<f64> {
        match self.readings.as_deref() {
            None | Some([]) => None,
            Some(readings) => Some(readings.iter().sum::<f64>() / readings.len() as f64),
        }
    }

    fn limit_column(&self, flag: LimitFlags) -> Option<Vec<bool>> {
        self.limits.as_ref()
            .map(|limits| limits.iter().map(|&sample| sample.contains(flag)).collect())
    }

    pub fn limits_high_2(&self) -> Option<Vec<bool>> {
        self.limit_column(LimitFlags::HighLimit2)
    }

    pub fn limits_low_2(&self) -> Option<Vec<bool>> {
        self.limit_column(LimitFlags::LowLimit2)
    }

    pub fn limits_high_1(&self) -> Option<Vec<bool>> {
        self.limit_column(LimitFlags::HighLimit1)
    }

    pub fn limits_low_1(&self) -> Option<Vec<bool>> {
        self.limit_column(LimitFlags::LowLimit1)
    }
}

impl fmt::Display for MeasurementSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "readings: {:?}", self.readings)?;
        writeln!(f, "timestamps: {:?}", self.timestamps)?;
        writeln!(f, "reading numbers: {:?}", self.reading_numbers)?;
        writeln!(f, "channels: {:?}", self.channels)?;
        writeln!(f, "high limit 2: {:?}", self.limits_high_2())?;
        writeln!(f, "low limit 2: {:?}", self.limits_low_2())?;
        writeln!(f, "high limit 1: {:?}", self.limits_high_1())?;
        write!(f, "low limit 1: {:?}", self.limits_low_1())
    }
}

fn parse_fields<'a, T: std::str::FromStr>(
    fields: impl Iterator<Item = &'a str>,
    element: Element,
) -> Result<Vec<T>> {
    fields
        .enumerate()
        .map(|(sample, field)| {
            field.trim().parse().map_err(|_| {
                ParseError::Field { element, sample, text: field.to_owned() }.into()
            })
        })
        .collect()
}

use crate::adapter::Adapter;
use crate::config::FormatConfig;
use crate::params::{ByteOrder, DataFormat, Element, Mode};
use crate::{Error, Result};

/// Driver for the Keithley 2700 multimeter system.
///
/// Configuration state lives on the instrument: getters query it instead of returning
/// a cached value, and mode-gated operations check the active mode before writing
/// anything.
#[derive(Debug)]
pub struct Device<A: Adapter> {
    adapter: A,
}

#[cfg(feature = "serial")]
impl Device<crate::adapter::serial::SerialAdapter> {
    /// Opens the instrument on a serial port.
    pub fn open(port: &str) -> Result<Device<crate::adapter::serial::SerialAdapter>> {
        Ok(Device::new(crate::adapter::serial::SerialAdapter::open(port)?))
    }
}

impl<A: Adapter> Device<A> {
    pub fn new(adapter: A) -> Device<A> {
        Device { adapter }
    }

    /// Reads the identification string. Command: `*IDN?`.
    pub fn id(&mut self) -> Result<String> {
        let id = self.adapter.ask("*IDN?")?;
        log::debug!("id() = {:?}", id);
        Ok(id)
    }

    /// Restores power-up defaults. Command: `*RST`.
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("reset()");
        self.adapter.write("*RST")
    }

    /// Clears the status registers. Command: `*CLS`.
    pub fn clear(&mut self) -> Result<()> {
        log::debug!("clear()");
        self.adapter.write("*CLS")
    }

    /// Reads the active measurement function. The instrument returns the function code
    /// in quotes; they are stripped here.
    pub fn mode(&mut self) -> Result<Mode> {
        let reply = self.adapter.ask("SENS:FUNC?")?;
        let mode = Mode::from_scpi_code(reply.trim().trim_matches('"'))
            .ok_or(Error::InvalidResponse(reply))?;
        log::debug!("mode() = {:?}", mode);
        Ok(mode)
    }

    /// Selects the measurement function. Command: `SENS:FUNC '<code>'`.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        log::debug!("set_mode({:?})", mode);
        self.adapter.write(&format!("SENS:FUNC '{}'", mode.scpi_code()))
    }

    /// Reads the range of the active mode.
    ///
    /// Fails with [`Error::UnsupportedInMode`] when the active mode has no range to
    /// read (period, frequency, temperature, continuity).
    pub fn range(&mut self) -> Result<f64> {
        let (mode, _) = self.ranged_mode("range")?;
        let reply = self.adapter.ask(&format!("{}:RANGe?", mode.scpi_code()))?;
        let range = parse_reply(&reply)?;
        log::debug!("range() = {:?}", range);
        Ok(range)
    }

    /// Sets the range of the active mode, with the same mode restriction as
    /// [`Self::range`].
    ///
    /// `value` is snapped to the smallest entry of the mode's range table at or above
    /// it, or to the largest entry when it exceeds the whole table; it is never
    /// rejected for magnitude.
    pub fn set_range(&mut self, value: f64) -> Result<()> {
        let (mode, table) = self.ranged_mode("range")?;
        let value = snap_up(value, table);
        log::debug!("set_range({:?})", value);
        self.adapter.write(&format!("{}:RANGe {}", mode.scpi_code(), value))
    }

    /// Reads the auto-range setting of the active mode, with the same mode restriction
    /// as [`Self::range`].
    pub fn auto_range(&mut self) -> Result<bool> {
        let (mode, _) = self.ranged_mode("auto range")?;
        let reply = self.adapter.ask(&format!("{}:RANGe:AUTO?", mode.scpi_code()))?;
        let enabled: i32 = parse_reply(&reply)?;
        log::debug!("auto_range() = {:?}", enabled != 0);
        Ok(enabled != 0)
    }

    /// Enables or disables auto-ranging for the active mode, with the same mode
    /// restriction as [`Self::range`].
    pub fn set_auto_range(&mut self, enabled: bool) -> Result<()> {
        let (mode, _) = self.ranged_mode("auto range")?;
        log::debug!("set_auto_range({:?})", enabled);
        self.adapter.write(&format!("{}:RANGe:AUTO {}", mode.scpi_code(), enabled as u8))
    }

    /// Reads the display digits of the active mode. Not available in continuity mode.
    pub fn digits(&mut self) -> Result<u8> {
        let mode = self.mode()?;
        if mode.digits().is_none() {
            return Err(Error::UnsupportedInMode { operation: "digits", mode });
        }
        let reply = self.adapter.ask(&format!("{}:DIGits?", mode.scpi_code()))?;
        let digits: f64 = parse_reply(&reply)?;
        log::debug!("digits() = {:?}", digits);
        Ok(digits as u8)
    }

    /// Sets the display digits of the active mode, clamped into the mode's bounds
    /// (4 to 7). Not available in continuity mode.
    pub fn set_digits(&mut self, value: u8) -> Result<()> {
        let mode = self.mode()?;
        let (min, max) = match mode.digits() {
            Some(bounds) => bounds,
            None => return Err(Error::UnsupportedInMode { operation: "digits", mode }),
        };
        let value = value.clamp(min, max);
        log::debug!("set_digits({:?})", value);
        self.adapter.write(&format!("{}:DIGits {}", mode.scpi_code(), value))
    }

    pub fn data_format(&mut self) -> Result<DataFormat> {
        let reply = self.adapter.ask("FORMat:DATA?")?;
        let format = DataFormat::from_scpi_code(reply.trim())
            .ok_or(Error::InvalidResponse(reply))?;
        log::debug!("data_format() = {:?}", format);
        Ok(format)
    }

    pub fn set_data_format(&mut self, format: DataFormat) -> Result<()> {
        log::debug!("set_data_format({:?})", format);
        self.adapter.write(&format!("FORMat:DATA '{}'", format.scpi_code()))
    }

    pub fn byte_order(&mut self) -> Result<ByteOrder> {
        let reply = self.adapter.ask("FORMat:BORDer?")?;
        let order = ByteOrder::from_scpi_code(reply.trim())
            .ok_or(Error::InvalidResponse(reply))?;
        log::debug!("byte_order() = {:?}", order);
        Ok(order)
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) -> Result<()> {
        log::debug!("set_byte_order({:?})", order);
        self.adapter.write(&format!("FORMat:BORDer {}", order.scpi_code()))
    }

    /// Reads the element list included in measurement transfers.
    pub fn data_elements(&mut self) -> Result<Vec<Element>> {
        let reply = self.adapter.ask("FORMat:ELEMents?")?;
        let mut elements = Vec::new();
        for code in reply.trim().split(',').filter(|code| !code.is_empty()) {
            match Element::from_scpi_code(code.trim()) {
                Some(element) => elements.push(element),
                None => return Err(Error::InvalidResponse(reply.clone())),
            }
        }
        log::debug!("data_elements() = {:?}", elements);
        Ok(elements)
    }

    /// Selects the element list included in measurement transfers.
    pub fn set_data_elements(&mut self, elements: &[Element]) -> Result<()> {
        log::debug!("set_data_elements({:?})", elements);
        let codes = elements.iter()
            .map(|element| element.scpi_code())
            .collect::<Vec<_>>();
        self.adapter.write(&format!("FORMat:ELEMents {}", codes.join(",")))
    }

    /// Applies a complete transfer configuration: format, element list, byte order,
    /// issued as three commands in that order.
    ///
    /// The sequence is not atomic; a transport failure partway through leaves the
    /// instrument with only the commands issued so far applied.
    pub fn configure_data_format(&mut self, config: &FormatConfig) -> Result<()> {
        log::debug!("configure_data_format({:?})", config);
        let codes = config.elements().iter()
            .map(|element| element.scpi_long_code())
            .collect::<Vec<_>>();
        self.adapter.write(&format!("FORMat:DATA '{}'", config.format.scpi_code()))?;
        self.adapter.write(&format!("FORMat:ELEMents {}", codes.join(",")))?;
        self.adapter.write(&format!("FORMat:BORDer {}", config.byte_order.scpi_code()))
    }

    /// Takes one immediate reading with factory measurement defaults and returns its
    /// raw text, to be fed to [`crate::MeasurementSet::parse`].
    ///
    /// Measures in `mode`, or in the instrument's active mode when `None`.
    /// Command: `:MEASure:<code>?`.
    pub fn one_shot_measurement(&mut self, mode: Option<Mode>) -> Result<String> {
        let mode = match mode {
            Some(mode) => mode,
            None => self.mode()?,
        };
        log::debug!("one_shot_measurement({:?})", mode);
        self.adapter.ask(&format!(":MEASure:{}?", mode.scpi_code()))
    }

    /// Takes `samples` readings in the active mode and returns their raw text, to be
    /// fed to [`crate::MeasurementSet::parse`].
    ///
    /// Clears the trace buffer first. The sample count is clamped into 1..=55000.
    /// Commands: `TRACe:CLEar`, `SAMP:COUN <n>`, `:READ?`.
    pub fn multi_point_measurement(&mut self, samples: u32) -> Result<String> {
        let samples = samples.clamp(1, 55000);
        log::debug!("multi_point_measurement({:?})", samples);
        self.adapter.write("TRACe:CLEar")?;
        self.adapter.write(&format!("SAMP:COUN {}", samples))?;
        self.adapter.ask(":READ?")
    }

    // queries the mode once and reuses it for both the validity check and the command
    fn ranged_mode(&mut self, operation: &'static str) -> Result<(Mode, &'static [f64])> {
        let mode = self.mode()?;
        match mode.ranges() {
            Some(table) => Ok((mode, table)),
            None => Err(Error::UnsupportedInMode { operation, mode }),
        }
    }
}

fn snap_up(value: f64, table: &[f64]) -> f64 {
    for &entry in table {
        if value <= entry {
            return entry;
        }
    }
    table[table.len() - 1]
}

fn parse_reply<T: std::str::FromStr>(reply: &str) -> Result<T> {
    reply.trim().parse()
        .map_err(|_| Error::InvalidResponse(reply.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::MeasurementSet;

    struct MockAdapter {
        commands: Vec<String>,
        replies: Vec<&'static str>,
    }

    impl Adapter for MockAdapter {
        fn write(&mut self, command: &str) -> Result<()> {
            self.commands.push(command.to_owned());
            Ok(())
        }

        fn ask(&mut self, command: &str) -> Result<String> {
            self.commands.push(command.to_owned());
            Ok(self.replies.remove(0).to_owned())
        }
    }

    fn with_replies(replies: &[&'static str]) -> Device<MockAdapter> {
        Device::new(MockAdapter { commands: Vec::new(), replies: replies.to_vec() })
    }

    #[test]
    fn test_id() {
        let mut device = with_replies(&["KEITHLEY INSTRUMENTS INC.,MODEL 2700,1234567,B09"]);
        let id = device.id().unwrap();
        assert!(id.contains("MODEL 2700"));
        assert_eq!(device.adapter.commands, vec!["*IDN?"]);
    }

    #[test]
    fn test_reset_and_clear() {
        let mut device = with_replies(&[]);
        device.reset().unwrap();
        device.clear().unwrap();
        assert_eq!(device.adapter.commands, vec!["*RST", "*CLS"]);
    }

    #[test]
    fn test_mode_query_strips_quotes() {
        let mut device = with_replies(&["\"VOLT:DC\""]);
        assert_eq!(device.mode().unwrap(), Mode::VoltageDc);
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?"]);
    }

    #[test]
    fn test_mode_unknown_code() {
        let mut device = with_replies(&["\"VOLT:XX\""]);
        assert!(matches!(device.mode().unwrap_err(), Error::InvalidResponse(_)));
    }

    #[test]
    fn test_set_mode() {
        let mut device = with_replies(&[]);
        device.set_mode(Mode::FourWireResistance).unwrap();
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC 'FRES'"]);
    }

    #[test]
    fn test_range_query() {
        let mut device = with_replies(&["\"CURR:DC\"", "+2.000000E-02"]);
        assert_eq!(device.range().unwrap(), 0.02);
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?", "CURR:DC:RANGe?"]);
    }

    #[test]
    fn test_set_range_snaps_up() {
        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_range(5.0).unwrap();
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?", "VOLT:DC:RANGe 10"]);
    }

    #[test]
    fn test_set_range_clamps_to_table_ends() {
        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_range(2000.0).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:RANGe 1000");

        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_range(0.05).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:RANGe 0.1");
    }

    #[test]
    fn test_set_range_keeps_exact_entry() {
        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_range(100.0).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:RANGe 100");
    }

    #[test]
    fn test_set_range_resistance_table() {
        let mut device = with_replies(&["\"RES\""]);
        device.set_range(5e4).unwrap();
        assert_eq!(device.adapter.commands[1], "RES:RANGe 100000");
    }

    #[test]
    fn test_set_range_gated_without_write() {
        let mut device = with_replies(&["\"PER\""]);
        let error = device.set_range(10.0).unwrap_err();
        assert!(matches!(error,
            Error::UnsupportedInMode { operation: "range", mode: Mode::Period }));
        // only the mode query may reach the transport
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?"]);
    }

    #[test]
    fn test_auto_range_query() {
        let mut device = with_replies(&["\"VOLT:AC\"", "1"]);
        assert!(device.auto_range().unwrap());
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?", "VOLT:AC:RANGe:AUTO?"]);
    }

    #[test]
    fn test_set_auto_range() {
        let mut device = with_replies(&["\"VOLT:AC\""]);
        device.set_auto_range(false).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:AC:RANGe:AUTO 0");
    }

    #[test]
    fn test_auto_range_gated_without_write() {
        let mut device = with_replies(&["\"TEMP\""]);
        let error = device.auto_range().unwrap_err();
        assert!(matches!(error,
            Error::UnsupportedInMode { operation: "auto range", mode: Mode::Temperature }));
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?"]);
    }

    #[test]
    fn test_digits_query() {
        let mut device = with_replies(&["\"FREQ\"", "+07"]);
        assert_eq!(device.digits().unwrap(), 7);
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?", "FREQ:DIGits?"]);
    }

    #[test]
    fn test_set_digits_clamped() {
        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_digits(9).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:DIGits 7");

        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_digits(1).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:DIGits 4");

        let mut device = with_replies(&["\"VOLT:DC\""]);
        device.set_digits(5).unwrap();
        assert_eq!(device.adapter.commands[1], "VOLT:DC:DIGits 5");
    }

    #[test]
    fn test_digits_gated_in_continuity() {
        let mut device = with_replies(&["\"CONT\""]);
        let error = device.set_digits(5).unwrap_err();
        assert!(matches!(error,
            Error::UnsupportedInMode { operation: "digits", mode: Mode::Continuity }));
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?"]);
    }

    #[test]
    fn test_data_format() {
        let mut device = with_replies(&["ASC"]);
        assert_eq!(device.data_format().unwrap(), DataFormat::Ascii);
        assert_eq!(device.adapter.commands, vec!["FORMat:DATA?"]);
    }

    #[test]
    fn test_set_data_format() {
        let mut device = with_replies(&[]);
        device.set_data_format(DataFormat::Double).unwrap();
        assert_eq!(device.adapter.commands, vec!["FORMat:DATA 'DRE'"]);
    }

    #[test]
    fn test_byte_order() {
        let mut device = with_replies(&["SWAP"]);
        assert_eq!(device.byte_order().unwrap(), ByteOrder::Swapped);
        device.set_byte_order(ByteOrder::Normal).unwrap();
        assert_eq!(device.adapter.commands, vec!["FORMat:BORDer?", "FORMat:BORDer NORM"]);
    }

    #[test]
    fn test_data_elements() {
        let mut device = with_replies(&["READ,TST,LIM"]);
        assert_eq!(device.data_elements().unwrap(),
            vec![Element::Reading, Element::Timestamp, Element::Limits]);
        assert_eq!(device.adapter.commands, vec!["FORMat:ELEMents?"]);
    }

    #[test]
    fn test_data_elements_unknown_code() {
        let mut device = with_replies(&["READ,FOO"]);
        assert!(matches!(device.data_elements().unwrap_err(), Error::InvalidResponse(_)));
    }

    #[test]
    fn test_set_data_elements() {
        let mut device = with_replies(&[]);
        device.set_data_elements(&[Element::Reading, Element::Units, Element::Limits]).unwrap();
        assert_eq!(device.adapter.commands, vec!["FORMat:ELEMents READ,UNIT,LIM"]);
    }

    #[test]
    fn test_configure_data_format() {
        let mut device = with_replies(&[]);
        let config = FormatConfig {
            timestamp: true,
            units: true,
            ..Default::default()
        };
        device.configure_data_format(&config).unwrap();
        assert_eq!(device.adapter.commands, vec![
            "FORMat:DATA 'ASC'",
            "FORMat:ELEMents READing,UNITs,TSTamp",
            "FORMat:BORDer NORM",
        ]);
    }

    #[test]
    fn test_configure_data_format_full() {
        let mut device = with_replies(&[]);
        let config = FormatConfig {
            format: DataFormat::Double,
            readings: true,
            timestamp: true,
            reading_number: true,
            channel: true,
            limits: true,
            units: true,
            byte_order: ByteOrder::Swapped,
        };
        device.configure_data_format(&config).unwrap();
        assert_eq!(device.adapter.commands, vec![
            "FORMat:DATA 'DRE'",
            "FORMat:ELEMents READing,UNITs,TSTamp,RNUMber,CHANnel,LIMits",
            "FORMat:BORDer SWAP",
        ]);
    }

    #[test]
    fn test_one_shot_explicit_mode() {
        let mut device = with_replies(&["+2.345678E+01"]);
        let raw = device.one_shot_measurement(Some(Mode::Temperature)).unwrap();
        assert_eq!(raw, "+2.345678E+01");
        assert_eq!(device.adapter.commands, vec![":MEASure:TEMP?"]);
    }

    #[test]
    fn test_one_shot_active_mode() {
        let mut device = with_replies(&["\"CURR:AC\"", "+1.234500E+00"]);
        device.one_shot_measurement(None).unwrap();
        assert_eq!(device.adapter.commands, vec!["SENS:FUNC?", ":MEASure:CURR:AC?"]);
    }

    #[test]
    fn test_multi_point() {
        let mut device = with_replies(&["+1.000000E+00,+2.000000E+00"]);
        let raw = device.multi_point_measurement(10).unwrap();
        assert_eq!(raw, "+1.000000E+00,+2.000000E+00");
        assert_eq!(device.adapter.commands, vec!["TRACe:CLEar", "SAMP:COUN 10", ":READ?"]);
    }

    #[test]
    fn test_multi_point_clamps_sample_count() {
        let mut device = with_replies(&[""]);
        device.multi_point_measurement(0).unwrap();
        assert_eq!(device.adapter.commands[1], "SAMP:COUN 1");

        let mut device = with_replies(&[""]);
        device.multi_point_measurement(100_000).unwrap();
        assert_eq!(device.adapter.commands[1], "SAMP:COUN 55000");
    }

    #[test]
    fn test_measurement_flow() {
        let mut device = with_replies(&["1.0,0.1,2.0,0.2,3.0,0.3", "READ,TST", "ASC"]);
        let raw = device.multi_point_measurement(3).unwrap();
        let elements = device.data_elements().unwrap();
        let format = device.data_format().unwrap();
        let set = MeasurementSet::parse(&raw, &elements, format).unwrap();
        assert_eq!(set.readings, Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(set.timestamps, Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(set.mean(), Some(2.0));
    }
}

use keithley2700::{Device, FormatConfig, MeasurementSet, Mode};

fn main() -> keithley2700::Result<()> {
    env_logger::init();

    let port = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyUSB0".to_owned());
    let mut device = Device::open(&port)?;
    println!("connected to {}", device.id()?);

    device.reset()?;
    device.set_mode(Mode::VoltageDc)?;
    device.configure_data_format(&FormatConfig {
        timestamp: true,
        reading_number: true,
        units: true,
        ..Default::default()
    })?;

    let raw = device.multi_point_measurement(10)?;
    let elements = device.data_elements()?;
    let format = device.data_format()?;
    let set = MeasurementSet::parse(&raw, &elements, format)?;
    println!("{}", set);
    if let Some(mean) = set.mean() {
        println!("mean reading: {} V", mean);
    }
    Ok(())
}

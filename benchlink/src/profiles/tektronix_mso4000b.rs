use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// Tektronix MSO/DPO4000B oscilloscopes.
pub fn profile() -> Profile {
    let profile = Profile::new("MSO4000B", "Tektronix", "MSO4000B", InstrumentKind::Oscilloscope)
        .alias("DPO4000B")
        .timeout_ms(10_000)
        .reset_on_open(false)
        .with_hardcopy("C:/Temp.png", 1024 * 1024)
        .with_table(super::state_table())
        .with_table(OptionTable::new("acquisition", &["OFF", "ON", "RUN", "STOP"]))
        .with_table(OptionTable::new(
            "channel",
            &["CH1", "CH2", "CH3", "CH4", "CH5", "CH6", "CH7", "CH8"],
        ))
        .with_table(OptionTable::new(
            "measurement",
            &["FREQuency", "PERIod", "PWIdth", "NWIdth", "FALL", "RISe", "DELay", "PDUty", "NDUty"],
        ))
        .with_table(OptionTable::new("slot", &["1", "2", "3", "4", "5", "6", "7", "8"]))
        .with_table(OptionTable::with_literals(
            "indicator",
            &[("OFF", "OFF"), ("ON", "MEAS{slot}")],
        ))
        .with_command(Command::write(
            "saveSetup",
            "Store the current setup",
            Template::new("SAVe:SETUp {location}", vec![Param::text("location").default("1")]),
        ))
        .with_command(Command::write(
            "recallSetup",
            "Restore a stored or the factory setup",
            Template::new(
                "RECAll:SETUp {location}",
                vec![Param::text("location").default("FACtory")],
            ),
        ))
        .with_command(Command::write(
            "deleteSetup",
            "Delete stored setups",
            Template::new("DELEte:SETUp {location}", vec![Param::text("location").default("ALL")]),
        ))
        .with_command(Command::write(
            "timeMeasurement",
            "Configure a timing measurement slot",
            Template::new(
                ":ACQuire:STATE {acquisition};:MEASUrement:MEAS{slot}:TYPe {type};:MEASUREMENT:INDICATORS:STATE {indicator};:MEASUrement:MEAS{slot}:STATE {display};:MEASUrement:MEAS{slot}:SOUrce1 {channel};",
                vec![
                    Param::choice("acquisition", "acquisition").default(1),
                    Param::choice("type", "measurement").default(0),
                    Param::choice("indicator", "indicator").default(1),
                    Param::choice("display", "state").default(1),
                    Param::choice("channel", "channel").default(0),
                    Param::choice("slot", "slot").default(0),
                ],
            ),
        ))
        .with_command(Command::query(
            "readMeasurement",
            "Immediate measurement on one channel",
            Reply::Float,
            Template::new(
                ":MEASUrement:IMMed:SOUrce1 {channel};:MEASUrement:IMMed:TYPe {type};:MEASUrement:IMMed:VALue?",
                vec![
                    Param::choice("channel", "channel").default(0),
                    Param::choice("type", "measurement").default(0),
                ],
            ),
        ));
    super::common(profile)
}

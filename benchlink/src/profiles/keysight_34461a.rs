use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// Keysight 34461A 6½ digit multimeter.
pub fn profile() -> Profile {
    let profile = Profile::new("34461A", "Keysight", "34461A", InstrumentKind::Multimeter)
        .with_table(OptionTable::new("coupling", &["AC", "DC"]))
        .with_table(OptionTable::new("bandwidth", &["3", "20", "200"]))
        .with_table(super::state_table())
        .with_table(OptionTable::new(
            "voltage_range",
            &["0.001", "1", "10", "100", "1000"],
        ))
        .with_table(OptionTable::new(
            "current_range",
            &["0.000001", "0.001", "0.01", "0.1", "1", "3"],
        ))
        .with_table(OptionTable::new("terminal", &["3", "10"]))
        .with_table(OptionTable::new(
            "trigger_source",
            &["IMMediate", "EXTernal", "BUS", "INTernal"],
        ))
        .with_command(Command::tagged(
            "configureVoltage",
            "Voltage measurement function and range",
            Param::choice("type", "coupling").default(1),
            vec![
                (
                    "AC",
                    Template::new(
                        ":CONF:VOLTage:{type};:VOLTage:{type}:BANDwidth {bandwidth};:VOLTage:{type}:RANGe {range};",
                        vec![
                            Param::choice("bandwidth", "bandwidth").default(1),
                            Param::choice("range", "voltage_range").default(3),
                        ],
                    ),
                ),
                (
                    "DC",
                    Template::new(
                        ":CONF:VOLTage:{type};:VOLTage:IMPedance:AUTO {auto_impedance};:VOLTage:{type}:RANGe {range};",
                        vec![
                            Param::choice("auto_impedance", "state").default(0),
                            Param::choice("range", "voltage_range").default(3),
                        ],
                    ),
                ),
            ],
        ))
        .with_command(Command::tagged(
            "configureCurrent",
            "Current measurement function, terminal and range",
            Param::choice("type", "coupling").default(1),
            vec![
                (
                    "AC",
                    Template::new(
                        ":CONF:CURRent:{type};:CURRent:{type}:TERMinals {terminal};:CURRent:{type}:BANDwidth {bandwidth};:CURRent:{type}:RANGe {range};",
                        vec![
                            Param::choice("terminal", "terminal").default(0),
                            Param::choice("bandwidth", "bandwidth").default(1),
                            Param::choice("range", "current_range").default(3),
                        ],
                    ),
                ),
                (
                    "DC",
                    Template::new(
                        ":CONF:CURRent:{type};:CURRent:{type}:TERMinals {terminal};:CURRent:{type}:RANGe {range};",
                        vec![
                            Param::choice("terminal", "terminal").default(0),
                            Param::choice("range", "current_range").default(3),
                        ],
                    ),
                ),
            ],
        ))
        .with_command(Command::query(
            "read",
            "Trigger and read a number of samples",
            Reply::FloatList,
            Template::new(
                ":SAMPle:COUNt {count};:TRIGger:SOURce {source};:READ?",
                vec![
                    Param::integer("count").default(1),
                    Param::choice("source", "trigger_source").default(0),
                ],
            ),
        ));
    super::common(profile)
}

use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// Chroma 6314A electronic load mainframe.
pub fn profile() -> Profile {
    let profile = Profile::new("6314A", "Chroma", "6314A", InstrumentKind::ElectronicLoad)
        .alias("Chroma6314A")
        .with_table(super::state_table())
        .with_table(OptionTable::new("input", &["UUT", "LOAD"]))
        .with_table(OptionTable::new("channel", &["1", "2", "3", "4", "5", "6", "7", "8"]))
        .with_table(OptionTable::new(
            "mode",
            &["CCL", "CCH", "CCDL", "CCDH", "CRL", "CRH", "CV"],
        ))
        .with_table(OptionTable::new("current_subsystem", &["STATic", "DYNamic"]))
        .with_table(OptionTable::new("voltage_mode", &["FAST", "SLOW"]))
        .with_table(OptionTable::new("slow_type", &["MOST", "MORE"]))
        .with_command(Command::write(
            "measureSubsystem",
            "Measurement input and scanning",
            Template::new(
                ":MEASure:INPut {input};:MEASure:SCAN {scan};",
                vec![
                    Param::choice("input", "input").default(0),
                    Param::choice("scan", "state").default(0),
                ],
            ),
        ))
        .with_command(Command::write(
            "channelSubsystem",
            "Select a channel and set its activity",
            Template::new(
                ":CHANnel {channel};:CHANnel:ACTive {active};:CHANnel:SYNCon {synchronized};",
                vec![
                    Param::choice("channel", "channel").default(0),
                    Param::choice("active", "state").default(0),
                    Param::choice("synchronized", "state").default(0),
                ],
            ),
        ))
        .with_command(Command::write(
            "mode",
            "Operating mode of the selected channel",
            Template::new(":MODE {mode};", vec![Param::choice("mode", "mode").default(0)]),
        ))
        .with_command(Command::tagged(
            "currentSubsystem",
            "Static or dynamic constant current levels",
            Param::choice("subsystem", "current_subsystem").default(0),
            vec![
                (
                    "STATic",
                    Template::new(
                        ":CURRent:{subsystem}:L1 {l1};:CURRent:{subsystem}:L2 {l2};:CURRent:{subsystem}:RISE {rise};:CURRent:{subsystem}:FALL {fall};",
                        vec![
                            Param::number("l1").default(1),
                            Param::number("l2").default(0),
                            Param::number("rise").default(2.5),
                            Param::number("fall").default(1),
                        ],
                    ),
                ),
                (
                    "DYNamic",
                    Template::new(
                        ":CURRent:{subsystem}:L1 {l1};:CURRent:{subsystem}:L2 {l2};:CURRent:{subsystem}:RISE {rise};:CURRent:{subsystem}:FALL {fall};:CURRent:{subsystem}:T1 {t1};:CURRent:{subsystem}:T2 {t2};",
                        vec![
                            Param::number("l1").default(1),
                            Param::number("l2").default(0),
                            Param::number("rise").default(2.5),
                            Param::number("fall").default(1),
                            Param::number("t1").default(0.02),
                            Param::number("t2").default(0.01),
                        ],
                    ),
                ),
            ],
        ))
        .with_command(Command::write(
            "voltageSubsystem",
            "Constant voltage levels, current limit and response",
            Template::new(
                ":VOLTage:L1 {l1};:VOLTage:L2 {l2};:VOLTage:CURRent {current_limit};:VOLTage:MODE {mode};:VOLTage:SLOWTYPE {slow_type};",
                vec![
                    Param::number("l1").default(5),
                    Param::number("l2").default(0),
                    Param::number("current_limit").default(0.5),
                    Param::choice("mode", "voltage_mode").default(0),
                    Param::choice("slow_type", "slow_type").default(0),
                ],
            ),
        ))
        .with_command(Command::write(
            "resistanceSubsystem",
            "Constant resistance levels and slew rates",
            Template::new(
                ":RESistance:L1 {l1};:RESistance:L2 {l2};:RESistance:RISE {rise};:RESistance:FALL {fall};",
                vec![
                    Param::number("l1").default(5),
                    Param::number("l2").default(0),
                    Param::number("rise").default(0.5),
                    Param::number("fall").default(0),
                ],
            ),
        ))
        .with_command(Command::write(
            "load",
            "Switch the load on or off",
            Template::new(":LOAD {state};", vec![Param::choice("state", "state").default(1)]),
        ))
        .with_command(Command::write(
            "configureSubsystem",
            "Key lock and sound",
            Template::new(
                ":CONFigure:KEY {key};:CONFigure:SOUND {sound};",
                vec![
                    Param::choice("key", "state").default(1),
                    Param::choice("sound", "state").default(1),
                ],
            ),
        ))
        .with_command(Command::measure("voltage", "Input voltage", Reply::Float, "MEASure:VOLTage?"))
        .with_command(Command::measure("current", "Input current", Reply::Float, "MEASure:CURRent?"))
        .with_command(Command::measure(
            "allVoltage",
            "Voltage of every channel",
            Reply::FloatList,
            "MEASure:ALLVoltage?",
        ))
        .with_command(Command::measure(
            "allCurrent",
            "Current of every channel",
            Reply::FloatList,
            "MEASure:ALLCurrent?",
        ))
        .with_command(Command::measure("loadState", "Load state", Reply::Text, "LOAD?"))
        .with_command(Command::measure("status", "Status register", Reply::Integer, "FETCh:STATus?"))
        .with_command(Command::measure("channel", "Selected channel", Reply::Integer, ":CHANnel?"))
        .with_command(Command::measure("modeState", "Operating mode", Reply::Text, ":MODE?"))
        .with_command(Command::measure(
            "measureInput",
            "Measurement input",
            Reply::Text,
            "MEASure:INP?",
        ))
        .with_command(Command::measure("measureScan", "Scan state", Reply::Text, "MEASure:SCAN?"));
    super::common(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Args;
    use crate::Error;

    #[test]
    fn static_current_defaults() {
        assert_eq!(
            profile().render("currentSubsystem", &Args::new()).unwrap(),
            ":CURRent:STATic:L1 1;:CURRent:STATic:L2 0;:CURRent:STATic:RISE 2.5;:CURRent:STATic:FALL 1;"
        );
    }

    #[test]
    fn dynamic_current_adds_timing() {
        let args = Args::new().with("subsystem", "DYN").with("l1", 2).with("t2", 0.005);
        assert_eq!(
            profile().render("currentSubsystem", &args).unwrap(),
            ":CURRent:DYNamic:L1 2;:CURRent:DYNamic:L2 0;:CURRent:DYNamic:RISE 2.5;:CURRent:DYNamic:FALL 1;:CURRent:DYNamic:T1 0.02;:CURRent:DYNamic:T2 0.005;"
        );
    }

    #[test]
    fn eight_channels() {
        assert_eq!(
            profile()
                .render("channelSubsystem", &Args::new().with("channel", 7).with("active", "ON"))
                .unwrap(),
            ":CHANnel 8;:CHANnel:ACTive ON;:CHANnel:SYNCon OFF;"
        );
        assert!(matches!(
            profile().render("channelSubsystem", &Args::new().with("channel", 8)),
            Err(Error::InvalidOption { len: 8, .. })
        ));
    }

    #[test]
    fn modes() {
        assert_eq!(
            profile().render("mode", &Args::new().with("mode", "cv")).unwrap(),
            ":MODE CV;"
        );
    }

    #[test]
    fn voltage_subsystem() {
        let args = Args::new().with("l1", 12).with("mode", "SLOW").with("slow_type", 1);
        assert_eq!(
            profile().render("voltageSubsystem", &args).unwrap(),
            ":VOLTage:L1 12;:VOLTage:L2 0;:VOLTage:CURRent 0.5;:VOLTage:MODE SLOW;:VOLTage:SLOWTYPE MORE;"
        );
    }

    #[test]
    fn voltage_subsystem_defaults() {
        assert_eq!(
            profile().render("voltageSubsystem", &Args::new()).unwrap(),
            ":VOLTage:L1 5;:VOLTage:L2 0;:VOLTage:CURRent 0.5;:VOLTage:MODE FAST;:VOLTage:SLOWTYPE MOST;"
        );
    }
}

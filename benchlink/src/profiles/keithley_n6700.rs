use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// N6700 modular supply mainframe with up to four channels.
pub fn profile() -> Profile {
    let profile = Profile::new("N6700", "Keysight", "N6700", InstrumentKind::PowerSupply)
        .with_table(super::state_table())
        .with_table(OptionTable::new("channel", &["1", "2", "3", "4"]))
        .with_command(Command::write(
            "configure",
            "Program one channel and show it on the display",
            Template::new(
                ":VOLTage {voltage}, (@{channel});:CURRent {current}, (@{channel});:DISPlay:CHANnel {channel}",
                vec![
                    Param::number("voltage").default(0),
                    Param::number("current").default(0),
                    Param::choice("channel", "channel").default(0),
                ],
            ),
        ))
        .with_command(Command::write(
            "output",
            "Enable or disable the outputs",
            Template::new(":OUTPut {state};", vec![Param::choice("state", "state").default(1)]),
        ))
        .with_command(Command::measure(
            "outputVoltage",
            "Output voltage",
            Reply::Float,
            ":MEASure:VOLTage?",
        ))
        .with_command(Command::measure(
            "outputCurrent",
            "Output current",
            Reply::Float,
            ":MEASure:CURRent?",
        ))
        .with_command(Command::measure(
            "outputPower",
            "Output power",
            Reply::Float,
            ":MEASure:POWer?",
        ))
        .with_command(Command::measure("outputState", "Output state", Reply::Text, ":OUTPut?"));
    super::common(profile)
}

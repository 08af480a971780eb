use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// Agilent E3631A triple output supply. The E36313A answers the same commands.
pub fn profile() -> Profile {
    let profile = Profile::new("E3631A", "Agilent", "E3631A", InstrumentKind::PowerSupply)
        .alias("E36313A")
        .with_table(OptionTable::new("supply", &["P6V", "P25V", "N25V"]))
        .with_table(super::state_table())
        .with_table(OptionTable::with_literals(
            "beeper",
            &[("OFF", ";"), ("ON", ";:SYSTem:BEEPer;")],
        ))
        .with_command(Command::write(
            "configure",
            "Select an output, program it and set the display",
            Template::new(
                ":INSTrument {supply};:VOLTage {voltage};:CURRent {current};:DISPlay {display}{beeper}",
                vec![
                    Param::choice("supply", "supply").default(1),
                    Param::number("voltage").default(0),
                    Param::number("current").default(0),
                    Param::choice("display", "state").default(1),
                    Param::choice("beeper", "beeper").default(1),
                ],
            ),
        ))
        .with_command(Command::write(
            "output",
            "Enable or disable all outputs",
            Template::new(":OUTPut {state};", vec![Param::choice("state", "state").default(1)]),
        ))
        .with_command(Command::measure("supply", "Selected output", Reply::Text, ":INSTrument?"))
        .with_command(Command::measure(
            "outputVoltage",
            "Voltage of the selected output",
            Reply::Float,
            ":MEASure:VOLTage?",
        ))
        .with_command(Command::measure(
            "outputCurrent",
            "Current of the selected output",
            Reply::Float,
            ":MEASure:CURRent?",
        ))
        .with_command(Command::measure(
            "applied",
            "Programmed voltage and current",
            Reply::Text,
            ":APPLy?",
        ))
        .with_command(Command::measure("outputState", "Output state", Reply::Text, ":OUTPut?"));
    super::common(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Args;

    #[test]
    fn configure_with_beeper() {
        let profile = profile();
        let args = Args::new()
            .with("supply", "N25V")
            .with("voltage", -12.5)
            .with("current", 0.25)
            .with("display", 0)
            .with("beeper", "ON");
        assert_eq!(
            profile.render("configure", &args).unwrap(),
            ":INSTrument N25V;:VOLTage -12.5;:CURRent 0.25;:DISPlay OFF;:SYSTem:BEEPer;"
        );
    }

    #[test]
    fn output_switch() {
        let profile = profile();
        assert_eq!(
            profile.render("output", &Args::new().with("state", "on")).unwrap(),
            ":OUTPut ON;"
        );
        assert_eq!(profile.render("output", &Args::new()).unwrap(), ":OUTPut ON;");
        assert_eq!(
            profile.render("output", &Args::new().with("state", 0)).unwrap(),
            ":OUTPut OFF;"
        );
    }
}

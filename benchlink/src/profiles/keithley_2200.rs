use crate::profile::{Command, InstrumentKind, OptionTable, Param, Profile, Reply, Template};

/// Keithley 2200 series single channel supply.
pub fn profile() -> Profile {
    let profile = Profile::new("2200", "Keithley", "2200", InstrumentKind::PowerSupply)
        .alias("Keithley2200")
        .with_table(super::state_table())
        .with_table(OptionTable::new("function_mode", &["FIXed", "LIST"]))
        .with_command(Command::write(
            "configure",
            "Program voltage, current and the key beeper",
            Template::new(
                ":VOLTage {voltage};:CURRent {current};:CONF:SOUN:{beeper}",
                vec![
                    Param::number("voltage").default(0),
                    Param::number("current").default(0),
                    Param::choice("beeper", "state").default(1),
                ],
            ),
        ))
        .with_command(Command::write(
            "output",
            "Enable or disable the output",
            Template::new(":OUTPut {state};", vec![Param::choice("state", "state").default(1)]),
        ))
        .with_command(Command::write(
            "functionMode",
            "Fixed output or list sequence",
            Template::new(
                ":FUNCtion:MODE {mode};",
                vec![Param::choice("mode", "function_mode").default(0)],
            ),
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
        .with_command(Command::measure("outputState", "Output state", Reply::Text, ":OUTPut?"))
        .with_command(Command::measure(
            "functionModeState",
            "Active function mode",
            Reply::Text,
            "FUNCTION:MODE?",
        ));
    super::common(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Args;

    #[test]
    fn configure() {
        let args = Args::new().with("voltage", 5).with("current", 1.5).with("beeper", "OFF");
        assert_eq!(
            profile().render("configure", &args).unwrap(),
            ":VOLTage 5;:CURRent 1.5;:CONF:SOUN:OFF"
        );
    }

    #[test]
    fn function_mode_accepts_short_form() {
        assert_eq!(
            profile()
                .render("functionMode", &Args::new().with("mode", "fix"))
                .unwrap(),
            ":FUNCtion:MODE FIXed;"
        );
        assert_eq!(
            profile()
                .render("functionMode", &Args::new().with("mode", 1))
                .unwrap(),
            ":FUNCtion:MODE LIST;"
        );
    }

    #[test]
    fn output_defaults_to_on() {
        assert_eq!(profile().render("output", &Args::new()).unwrap(), ":OUTPut ON;");
    }
}

//! Built-in instrument profiles.

use std::sync::Arc;

use crate::profile::{Command, OptionTable, Param, Profile, Reply, Template};

mod agilent_e3631a;
mod chroma_6314a;
mod keithley_2200;
mod keithley_n6700;
mod keysight_34461a;
mod tektronix_mso4000b;

lazy_static! {
    static ref PROFILES: Vec<Arc<Profile>> = vec![
        Arc::new(agilent_e3631a::profile()),
        Arc::new(keithley_2200::profile()),
        Arc::new(keithley_n6700::profile()),
        Arc::new(keysight_34461a::profile()),
        Arc::new(chroma_6314a::profile()),
        Arc::new(tektronix_mso4000b::profile()),
    ];
}

pub fn all() -> &'static [Arc<Profile>] {
    &PROFILES
}

/// Look up a profile by name or alias, ignoring case.
pub fn find(name: &str) -> Option<Arc<Profile>> {
    PROFILES.iter().find(|x| x.matches(name)).cloned()
}

/// IEEE 488.2 commands every instrument understands.
fn common(profile: Profile) -> Profile {
    profile
        .with_table(OptionTable::new("common_query", &["*CAL?", "*ESR?", "*STB?", "*TST?"]))
        .with_command(Command::write("reset", "Reset to factory defaults", Template::new("*RST", vec![])))
        .with_command(Command::write(
            "defaultSetup",
            "Enable status reporting and clear the status registers",
            Template::new("*ESE 60;*SRE 48;*CLS", vec![]),
        ))
        .with_command(Command::measure("identify", "Identification string", Reply::Text, "*IDN?"))
        .with_command(Command::query(
            "commonQuery",
            "Calibration, event status, status byte or self test",
            Reply::Text,
            Template::new("{query}", vec![Param::choice("query", "common_query").default(0)]),
        ))
}

/// `OFF`/`ON` table shared by most profiles.
fn state_table() -> OptionTable {
    OptionTable::new("state", &["OFF", "ON"])
}

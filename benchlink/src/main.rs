use std::process::exit;
use std::sync::Arc;

use clap::{crate_authors, crate_version, App as ClapApp, AppSettings, Arg, ArgMatches};
use env_logger::Env;
use serde::Serialize;

use benchlink::ni845x::Ni845xTransport;
use benchlink::transport::visa::VisaTransport;
use benchlink::{profiles, Adapter, Args, Error, Profile, Session, Transport};

fn resource_arg() -> Arg<'static> {
    Arg::new("resource")
        .long("resource")
        .short('r')
        .takes_value(true)
        .required(true)
        .help("VISA resource name, e.g. GPIB0::5::INSTR")
}

fn profile_arg() -> Arg<'static> {
    Arg::new("profile")
        .long("profile")
        .short('p')
        .takes_value(true)
        .help("Built-in instrument profile")
}

fn main() {
    let matches = ClapApp::new("benchlink")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Drive laboratory instruments from their command tables")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::new("verbose").long("verbose").short('v').help("Log verbose output"))
        .arg(Arg::new("json").long("json").help("Print replies and errors as JSON"))
        .subcommand(ClapApp::new("list").about("List VISA resources"))
        .subcommand(
            ClapApp::new("profiles").about("List built-in profiles").arg(
                Arg::new("dump")
                    .long("dump")
                    .takes_value(true)
                    .value_name("NAME")
                    .help("Print the command table of a profile as JSON"),
            ),
        )
        .subcommand(
            ClapApp::new("raw")
                .about("Send a raw SCPI command, commands ending with `?` are queried")
                .arg(resource_arg())
                .arg(Arg::new("command").required(true).help("SCPI command")),
        )
        .subcommand(
            ClapApp::new("run")
                .about("Run a profile command")
                .arg(profile_arg().required_unless_present("profile-file"))
                .arg(resource_arg())
                .arg(
                    Arg::new("profile-file")
                        .long("profile-file")
                        .takes_value(true)
                        .help("Load the profile from a JSON file"),
                )
                .arg(Arg::new("no-reset").long("no-reset").help("Do not reset on open"))
                .arg(Arg::new("no-idn").long("no-idn").help("Do not query *IDN? on open"))
                .arg(Arg::new("command").required(true).help("Command name"))
                .arg(
                    Arg::new("args")
                        .multiple_values(true)
                        .help("Arguments as name=value"),
                ),
        )
        .subcommand(
            ClapApp::new("hardcopy")
                .about("Save a screenshot")
                .arg(profile_arg().required(true))
                .arg(resource_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .takes_value(true)
                        .required(true)
                        .help("Local file"),
                ),
        )
        .subcommand(
            ClapApp::new("ni845x")
                .about("NI-845x USB adapters")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(ClapApp::new("list").about("List attached adapters")),
        )
        .get_matches();

    if matches.is_present("verbose") {
        env_logger::Builder::from_env(Env::default().default_filter_or("benchlink=debug")).init();
    } else {
        env_logger::init();
    }
    let json = matches.is_present("json");

    if let Err(err) = run(&matches, json) {
        if json {
            print_json(&Err::<(), _>(err));
        } else {
            println!("{}", err);
        }
        exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(x) => println!("{}", x),
        Err(err) => println!("Cannot serialize output: {}", err),
    }
}

fn print_list(items: Vec<String>, json: bool) {
    if json {
        print_json(&items);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
}

fn find_profile(name: &str) -> benchlink::Result<Arc<Profile>> {
    profiles::find(name).ok_or_else(|| {
        let known: Vec<_> = profiles::all().iter().map(|x| x.name.clone()).collect();
        Error::argument(anyhow::anyhow!(
            "Unknown profile `{}`, known profiles are {}",
            name,
            known.join(", ")
        ))
    })
}

// `required` arguments are enforced by clap
fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

fn run(matches: &ArgMatches, json: bool) -> benchlink::Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => print_list(VisaTransport::new().list_resources()?, json),
        Some(("profiles", sub)) => match sub.value_of("dump") {
            Some(name) => {
                let profile = find_profile(name)?;
                match serde_json::to_string_pretty(profile.as_ref()) {
                    Ok(x) => println!("{}", x),
                    Err(err) => return Err(Error::internal(err)),
                }
            }
            None => {
                let names = profiles::all()
                    .iter()
                    .map(|x| {
                        if x.aliases.is_empty() {
                            format!("{} ({} {})", x.name, x.vendor, x.model)
                        } else {
                            format!("{} ({} {}, alias {})", x.name, x.vendor, x.model, x.aliases.join(", "))
                        }
                    })
                    .collect();
                print_list(names, json);
            }
        },
        Some(("raw", sub)) => {
            let mut session = Session::new(VisaTransport::new());
            session.open(value(sub, "resource"), false, false)?;
            let ret = session.raw_command(value(sub, "command"));
            session.close()?;
            let reply = ret?;
            if json {
                print_json(&reply);
            } else {
                println!("{}", benchlink::Reading::from(reply));
            }
        }
        Some(("run", sub)) => {
            let profile = match sub.value_of("profile-file") {
                Some(path) => Arc::new(Profile::from_file(path)?),
                None => find_profile(value(sub, "profile"))?,
            };
            let args = Args::parse_pairs(sub.values_of("args").into_iter().flatten())?;
            let reset = profile.reset_on_open && !sub.is_present("no-reset");
            let mut adapter = Adapter::new(VisaTransport::new(), profile);
            adapter.open(value(sub, "resource"), reset, !sub.is_present("no-idn"))?;
            let ret = adapter.execute(value(sub, "command"), &args);
            adapter.close()?;
            let reading = ret?;
            if json {
                print_json(&reading);
            } else {
                println!("{}", reading);
            }
        }
        Some(("hardcopy", sub)) => {
            let profile = find_profile(value(sub, "profile"))?;
            let mut adapter = Adapter::new(VisaTransport::new(), profile);
            adapter.connect(value(sub, "resource"))?;
            let ret = adapter.save_hardcopy(value(sub, "output"));
            adapter.close()?;
            let len = ret?;
            if json {
                print_json(&len);
            } else {
                println!("Saved {} bytes to {}", len, value(sub, "output"));
            }
        }
        Some(("ni845x", sub)) => match sub.subcommand() {
            Some(("list", _)) => print_list(Ni845xTransport::load()?.list_resources()?, json),
            _ => unreachable!(),
        },
        _ => unreachable!(),
    }
    Ok(())
}

use std::env;
use std::path::PathBuf;

use rv_core::catalog::OrionCharger;
use rv_core::regions::{Region, Season};

pub const DEFAULT_SESSION_PATH: &str = "rv_session.json";
pub const DEFAULT_CONFIG_PATH: &str = "rv-sizer.toml";

pub struct CliOptions {
    pub session: PathBuf,
    pub config: PathBuf,
    pub verbose: bool,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Wizard,
    Calc { json: bool },
    Catalog,
    Regions,
    Select { id: String },
    Qty { id: String, quantity: u32 },
    Hours { id: String, hours: f64 },
    Duty { id: String, duty_cycle: f64 },
    Solar { watts: f64 },
    Panels { count: u32 },
    Region(Region),
    Season(Season),
    Batteries { count: u32 },
    Efficiency { efficiency: f64 },
    Orion(Option<OrionCharger>),
    Generator(bool),
    Report { out: PathBuf },
    Reset,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut session = None;
    let mut config = None;
    let mut verbose = false;

    while i < args.len() {
        match args[i].as_str() {
            "--session" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --session (expected a JSON file path)")?;
                if session.replace(PathBuf::from(path)).is_some() {
                    return Err("--session provided more than once".to_string());
                }
            }
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "-v" | "--verbose" => verbose = true,
            "--help" | "-h" => {
                return Ok(CliOptions {
                    session: session.unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
                    config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
                    verbose,
                    command: Command::Help,
                });
            }
            other if other.starts_with('-') => return Err(format!("unknown argument: {other}")),
            _ => break,
        }
        i += 1;
    }

    let command = parse_command(&args[i..])?;

    Ok(CliOptions {
        session: session.unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
        config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        verbose,
        command,
    })
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some(name) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];

    let command = match name.as_str() {
        "help" => Command::Help,
        "wizard" => Command::Wizard,
        "calc" => {
            let json = match rest.first().map(String::as_str) {
                None => false,
                Some("--json") => true,
                Some(other) => return Err(format!("unknown argument for calc: {other}")),
            };
            return finish(Command::Calc { json }, rest, usize::from(json));
        }
        "catalog" => Command::Catalog,
        "regions" => Command::Regions,
        "select" => Command::Select {
            id: rest.next_or_err(0, "select: missing appliance id")?.to_string(),
        },
        "qty" => Command::Qty {
            id: rest.next_or_err(0, "qty: missing appliance id")?.to_string(),
            quantity: parse_number(rest.next_or_err(1, "qty: missing quantity")?, "quantity")?,
        },
        "hours" => Command::Hours {
            id: rest.next_or_err(0, "hours: missing appliance id")?.to_string(),
            hours: parse_number(rest.next_or_err(1, "hours: missing hours per day")?, "hours")?,
        },
        "duty" => Command::Duty {
            id: rest.next_or_err(0, "duty: missing appliance id")?.to_string(),
            duty_cycle: parse_fraction(
                rest.next_or_err(1, "duty: missing duty cycle")?,
                "duty cycle",
            )?,
        },
        "solar" => Command::Solar {
            watts: parse_number(rest.next_or_err(0, "solar: missing watts")?, "watts")?,
        },
        "panels" => Command::Panels {
            count: parse_number(
                rest.next_or_err(0, "panels: missing panel count")?,
                "panel count",
            )?,
        },
        "region" => {
            let key = rest.next_or_err(0, "region: missing region key (see `rv_cli regions`)")?;
            Command::Region(key.parse::<Region>().map_err(|e| format!("{e}"))?)
        }
        "season" => {
            let key = rest.next_or_err(0, "season: missing season")?;
            Command::Season(key.parse::<Season>().map_err(|e| format!("{e}"))?)
        }
        "batteries" => Command::Batteries {
            count: parse_number(
                rest.next_or_err(0, "batteries: missing count")?,
                "battery count",
            )?,
        },
        "efficiency" => Command::Efficiency {
            efficiency: parse_fraction(
                rest.next_or_err(0, "efficiency: missing value")?,
                "efficiency",
            )?,
        },
        "orion" => {
            let amps = rest.next_or_err(0, "orion: missing amps (0, 30, 50 or 70)")?;
            let amps: u32 = parse_number(amps, "amps")?;
            Command::Orion(OrionCharger::from_amps(amps).map_err(|e| format!("{e}"))?)
        }
        "generator" => {
            let value = rest.next_or_err(0, "generator: expected on or off")?;
            Command::Generator(parse_switch(value)?)
        }
        "report" => Command::Report {
            out: PathBuf::from(rest.next_or_err(0, "report: missing output path")?),
        },
        "reset" => Command::Reset,
        other => return Err(format!("unknown command: {other}")),
    };

    let consumed = match &command {
        Command::Select { .. }
        | Command::Solar { .. }
        | Command::Panels { .. }
        | Command::Region(_)
        | Command::Season(_)
        | Command::Batteries { .. }
        | Command::Efficiency { .. }
        | Command::Orion(_)
        | Command::Generator(_)
        | Command::Report { .. } => 1,
        Command::Qty { .. } | Command::Hours { .. } | Command::Duty { .. } => 2,
        _ => 0,
    };
    finish(command, rest, consumed)
}

/// Reject trailing arguments
fn finish(command: Command, rest: &[String], consumed: usize) -> Result<Command, String> {
    match rest.get(consumed) {
        Some(extra) => Err(format!("unexpected argument: {extra}")),
        None => Ok(command),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: {value}"))
}

/// Accepts `0.4` or `40%`
fn parse_fraction(value: &str, what: &str) -> Result<f64, String> {
    match value.trim().strip_suffix('%') {
        Some(percent) => parse_number::<f64>(percent, what).map(|p| p / 100.0),
        None => parse_number(value, what),
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(format!("expected on or off, got {other}")),
    }
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  rv_cli [--session <path>] [--config <path>] [-v|--verbose] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  wizard                   step through the sizing questions");
    eprintln!("  calc [--json]            print the sizing for the saved session");
    eprintln!("  catalog                  list appliances");
    eprintln!("  regions                  print peak sun hours by region and season");
    eprintln!("  select <id>              select or deselect an appliance");
    eprintln!("  qty <id> <n>             set quantity");
    eprintln!("  hours <id> <h>           set hours per day");
    eprintln!("  duty <id> <d>            set duty cycle (0.4 or 40%)");
    eprintln!("  solar <watts>            pick a solar size (again to clear)");
    eprintln!("  panels <n>               set solar by panel count (even)");
    eprintln!("  region <key>             set region");
    eprintln!("  season <season>          winter, spring, summer, fall or annual");
    eprintln!("  batteries <n>            set installed battery count (1-10)");
    eprintln!("  efficiency <e>           set inverter efficiency (0.7-1.0 or 90%)");
    eprintln!("  orion <amps>             Orion XS DC-DC charger: 0, 30, 50 or 70");
    eprintln!("  generator on|off         generator available");
    eprintln!("  report <out.pdf>         write a PDF report");
    eprintln!("  reset                    start a fresh session");
    eprintln!();
    eprintln!(
        "Defaults: --session {DEFAULT_SESSION_PATH}, --config {DEFAULT_CONFIG_PATH} (optional)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, String> {
        parse_args_from(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn defaults_to_help() {
        let opts = parse(&[]).expect("parse should succeed");
        assert_eq!(opts.command, Command::Help);
        assert_eq!(opts.session, PathBuf::from(DEFAULT_SESSION_PATH));
        assert_eq!(opts.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!opts.verbose);
    }

    #[test]
    fn supports_global_options() {
        let args = ["--session", "trip.json", "-v", "--config", "van.toml", "calc", "--json"];
        let opts = parse(&args).expect("parse should succeed");
        assert_eq!(opts.session, PathBuf::from("trip.json"));
        assert_eq!(opts.config, PathBuf::from("van.toml"));
        assert!(opts.verbose);
        assert_eq!(opts.command, Command::Calc { json: true });
    }

    #[test]
    fn rejects_repeated_session() {
        assert!(parse(&["--session", "a.json", "--session", "b.json", "calc"]).is_err());
        assert!(parse(&["--session"]).is_err());
    }

    #[test]
    fn parses_usage_edits() {
        assert_eq!(
            parse(&["qty", "laptop", "2"]).unwrap().command,
            Command::Qty { id: "laptop".to_string(), quantity: 2 }
        );
        assert_eq!(
            parse(&["duty", "furnace_blower", "60%"]).unwrap().command,
            Command::Duty { id: "furnace_blower".to_string(), duty_cycle: 0.6 }
        );
        assert!(parse(&["hours", "laptop"]).is_err());
        assert!(parse(&["qty", "laptop", "two"]).is_err());
    }

    #[test]
    fn parses_solar_and_charging() {
        assert_eq!(
            parse(&["region", "mountain-west"]).unwrap().command,
            Command::Region(Region::MountainWest)
        );
        assert_eq!(parse(&["season", "winter"]).unwrap().command, Command::Season(Season::Winter));
        assert_eq!(parse(&["orion", "0"]).unwrap().command, Command::Orion(None));
        assert_eq!(
            parse(&["orion", "70"]).unwrap().command,
            Command::Orion(Some(OrionCharger::A70))
        );
        assert!(parse(&["orion", "45"]).is_err());
        assert_eq!(parse(&["generator", "on"]).unwrap().command, Command::Generator(true));
        assert!(parse(&["generator", "maybe"]).is_err());
        assert_eq!(
            parse(&["efficiency", "85%"]).unwrap().command,
            Command::Efficiency { efficiency: 0.85 }
        );
    }

    #[test]
    fn rejects_unknown_and_trailing() {
        assert!(parse(&["launch"]).is_err());
        assert!(parse(&["--fast", "calc"]).is_err());
        assert!(parse(&["reset", "now"]).is_err());
        assert!(parse(&["calc", "--yaml"]).is_err());
        assert!(parse(&["region", "atlantis"]).is_err());
    }
}

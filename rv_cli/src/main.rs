//! # RV Sizer CLI
//!
//! Command-line front end for `rv_core`. Every edit command loads the session
//! file, applies one change and saves it back; `wizard` walks all four steps
//! interactively and `calc` prints the results.

mod args;
mod wizard;

use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use args::{CliOptions, Command};
use rv_core::catalog::{appliances_in, ApplianceCategory, SystemSpec};
use rv_core::regions::{Region, Season};
use rv_core::report::render_sizing_pdf;
use rv_core::{
    load_session_or_default, save_session, FileLock, Session, SizerConfig, SizingError,
    SizingResult, SystemSizing,
};

fn main() -> ExitCode {
    let options = match args::parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            args::print_usage();
            return ExitCode::FAILURE;
        }
    };

    init_tracing(options.verbose);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(options: &CliOptions) -> SizingResult<()> {
    let config = SizerConfig::load_or_default(&options.config)?;
    let spec = &config.system;
    let path = options.session.as_path();

    match &options.command {
        Command::Help => {
            args::print_usage();
            Ok(())
        }
        Command::Catalog => {
            print_catalog();
            Ok(())
        }
        Command::Regions => {
            print_regions();
            Ok(())
        }
        Command::Calc { json } => {
            let session = open_session(path, &config);
            let sizing = session.calculate(spec)?;
            if *json {
                let out =
                    serde_json::to_string_pretty(&sizing).map_err(SizingError::serialization)?;
                println!("{}", out);
            } else {
                print_sizing(&sizing, spec);
            }
            Ok(())
        }
        Command::Report { out } => {
            let session = open_session(path, &config);
            let sizing = session.calculate(spec)?;
            let pdf = render_sizing_pdf(&session, &sizing, spec)?;
            fs::write(out, &pdf).map_err(|e| {
                SizingError::file_error("write report", out.display().to_string(), e.to_string())
            })?;
            println!("Report written to {} ({} bytes)", out.display(), pdf.len());
            Ok(())
        }
        Command::Wizard => {
            let _lock = FileLock::acquire(path, user_id())?;
            let mut session = open_session(path, &config);
            let stdin = io::stdin();
            let mut prompter = wizard::Prompter::new(stdin.lock(), io::stdout());
            let sizing = wizard::run(&mut prompter, &mut session, spec, |s| save_session(s, path))?;
            print_sizing(&sizing, spec);
            Ok(())
        }
        Command::Reset => {
            let _lock = FileLock::acquire(path, user_id())?;
            let session = Session::with_location(config.defaults.region, config.defaults.season);
            save_session(&session, path)?;
            println!("Started a new session in {}", path.display());
            Ok(())
        }
        edit => {
            let _lock = FileLock::acquire(path, user_id())?;
            let mut session = open_session(path, &config);
            let message = apply_edit(&mut session, edit, spec)?;
            save_session(&session, path)?;
            println!("{}", message);
            println!("Next: {}", session.current_step());
            Ok(())
        }
    }
}

/// Apply one editing command and describe what changed.
fn apply_edit(session: &mut Session, command: &Command, spec: &SystemSpec) -> SizingResult<String> {
    let message = match command {
        Command::Select { id } => {
            if session.toggle_appliance(id)? {
                format!("Selected {}", id)
            } else {
                format!("Deselected {}", id)
            }
        }
        Command::Qty { id, quantity } => {
            session.set_quantity(id, *quantity)?;
            format!("{} quantity: {}", id, session.usage[id.as_str()].quantity)
        }
        Command::Hours { id, hours } => {
            session.set_hours(id, *hours)?;
            format!("{} hours per day: {}", id, session.usage[id.as_str()].hours_per_day)
        }
        Command::Duty { id, duty_cycle } => {
            session.set_duty_cycle(id, *duty_cycle)?;
            format!("{} duty cycle: {:.0}%", id, session.usage[id.as_str()].duty_cycle * 100.0)
        }
        Command::Solar { watts } => {
            session.toggle_solar_option(*watts, &spec.solar_panel)?;
            format!("Solar: {:.0}W", session.solar.solar_watts)
        }
        Command::Panels { count } => {
            session.set_solar_panels(*count, &spec.solar_panel)?;
            format!("Solar: {} panels, {:.0}W", count, session.solar.solar_watts)
        }
        Command::Region(region) => {
            session.set_region(*region);
            format!("Region: {}", region)
        }
        Command::Season(season) => {
            session.set_season(*season);
            format!("Season: {}", season)
        }
        Command::Batteries { count } => {
            session.set_battery_count(*count);
            format!("Batteries: {}", session.battery.battery_count.unwrap_or(*count))
        }
        Command::Efficiency { efficiency } => {
            session.set_inverter_efficiency(*efficiency)?;
            format!(
                "Inverter efficiency: {:.0}%",
                session.battery.inverter_efficiency.unwrap_or(*efficiency) * 100.0
            )
        }
        Command::Orion(orion) => {
            session.set_orion(*orion);
            match orion {
                Some(charger) => format!("Orion XS: {}A", u32::from(*charger)),
                None => "Orion XS: none".to_string(),
            }
        }
        Command::Generator(on) => {
            session.set_generator(*on);
            format!("Generator: {}", if *on { "yes" } else { "no" })
        }
        other => {
            return Err(SizingError::Internal {
                message: format!("{:?} is not an edit command", other),
            })
        }
    };
    Ok(message)
}

/// Load the session, reporting anything that had to be reset.
///
/// A missing file starts a session at the configured region and season.
fn open_session(path: &Path, config: &SizerConfig) -> Session {
    if !path.exists() {
        return Session::with_location(config.defaults.region, config.defaults.season);
    }
    // Each warning is already logged by the loader
    let (session, warnings) = load_session_or_default(path);
    if !warnings.is_empty() {
        eprintln!(
            "{} part(s) of {} could not be read and were reset",
            warnings.len(),
            path.display()
        );
    }
    session
}

fn user_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "rv_cli".to_string())
}

fn print_catalog() {
    for category in ApplianceCategory::ALL {
        println!("{}", category.display_name());
        for appliance in appliances_in(category) {
            println!("  {:<28} {} {}", appliance.id, appliance.label, appliance.wattage_summary());
        }
        println!();
    }
}

fn print_regions() {
    print!("{:<34}", "Region");
    for season in Season::ALL {
        print!("{:>8}", season.label());
    }
    println!();
    for region in Region::ALL {
        print!("{:<34}", format!("{} ({})", region.label(), region.key()));
        for season in Season::ALL {
            print!("{:>8.1}", region.peak_sun_hours(season));
        }
        println!();
    }
}

fn print_sizing(sizing: &SystemSizing, spec: &SystemSpec) {
    println!();
    println!("═══════════════════════════════════════");
    println!("  RV POWER SIZING");
    println!("═══════════════════════════════════════");
    println!();
    println!("Loads:");
    println!("  Running:        {:.0} W", sizing.running_watts);
    println!("  Starting surge: {:.0} W", sizing.starting_watts);
    println!("  Daily use:      {:.1} Ah", sizing.daily_amp_hours);
    println!();
    println!("Solar ({}, {}, {:.1} PSH):", sizing.region, sizing.season, sizing.peak_sun_hours);
    println!("  Array:          {:.0} W", sizing.solar_watts);
    println!("  Yield:          {:.1} Ah/day", sizing.solar_amp_hours);
    println!("  Deficit:        {:.1} Ah/day", sizing.energy_deficit_ah);
    println!("  Full coverage:  {:.0} W", sizing.required_solar_watts);
    if let Some(extra) = &sizing.additional_solar {
        println!(
            "  Add:            {} panels ({:.0} W in {} pairs)",
            extra.panels, extra.watts_in_pairs, extra.pairs
        );
    }
    println!();
    println!("Battery bank:");
    println!("  Recommended:    {}", sizing.batteries_needed);
    println!(
        "  Installed:      {} ({:.0} Ah total, {:.0} Ah usable)",
        sizing.battery_count, sizing.battery_bank_total_ah, sizing.battery_bank_usable_ah
    );
    println!();

    println!("Charging:");
    if sizing.has_generator {
        println!("  Generator:      {:.1} h/day", sizing.generator_hours_per_day);
    }
    if sizing.orion_amps > 0 {
        println!("  Drive to full:  {:.1} h at {}A", sizing.drive_hours_to_full, sizing.orion_amps);
    }
    println!("  Needed to full: {:.1} Ah", sizing.charge_needed_to_full_ah);
    for row in &sizing.shore_power {
        match row.hours {
            Some(hours) => println!(
                "  {:<15} {:.1} h ({:.0}A)",
                format!("{}:", row.label),
                hours,
                row.charge_amps
            ),
            None => println!("  {:<15} can't keep up with the load", format!("{}:", row.label)),
        }
    }
    println!();

    println!("═══════════════════════════════════════");
    if sizing.has_deficit() {
        println!("  DEFICIT: {:.1} Ah/day ✗", sizing.final_energy_deficit_ah);
    } else {
        println!("  OK: {:.1} Ah to spare ✓", sizing.spare_charge_ah());
    }
    println!("═══════════════════════════════════════");

    if let Some(solution) = &sizing.min_solution {
        println!();
        println!("Suggestion: {}", solution.message());
    }

    let hints: Vec<_> = sizing
        .solar_option_hints(spec)
        .into_iter()
        .filter_map(|(watts, hint)| hint.map(|h| (watts, h)))
        .collect();
    if !hints.is_empty() {
        println!();
        println!("Solar options:");
        for (watts, hint) in hints {
            println!("  {:>5.0}W  {}", watts, hint.message());
        }
    }

    println!();
    println!("Notes:");
    for note in sizing.caveats(spec) {
        println!("  - {}", note);
    }
}

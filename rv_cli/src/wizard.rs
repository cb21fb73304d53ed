//! Prompt-driven walk through the four sizing steps.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use rv_core::catalog::{
    appliances_in, find_appliance, Appliance, ApplianceCategory, OrionCharger, SystemSpec,
};
use rv_core::regions::{Region, Season};
use rv_core::{Session, SizingResult, SystemSizing, WizardStep};

/// Line-oriented prompts over any reader/writer pair.
///
/// EOF and unparsable answers fall back to the default, so piping an empty
/// stdin walks the wizard with every default accepted.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: impl Display) {
        let _ = writeln!(self.output, "{}", text);
    }

    /// Trimmed answer, `None` on EOF or a read error
    pub fn line(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{}", prompt);
        if self.output.flush().is_err() {
            return None;
        }

        let mut input = String::new();
        match self.input.read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }

    /// Parsed answer, `None` when blank or unparsable
    pub fn typed<T: FromStr>(&mut self, prompt: &str) -> Option<T> {
        self.line(prompt).and_then(|answer| answer.parse().ok())
    }

    pub fn f64(&mut self, prompt: &str, default: f64) -> f64 {
        self.typed(prompt).unwrap_or(default)
    }

    pub fn u32(&mut self, prompt: &str, default: u32) -> u32 {
        self.typed(prompt).unwrap_or(default)
    }

    pub fn yes_no(&mut self, prompt: &str, default: bool) -> bool {
        match self.line(prompt).as_deref().map(str::to_lowercase).as_deref() {
            Some("y" | "yes") => true,
            Some("n" | "no") => false,
            _ => default,
        }
    }
}

/// Run every step, calling `save` after each one.
pub fn run<R, W, F>(
    prompter: &mut Prompter<R, W>,
    session: &mut Session,
    spec: &SystemSpec,
    mut save: F,
) -> SizingResult<SystemSizing>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Session) -> SizingResult<()>,
{
    for step in WizardStep::ALL {
        prompter.say("");
        prompter.say(format!("── Step {}: {} ──", step_number(step), step.title()));
        match step {
            WizardStep::SelectAppliances => select_appliances(prompter, session),
            WizardStep::SolarCharging => solar_and_charging(prompter, session, spec),
            WizardStep::Battery => battery(prompter, session, spec)?,
            WizardStep::Results => {
                let sizing = session.calculate(spec)?;
                session.complete(WizardStep::Results);
                save(session)?;
                return Ok(sizing);
            }
        }
        save(session)?;
    }
    session.calculate(spec)
}

fn step_number(step: WizardStep) -> usize {
    WizardStep::ALL
        .iter()
        .position(|s| *s == step)
        .map_or(0, |i| i + 1)
}

fn select_appliances<R: BufRead, W: Write>(p: &mut Prompter<R, W>, session: &mut Session) {
    let listed: Vec<&Appliance> = ApplianceCategory::ALL
        .into_iter()
        .flat_map(appliances_in)
        .collect();

    let mut category = None;
    for (n, appliance) in listed.iter().enumerate() {
        if category != Some(appliance.category) {
            category = Some(appliance.category);
            p.say(format!("{}:", appliance.category.display_name()));
        }
        let mark = if session.is_selected(&appliance.id) { "x" } else { " " };
        p.say(format!(
            "  [{}] {:>2}. {} {}",
            mark,
            n + 1,
            appliance.label,
            appliance.wattage_summary()
        ));
    }

    while let Some(answer) = p.line("Toggle numbers (e.g. 3,7), blank when done: ") {
        if answer.is_empty() {
            break;
        }
        for token in answer.split([',', ' ']).filter(|t| !t.is_empty()) {
            let picked = token
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| listed.get(i));
            match picked {
                Some(appliance) => match session.toggle_appliance(&appliance.id) {
                    Ok(true) => p.say(format!("  + {}", appliance.label)),
                    Ok(false) => p.say(format!("  - {}", appliance.label)),
                    Err(e) => p.say(format!("  {}", e)),
                },
                None => p.say(format!("  No appliance numbered {}", token)),
            }
        }
    }

    for id in session.selections.clone() {
        let Ok(appliance) = find_appliance(&id) else {
            continue;
        };
        let usage = session.usage_for(appliance);
        let needs_hours = !appliance.is_idle_draw();
        if !(appliance.has_quantity || needs_hours || appliance.needs_duty_cycle) {
            continue;
        }

        p.say(appliance.label.as_str());
        if appliance.has_quantity {
            let quantity = p.u32(&format!("  Quantity [{}]: ", usage.quantity), usage.quantity);
            report_error(p, session.set_quantity(&id, quantity));
        }
        if needs_hours {
            let hours = p.f64(
                &format!("  Hours per day [{}]: ", usage.hours_per_day),
                usage.hours_per_day,
            );
            report_error(p, session.set_hours(&id, hours));
        }
        if appliance.needs_duty_cycle {
            p.say(format!("  {}", appliance.duty_cycle_hint()));
            let percent = p.f64(
                &format!("  Duty cycle % [{:.0}]: ", usage.duty_cycle * 100.0),
                usage.duty_cycle * 100.0,
            );
            report_error(p, session.set_duty_cycle(&id, percent / 100.0));
        }
    }

    if session.selections.is_empty() {
        p.say("No appliances selected; results need at least one.");
    } else {
        session.complete(WizardStep::SelectAppliances);
    }
}

fn solar_and_charging<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    session: &mut Session,
    spec: &SystemSpec,
) {
    let season_prompt = format!(
        "Season (winter/spring/summer/fall/annual) [{}]: ",
        session.solar.season.key()
    );
    if let Some(answer) = p.line(&season_prompt).filter(|a| !a.is_empty()) {
        match answer.parse::<Season>() {
            Ok(season) => session.set_season(season),
            Err(e) => p.say(e),
        }
    }

    let season = session.solar.season;
    for (n, region) in Region::ALL.iter().enumerate() {
        p.say(format!("  {}. {} ({:.1} PSH)", n + 1, region, region.peak_sun_hours(season)));
    }
    let current = Region::ALL
        .iter()
        .position(|r| *r == session.solar.region)
        .map_or(1, |i| i + 1);
    let choice = p.u32(&format!("Region [{}]: ", current), current as u32) as usize;
    match choice.checked_sub(1).and_then(|i| Region::ALL.get(i)) {
        Some(region) => session.set_region(*region),
        None => p.say(format!("No region numbered {}", choice)),
    }

    let panel = &spec.solar_panel;
    let panels_now = (session.solar.solar_watts / panel.panel_watts).round() as u32;
    let panels = p.u32(
        &format!(
            "{:.0}W solar panels, even count 0-{} [{}]: ",
            panel.panel_watts, panel.max_panels, panels_now
        ),
        panels_now,
    );
    report_error(p, session.set_solar_panels(panels, panel));

    let orion_now = session.charging.orion.map_or(0, u32::from);
    let amps = p.u32(
        &format!("Orion XS DC-DC charger amps (0, 30, 50, 70) [{}]: ", orion_now),
        orion_now,
    );
    match OrionCharger::from_amps(amps) {
        Ok(orion) => session.set_orion(orion),
        Err(e) => p.say(e),
    }

    let has_generator = session.charging.has_generator;
    let answer = p.yes_no(
        &format!("Generator available? (y/n) [{}]: ", if has_generator { "y" } else { "n" }),
        has_generator,
    );
    session.set_generator(answer);
}

/// Blank answers leave the stored value untouched, so an unset count keeps
/// following the recommendation as the loads change.
fn battery<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    session: &mut Session,
    spec: &SystemSpec,
) -> SizingResult<()> {
    let preview = session.calculate(spec)?;
    p.say(format!(
        "Daily use {:.1} Ah, deficit after solar {:.1} Ah: {} x {} recommended",
        preview.daily_amp_hours,
        preview.energy_deficit_ah,
        preview.batteries_needed,
        spec.battery.label
    ));

    let count_prompt = format!("Batteries installed [{}]: ", preview.battery_count);
    if let Some(count) = p.typed::<u32>(&count_prompt) {
        session.set_battery_count(count);
    }

    let efficiency_prompt = format!(
        "Inverter efficiency % [{:.0}]: ",
        preview.inverter_efficiency * 100.0
    );
    if let Some(percent) = p.typed::<f64>(&efficiency_prompt) {
        report_error(p, session.set_inverter_efficiency(percent / 100.0));
    }

    session.complete(WizardStep::Battery);
    Ok(())
}

fn report_error<R: BufRead, W: Write>(p: &mut Prompter<R, W>, result: SizingResult<()>) {
    if let Err(e) = result {
        p.say(format!("  {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_with(
        input: &str,
        session: &mut Session,
    ) -> (SizingResult<SystemSizing>, usize, String) {
        let mut output = Vec::new();
        let mut saves = 0;
        let result = {
            let mut prompter = Prompter::new(Cursor::new(input.to_string()), &mut output);
            run(&mut prompter, session, &SystemSpec::default(), |_| {
                saves += 1;
                Ok(())
            })
        };
        (result, saves, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_empty_input_accepts_defaults() {
        let mut session = Session::new();
        let (result, saves, output) = run_with("", &mut session);

        let sizing = result.unwrap();
        assert_eq!(saves, 4);
        assert!(output.contains("Step 1: Select Appliances"));
        assert_eq!(sizing.battery_count, sizing.batteries_needed);
        assert_eq!(session.current_step(), WizardStep::Results);
        assert!(session.completed.contains(&WizardStep::Results));
        assert_eq!(session.battery.battery_count, None);
        assert_eq!(session.battery.inverter_efficiency, None);
    }

    #[test]
    fn test_blank_battery_count_follows_new_loads() {
        let mut session = Session::new();
        let (result, _, _) = run_with("", &mut session);
        let before = result.unwrap();

        session.toggle_appliance("microwave").unwrap();
        session.set_hours("microwave", 2.0).unwrap();
        let after = session.calculate(&SystemSpec::default()).unwrap();

        assert!(after.batteries_needed > before.batteries_needed);
        assert_eq!(after.battery_count, after.batteries_needed);
    }

    #[test]
    fn test_answers_are_applied() {
        let mut session = Session::new();
        // Only the fridge asks a question in step 1
        let input = [
            "",       // toggles done
            "50",     // fridge duty %
            "winter", // season
            "3",      // region: mountain west
            "4",      // panels
            "50",     // orion
            "y",      // generator
            "2",      // batteries
            "85",     // efficiency
        ]
        .join("\n");
        let (result, _, _) = run_with(&input, &mut session);
        let sizing = result.unwrap();

        assert_eq!(session.solar.season, Season::Winter);
        assert_eq!(session.solar.region, Region::MountainWest);
        assert_eq!(session.solar.solar_watts, 440.0);
        assert_eq!(session.charging.orion, Some(OrionCharger::A50));
        assert!(session.charging.has_generator);
        assert_eq!(sizing.battery_count, 2);
        assert_eq!(sizing.inverter_efficiency, 0.85);
    }

    #[test]
    fn test_bad_answers_keep_previous_values() {
        let mut session = Session::new();
        let input = ["99", "", "", "tuesday", "42", "3", "45", "maybe", "", ""].join("\n");
        let (result, _, output) = run_with(&input, &mut session);

        assert!(result.is_ok());
        assert!(output.contains("No appliance numbered 99"));
        assert!(output.contains("No region numbered 42"));
        assert_eq!(session.solar.region, Region::DesertSouthwest);
        assert_eq!(session.solar.solar_watts, 0.0);
        assert_eq!(session.charging.orion, None);
        assert!(!session.charging.has_generator);
    }

    #[test]
    fn test_deselecting_everything_blocks_battery_step() {
        let mut session = Session::new();
        let idle: Vec<usize> = ApplianceCategory::ALL
            .into_iter()
            .flat_map(appliances_in)
            .enumerate()
            .filter(|(_, a)| session.is_selected(&a.id))
            .map(|(i, _)| i + 1)
            .collect();
        let toggles = idle.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",");

        let (result, saves, output) = run_with(&format!("{}\n", toggles), &mut session);
        assert!(session.selections.is_empty());
        assert!(output.contains("No appliances selected"));
        assert!(!output.contains("Step 4"));
        // Steps 1 and 2 saved, then the battery preview has nothing to size
        assert_eq!(saves, 2);
        assert_eq!(result.unwrap_err().error_code(), "MISSING_UPSTREAM_INPUT");
        assert!(!session.completed.contains(&WizardStep::Battery));
    }

    #[test]
    fn test_yes_no_defaults() {
        let mut output = Vec::new();
        let mut p = Prompter::new(Cursor::new("Y\n\nnope\n".to_string()), &mut output);
        assert!(p.yes_no("? ", false));
        assert!(p.yes_no("? ", true));
        assert!(!p.yes_no("? ", false));
        assert!(p.yes_no("? ", true));
    }
}

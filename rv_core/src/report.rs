//! # PDF Report
//!
//! Renders a sizing result as a one-document PDF using Typst, compiled
//! in-process.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected with `{{PLACEHOLDER}}` replacement before compilation
//! - Fonts come from `typst-assets`, so nothing is read from disk
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use rv_core::catalog::SystemSpec;
//! use rv_core::report::render_sizing_pdf;
//! use rv_core::session::Session;
//!
//! let spec = SystemSpec::default();
//! let session = Session::new();
//! let sizing = session.calculate(&spec).unwrap();
//! let pdf = render_sizing_pdf(&session, &sizing, &spec).unwrap();
//! std::fs::write("rv_power_report.pdf", pdf).unwrap();
//! ```

use std::slice;

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::load::daily_amp_hours;
use crate::calculations::SystemSizing;
use crate::catalog::SystemSpec;
use crate::errors::{SizingError, SizingResult};
use crate::session::Session;
use crate::units::Volts;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Fonts bundled with typst-assets (Libertinus Serif, New Computer Modern, DejaVu Sans Mono)
    fn load_fonts() -> Vec<Font> {
        typst_assets::fonts()
            .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
            .collect()
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Template
// ============================================================================

const SIZING_TEMPLATE: &str = r##"
#set page(
  paper: "us-letter",
  margin: (top: 0.9in, bottom: 0.9in, left: 0.9in, right: 0.9in),
  header: align(right)[
    #text(size: 9pt, fill: gray)[RV Off-Grid Power Sizing]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Session {{SESSION_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10.5pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Power System Sizing Report]
    #v(4pt)
    #text(size: 12pt)[{{REGION}}, {{SEASON}} ({{PSH}} peak sun hours)]
  ]
]

#v(10pt)

#block(width: 100%, fill: {{STATUS_FILL}}, inset: 10pt, radius: 4pt)[
  #text(weight: "bold")[{{STATUS_TITLE}}]
  #h(1fr)
  {{STATUS_DETAIL}}
]

== Appliances

#table(
  columns: (2.6fr, 0.6fr, 1fr, 1fr, 0.8fr, 0.8fr, 1fr),
  align: (left, center, right, right, right, right, right),
  stroke: 0.5pt + gray,
  table.header([*Appliance*], [*Qty*], [*Running W*], [*Starting W*], [*Hours*], [*Duty*], [*Ah/day*]),
{{APPLIANCE_ROWS}}
)

== Power Requirements

#grid(
  columns: (1fr, 1fr),
  gutter: 16pt,
  [
    Running load: *{{RUNNING_W}} W* \
    Starting surge: *{{STARTING_W}} W* \
    Daily use: *{{DAILY_AH}} Ah* \
    Inverter efficiency: {{EFFICIENCY}}%
  ],
  [
    Solar array: *{{SOLAR_W}} W* \
    Solar yield: *{{SOLAR_AH}} Ah/day* \
    Deficit after solar: *{{DEFICIT_AH}} Ah* \
    Array for full coverage: {{REQUIRED_SOLAR_W}} W{{ADDITIONAL_SOLAR}}
  ],
)

== Battery Bank

#table(
  columns: (2fr, 1fr),
  align: (left, right),
  stroke: 0.5pt + gray,
  [Battery], [{{BATTERY_LABEL}}],
  [Batteries recommended], [{{BATTERIES_NEEDED}}],
  [Batteries installed], [{{BATTERY_COUNT}}],
  [Bank capacity (rated)], [{{BANK_TOTAL_AH}} Ah],
  [Bank capacity (usable)], [{{BANK_USABLE_AH}} Ah],
  [{{FINAL_LABEL}}], [{{FINAL_AH}} Ah],
)

== Charging

#table(
  columns: (2fr, 1fr),
  align: (left, right),
  stroke: 0.5pt + gray,
  [Charge needed to full], [{{TO_FULL_AH}} Ah],
  [Generator runtime per day], [{{GENERATOR}}],
  [Drive time to full], [{{DRIVE}}],
)

=== Shore Power

#table(
  columns: (2fr, 1fr, 1fr),
  align: (left, right, right),
  stroke: 0.5pt + gray,
  table.header([*Source*], [*Charge A*], [*Hours to full*]),
{{SHORE_ROWS}}
)

{{SUGGESTION}}

== Notes

{{CAVEATS}}
"##;

/// Render the sizing report for a session.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(SizingError::ReportFailed)` - Typst compilation or PDF export failed
pub fn render_sizing_pdf(
    session: &Session,
    sizing: &SystemSizing,
    spec: &SystemSpec,
) -> SizingResult<Vec<u8>> {
    let source = build_source(session, sizing, spec)?;
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);
    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        SizingError::ReportFailed {
            reason: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        SizingError::ReportFailed {
            reason: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(bytes = pdf_bytes.len(), "sizing report rendered");
    Ok(pdf_bytes)
}

/// Fill the template
fn build_source(
    session: &Session,
    sizing: &SystemSizing,
    spec: &SystemSpec,
) -> SizingResult<String> {
    let (status_fill, status_title, status_detail) = if sizing.has_deficit() {
        (
            "rgb(\"#fde2e1\")",
            "Deficit",
            format!(
                "{:.1} Ah short per day after solar and batteries",
                sizing.final_energy_deficit_ah
            ),
        )
    } else {
        (
            "rgb(\"#e3f4e1\")",
            "Covered",
            format!("{:.1} Ah left in the bank at the end of the day", sizing.spare_charge_ah()),
        )
    };

    let additional_solar = match &sizing.additional_solar {
        Some(rec) => format!(
            " \\\n    Add {} panels ({} pairs, {:.0} W)",
            rec.panels, rec.pairs, rec.watts_in_pairs
        ),
        None => String::new(),
    };

    let (final_label, final_ah) = if sizing.has_deficit() {
        ("Remaining deficit", sizing.final_energy_deficit_ah)
    } else {
        ("Spare charge", sizing.spare_charge_ah())
    };

    let generator = if sizing.has_generator {
        format!("{:.1} h ({})", sizing.generator_hours_per_day, escape_typst(&spec.generator.label))
    } else {
        "No generator".to_string()
    };

    let drive = if sizing.orion_amps > 0 {
        format!("{:.1} h (Orion XS {} A)", sizing.drive_hours_to_full, sizing.orion_amps)
    } else {
        "No DC-DC charger".to_string()
    };

    let suggestion = match &sizing.min_solution {
        Some(solution) => format!(
            "#block(width: 100%, stroke: 0.5pt + gray, inset: 10pt, radius: 4pt)[*Minimum solution:* {}]",
            escape_typst(&solution.message())
        ),
        None => String::new(),
    };

    let caveats = sizing
        .caveats(spec)
        .iter()
        .map(|note| format!("- {}", escape_typst(note)))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(SIZING_TEMPLATE
        .replace("{{SESSION_ID}}", &session.meta.id.to_string()[..8])
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{REGION}}", &escape_typst(sizing.region.label()))
        .replace("{{SEASON}}", sizing.season.label())
        .replace("{{PSH}}", &format!("{:.1}", sizing.peak_sun_hours))
        .replace("{{STATUS_FILL}}", status_fill)
        .replace("{{STATUS_TITLE}}", status_title)
        .replace("{{STATUS_DETAIL}}", &status_detail)
        .replace("{{APPLIANCE_ROWS}}", &build_appliance_rows(session, sizing)?)
        .replace("{{RUNNING_W}}", &format!("{:.0}", sizing.running_watts))
        .replace("{{STARTING_W}}", &format!("{:.0}", sizing.starting_watts))
        .replace("{{DAILY_AH}}", &format!("{:.1}", sizing.daily_amp_hours))
        .replace("{{EFFICIENCY}}", &format!("{:.0}", sizing.inverter_efficiency * 100.0))
        .replace("{{SOLAR_W}}", &format!("{:.0}", sizing.solar_watts))
        .replace("{{SOLAR_AH}}", &format!("{:.1}", sizing.solar_amp_hours))
        .replace("{{DEFICIT_AH}}", &format!("{:.1}", sizing.energy_deficit_ah))
        .replace("{{REQUIRED_SOLAR_W}}", &format!("{:.0}", sizing.required_solar_watts))
        .replace("{{ADDITIONAL_SOLAR}}", &additional_solar)
        .replace("{{BATTERY_LABEL}}", &escape_typst(&spec.battery.label))
        .replace("{{BATTERIES_NEEDED}}", &sizing.batteries_needed.to_string())
        .replace("{{BATTERY_COUNT}}", &sizing.battery_count.to_string())
        .replace("{{BANK_TOTAL_AH}}", &format!("{:.0}", sizing.battery_bank_total_ah))
        .replace("{{BANK_USABLE_AH}}", &format!("{:.0}", sizing.battery_bank_usable_ah))
        .replace("{{FINAL_LABEL}}", final_label)
        .replace("{{FINAL_AH}}", &format!("{:.1}", final_ah))
        .replace("{{TO_FULL_AH}}", &format!("{:.1}", sizing.charge_needed_to_full_ah))
        .replace("{{GENERATOR}}", &generator)
        .replace("{{DRIVE}}", &drive)
        .replace("{{SHORE_ROWS}}", &build_shore_rows(sizing))
        .replace("{{SUGGESTION}}", &suggestion)
        .replace("{{CAVEATS}}", &caveats))
}

fn build_appliance_rows(session: &Session, sizing: &SystemSizing) -> SizingResult<String> {
    let input = session.sizing_input()?;
    let voltage = Volts(sizing.system_voltage);
    let rows: Vec<String> = input
        .appliances
        .iter()
        .map(|item| {
            let daily = daily_amp_hours(slice::from_ref(item), voltage, sizing.inverter_efficiency);
            format!(
                "  [{}], [{}], [{:.0}], [{:.0}], [{:.1}], [{:.0}%], [{:.1}],",
                escape_typst(&item.appliance.label),
                item.quantity,
                item.appliance.running_watts,
                item.appliance.starting_watts,
                item.hours_per_day,
                item.duty_cycle * 100.0,
                daily.0
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

fn build_shore_rows(sizing: &SystemSizing) -> String {
    sizing
        .shore_power
        .iter()
        .map(|row| {
            let hours = match row.hours {
                Some(h) => format!("{:.1}", h),
                None => "Load exceeds charge".to_string(),
            };
            format!(
                "  [{}], [{:.0}], [{}],",
                escape_typst(&row.label),
                row.charge_amps,
                hours
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special Typst characters in text placed in markup
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '/' => "\\/".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

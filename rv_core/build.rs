//! Build script: compiles the TOML data tables in `data/` into static Rust
//! arrays (`$OUT_DIR/generated.rs`), so lookups at runtime can't fail.

use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Region keys in display order. Must match `Region::ALL` in src/regions.rs.
const REGION_ORDER: [&str; 8] = [
    "desert_southwest",
    "new_england_northern_tier",
    "mountain_west",
    "southern_plains_sunbelt",
    "pacific_northwest",
    "southeast_gulf",
    "midatlantic",
    "northern_pacific_coastal",
];

#[derive(Deserialize)]
struct ApplianceFile {
    appliance: Vec<ApplianceRow>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ApplianceRow {
    id: String,
    label: String,
    category: String,
    running_watts: f64,
    starting_watts: f64,
    has_quantity: bool,
    needs_duty_cycle: bool,
    default_duty_cycle: Option<f64>,
    hours_per_day: Option<f64>,
}

#[derive(Deserialize)]
struct RegionFile {
    region: BTreeMap<String, RegionRow>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionRow {
    label: String,
    psh: PshRow,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PshRow {
    winter: f64,
    spring: f64,
    summer: f64,
    fall: f64,
    annual: f64,
}

fn category_variant(category: &str) -> &'static str {
    match category {
        "idle_draw" => "IdleDraw",
        "kitchen" => "Kitchen",
        "climate" => "Climate",
        "electronics" => "Electronics",
        "personal" => "Personal",
        "tools" => "Tools",
        other => panic!("data/appliances.toml: unknown category '{}'", other),
    }
}

fn option_literal(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("Some({:?})", v),
        None => "None".to_string(),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=data/appliances.toml");
    println!("cargo:rerun-if-changed=data/regions.toml");

    let appliances_src =
        fs::read_to_string("data/appliances.toml").expect("read data/appliances.toml");
    let appliances: ApplianceFile =
        toml::from_str(&appliances_src).expect("parse data/appliances.toml");

    let regions_src = fs::read_to_string("data/regions.toml").expect("read data/regions.toml");
    let regions: RegionFile = toml::from_str(&regions_src).expect("parse data/regions.toml");

    let mut out = String::new();
    out.push_str("// @generated by build.rs from data/*.toml - do not edit\n\n");

    out.push_str("pub static APPLIANCE_RECORDS: &[ApplianceRecord] = &[\n");
    let mut seen = std::collections::HashSet::new();
    for row in &appliances.appliance {
        assert!(seen.insert(row.id.clone()), "duplicate appliance id '{}'", row.id);
        if let Some(duty) = row.default_duty_cycle {
            assert!((0.0..=1.0).contains(&duty), "{}: duty cycle out of range", row.id);
        }
        writeln!(
            out,
            "    ApplianceRecord {{ id: {:?}, label: {:?}, category: ApplianceCategory::{}, \
             running_watts: {:?}, starting_watts: {:?}, has_quantity: {}, needs_duty_cycle: {}, \
             default_duty_cycle: {}, hours_per_day: {} }},",
            row.id,
            row.label,
            category_variant(&row.category),
            row.running_watts,
            row.starting_watts,
            row.has_quantity,
            row.needs_duty_cycle,
            option_literal(row.default_duty_cycle),
            option_literal(row.hours_per_day),
        )
        .unwrap();
    }
    out.push_str("];\n\n");

    // Rows are emitted in REGION_ORDER so Region::index() can address them directly.
    out.push_str("pub static REGION_RECORDS: [RegionRecord; 8] = [\n");
    for key in REGION_ORDER {
        let row = regions
            .region
            .get(key)
            .unwrap_or_else(|| panic!("data/regions.toml: missing region '{}'", key));
        writeln!(
            out,
            "    RegionRecord {{ key: {:?}, label: {:?}, psh: [{:?}, {:?}, {:?}, {:?}, {:?}] }},",
            key, row.label, row.psh.winter, row.psh.spring, row.psh.summer, row.psh.fall, row.psh.annual,
        )
        .unwrap();
    }
    out.push_str("];\n");

    assert_eq!(
        regions.region.len(),
        REGION_ORDER.len(),
        "data/regions.toml: unexpected extra regions"
    );

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    fs::write(Path::new(&out_dir).join("generated.rs"), out).expect("write generated.rs");
}

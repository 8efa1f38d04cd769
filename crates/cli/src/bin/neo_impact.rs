use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neo_impact_calculator::atmosphere::StandardAtmosphere;
use neo_impact_calculator::config::{load_engine_config, load_scenarios};
use neo_impact_calculator::effects::{DamageTier, ImpactReport, impact_effects_with};
use neo_impact_calculator::energy::{AsteroidProfile, DensitySource, MaterialClass};
use neo_impact_calculator::entry::{EntryBody, EntryState, simulate_entry};
use neo_impact_calculator::feed::read_neo_file;
use neo_impact_calculator::scenario::{
    EngineSettings, assess_scenarios, feed_density, parse_material, parse_target,
    profile_from_feed,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Impact and close-approach effects of near-Earth objects"
)]
struct Cli {
    /// Engine configuration file (YAML or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Energy, blast, gravity and crater estimates for one body
    Effects {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Reference distance in km (repeatable, replaces the defaults)
        #[arg(long = "reference-distance")]
        reference_distances: Vec<f64>,

        /// Ground material: default, sand or clay
        #[arg(long)]
        target: Option<String>,
    },
    /// Atmospheric descent history for one body
    Entry {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Starting altitude in metres
        #[arg(long)]
        initial_altitude: Option<f64>,

        /// Altitude decrement per step in metres
        #[arg(long)]
        altitude_step: Option<f64>,

        /// Emit every Nth sample
        #[arg(long, default_value_t = 1000)]
        every: usize,
    },
    /// Effects for every scenario in a catalog file or directory
    Scenarios {
        #[arg(long)]
        file: PathBuf,
    },
    /// Effects for a saved NEO lookup record
    Feed {
        #[arg(long)]
        file: PathBuf,

        /// Close-approach date (YYYY-MM-DD); defaults to the closest approach
        #[arg(long)]
        date: Option<String>,

        /// Material class: carbonaceous, stony, metallic or default
        #[arg(long, conflicts_with = "density")]
        material: Option<String>,

        /// Bulk density in kg/m³ (3000 when neither this nor --material is given)
        #[arg(long)]
        density: Option<f64>,
    },
}

#[derive(Args)]
struct ProfileArgs {
    /// Minimum estimated diameter in km
    #[arg(long)]
    diameter_min: f64,

    /// Maximum estimated diameter in km
    #[arg(long)]
    diameter_max: f64,

    /// Material class: carbonaceous, stony, metallic or default
    #[arg(long, conflicts_with = "density")]
    material: Option<String>,

    /// Bulk density in kg/m³
    #[arg(long)]
    density: Option<f64>,

    /// Relative velocity in km/h
    #[arg(long)]
    velocity: f64,

    /// Miss or impact distance in km
    #[arg(long)]
    distance: f64,

    /// Known mass in kg (derived from size and density otherwise)
    #[arg(long)]
    mass: Option<f64>,
}

#[derive(Serialize)]
struct EffectsOutput<'a> {
    report: &'a ImpactReport,
    damage: Vec<DamageEntry>,
}

#[derive(Serialize)]
struct DamageEntry {
    distance_km: f64,
    tier: DamageTier,
    description: &'static str,
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    body: &'a EntryBody,
    iterations: usize,
    solver_steps: usize,
    rhs_evaluations: usize,
    peak_rate_m_s: f64,
    final_state: Option<&'a EntryState>,
    samples: Vec<&'a EntryState>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => {
            let config = load_engine_config(path)
                .with_context(|| format!("loading {}", path.display()))?;
            EngineSettings::from_config(&config)?
        }
        None => EngineSettings::default(),
    };

    match cli.command {
        Command::Effects {
            profile,
            reference_distances,
            target,
        } => {
            if !reference_distances.is_empty() {
                settings.effects.reference_distances_km = reference_distances;
            }
            if let Some(target) = target {
                settings.effects.target = parse_target(&target)?;
            }
            let profile = build_profile(&profile, &settings)?;
            let report = impact_effects_with(&profile, &settings.effects)?;
            print_effects(&report)?;
        }
        Command::Entry {
            profile,
            initial_altitude,
            altitude_step,
            every,
        } => {
            if every == 0 {
                bail!("--every must be at least 1");
            }
            if let Some(altitude) = initial_altitude {
                settings.entry.initial_altitude_m = altitude;
            }
            if let Some(step) = altitude_step {
                settings.entry.altitude_step_m = step;
                settings.entry.step_duration_s = step / settings.entry.initial_rate_m_s.abs();
            }
            let profile = build_profile(&profile, &settings)?;
            let trajectory =
                simulate_entry(&profile, &settings.entry, &StandardAtmosphere::default())?;
            info!(iterations = trajectory.iterations(), "entry run complete");

            let output = EntryOutput {
                body: trajectory.body(),
                iterations: trajectory.iterations(),
                solver_steps: trajectory.solver_steps(),
                rhs_evaluations: trajectory.rhs_evaluations(),
                peak_rate_m_s: trajectory.peak_rate_m_s(),
                final_state: trajectory.final_state(),
                samples: trajectory.samples().iter().step_by(every).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Scenarios { file } => {
            let scenarios =
                load_scenarios(&file).with_context(|| format!("loading {}", file.display()))?;
            let reports = assess_scenarios(&scenarios, &settings)?;
            info!(count = reports.len(), "scenarios assessed");
            let named: Vec<_> = reports
                .iter()
                .map(|(name, report)| serde_json::json!({ "name": name, "report": report }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&named)?);
        }
        Command::Feed {
            file,
            date,
            material,
            density,
        } => {
            let record = read_neo_file(&file)?;
            let approach = match &date {
                Some(date) => record.approach_on(date)?,
                None => record.closest_approach()?,
            };
            info!(name = %record.name, date = %approach.close_approach_date, "using close approach");
            let density = feed_density(material.as_deref(), density)?;
            let profile = profile_from_feed(
                &record.profile_inputs(approach),
                density,
                &settings.density_table,
            )?;
            let report = impact_effects_with(&profile, &settings.effects)?;
            print_effects(&report)?;
        }
    }

    Ok(())
}

fn build_profile(args: &ProfileArgs, settings: &EngineSettings) -> anyhow::Result<AsteroidProfile> {
    let density = match (args.density, &args.material) {
        (Some(kg_m3), _) => DensitySource::KgM3(kg_m3),
        (None, Some(material)) => DensitySource::Class(parse_material(material)?),
        (None, None) => DensitySource::Class(MaterialClass::Default),
    };
    let mut builder = AsteroidProfile::builder()
        .diameter_range_km(args.diameter_min, args.diameter_max)
        .density(density)
        .velocity_kmh(args.velocity)
        .distance_km(args.distance);
    if let Some(mass) = args.mass {
        builder = builder.mass_kg(mass);
    }
    Ok(builder.build(&settings.density_table)?)
}

fn print_effects(report: &ImpactReport) -> anyhow::Result<()> {
    let damage = report
        .effects_by_distance
        .iter()
        .map(|effect| {
            let tier = effect.damage_tier();
            DamageEntry {
                distance_km: effect.distance_km,
                tier,
                description: tier.description(),
            }
        })
        .collect();
    let output = EffectsOutput { report, damage };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

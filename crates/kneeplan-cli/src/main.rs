use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kneeplan_algo::{Planner, PlannerConfig};
use kneeplan_core::landmark::{LandmarkKey, LandmarkStore};
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "kneeplan")]
#[command(about = "Distal femur resection planning from picked landmarks.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive axes, planes and clearances from a landmark file.
    Plan {
        /// JSON object mapping landmark keys to `[x, y, z]` in millimetres.
        landmarks: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        varus_valgus: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        flexion_extension: i32,
        /// Target distal resection depth; defaults to the planner default.
        #[arg(long)]
        resection_depth: Option<f64>,
        #[arg(long, default_value_t = 10.0)]
        construction_length: f64,
        #[arg(long, default_value_t = 100.0)]
        plane_size: f64,
        /// Mark the resection clip surface as active in the report.
        #[arg(long)]
        clip: bool,
        #[arg(long)]
        hide_tibia: bool,
    },
    /// List the landmark keys a plan needs.
    Keys,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan {
            landmarks,
            report,
            varus_valgus,
            flexion_extension,
            resection_depth,
            construction_length,
            plane_size,
            clip,
            hide_tibia,
        } => {
            let cfg = PlannerConfig {
                construction_length_mm: construction_length,
                plane_size_mm: plane_size,
                ..PlannerConfig::default()
            };
            let opts = PlanOptions {
                varus_valgus,
                flexion_extension,
                resection_depth,
                clip,
                hide_tibia,
            };
            plan(&landmarks, report.as_deref(), cfg, &opts)
        }
        Command::Keys => {
            for key in LandmarkKey::ALL {
                println!("{key}");
            }
            Ok(())
        }
    }
}

struct PlanOptions {
    varus_valgus: i32,
    flexion_extension: i32,
    resection_depth: Option<f64>,
    clip: bool,
    hide_tibia: bool,
}

fn plan(input: &Path, report: Option<&Path>, cfg: PlannerConfig, opts: &PlanOptions) -> Result<()> {
    let landmarks = load_landmarks(input)?;
    log::info!("loaded {} landmarks from {input:?}", landmarks.len());

    let mut planner = Planner::with_landmarks(cfg, landmarks);
    planner
        .run_full_pipeline()
        .context("derive plan from landmarks")?;

    for _ in 0..opts.varus_valgus.unsigned_abs() {
        planner
            .adjust_varus_valgus(opts.varus_valgus.signum())
            .context("adjust varus/valgus")?;
    }
    for _ in 0..opts.flexion_extension.unsigned_abs() {
        planner
            .adjust_flexion_extension(opts.flexion_extension.signum())
            .context("adjust flexion/extension")?;
    }
    if let Some(target) = opts.resection_depth {
        if !target.is_finite() {
            bail!("resection depth must be a finite number, got {target}");
        }
        step_resection_depth(&mut planner, target)?;
    }

    planner.set_resection_clipping(opts.clip);
    planner.set_tibia_visible(!opts.hide_tibia);

    let snapshot = planner.snapshot();
    if let Some(c) = &snapshot.clearances {
        log::info!("medial clearance {}, lateral clearance {}", c.medial_label, c.lateral_label);
    }
    let json = serde_json::to_string_pretty(&snapshot).context("serialize plan")?;

    if let Some(path) = report {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(path, &json).with_context(|| format!("write report: {path:?}"))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

/// Walks the resection depth to `target` in 1 mm clicks, then the remainder.
fn step_resection_depth(planner: &mut Planner, target: f64) -> Result<()> {
    let mut remaining = target - planner.offsets().resection_depth_mm;
    while remaining.abs() >= 1.0 {
        let click = remaining.signum();
        planner
            .adjust_resection_depth(click)
            .context("adjust resection depth")?;
        remaining -= click;
    }
    if remaining != 0.0 {
        planner
            .adjust_resection_depth(remaining)
            .context("adjust resection depth")?;
    }
    Ok(())
}

fn load_landmarks(input: &Path) -> Result<LandmarkStore> {
    let text = std::fs::read_to_string(input).with_context(|| format!("read landmarks: {input:?}"))?;
    let raw: BTreeMap<String, [f64; 3]> =
        serde_json::from_str(&text).with_context(|| format!("parse landmarks: {input:?}"))?;

    let mut store = LandmarkStore::new();
    for (name, [x, y, z]) in raw {
        let key: LandmarkKey = name.parse()?;
        store.set(key, Point3::new(x, y, z));
    }
    Ok(store)
}

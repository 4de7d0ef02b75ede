use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rust_solar::model::catalog::{Catalog, ScaleConstants};

#[derive(Debug, Parser)]
struct Args {
    /// Only show this body
    name: Option<String>,
    /// JSON catalog to read instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => match Catalog::from_file(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("{}", err);
                return ExitCode::FAILURE;
            }
        },
        None => Catalog::builtin(),
    };
    let scale = ScaleConstants::default();

    let name = match &args.name {
        None => {
            print!("{}", catalog.summary_table(&scale));
            return ExitCode::SUCCESS;
        }
        Some(name) => name,
    };

    let body = match catalog.get(name) {
        Some(body) => body,
        None => {
            log::error!("No body named {:?}", name);
            return ExitCode::FAILURE;
        }
    };

    let params = body.derive(&scale);
    println!("Scene parameters for {}", body.name);
    println!("- Render size: {}", params.render_size);
    println!("- Orbit radius: {}", params.orbit_radius);
    println!("- Angular speed: {} rad/frame", params.angular_speed);
    if params.angular_speed > 0.0 {
        let frames = std::f32::consts::TAU / params.angular_speed;
        println!("- One orbit: {:.0} frames ({:.1} s at 60 fps)", frames, frames / 60.0);
    }
    println!("- Rings: {}", body.has_rings);
    println!("- Moon: {}", body.has_moon);
    println!("- {}", body.description);
    ExitCode::SUCCESS
}

// Render a JSON scene to an image.
// Run with: cargo run --release -- <scene.json> [output.png]

use anyhow::{Context, Result};
use radiant_core::{load_scene, TracerKind};
use radiant_renderer::{
    ray_computer, render, ObjectTracer, RadiosityScene, RadiosityTracer, RayCastHemicube, Scene, ShaderBindings,
};
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <scene.json> [output.png]", args[0]);
        std::process::exit(1);
    }
    let scene_path = &args[1];
    let output = args.get(2).map(String::as_str).unwrap_or("render.png");

    let desc = load_scene(scene_path).with_context(|| format!("Failed to load scene {}", scene_path))?;
    let scene = Scene::build(&desc, &ShaderBindings::new()).with_context(|| format!("Invalid scene {}", scene_path))?;
    log::info!(
        "Loaded {}: {} objects, {} primitives, {} lights",
        scene_path,
        scene.objects.len(),
        scene.primitives.len(),
        scene.lights.len()
    );

    let settings = &desc.settings;
    let aspect = settings.width as f32 / settings.height.max(1) as f32;
    let camera = ray_computer(&scene.camera, aspect);

    let image = match settings.tracer {
        TracerKind::Whitted => render(settings, camera.as_ref(), || {
            ObjectTracer::new(&scene, settings.max_depth)
        }),
        TracerKind::Radiosity => {
            let params = desc.radiosity.clone();
            let mut hemicube = RayCastHemicube::new(params.hemicube_resolution);
            let steps = params.steps;
            let mut radiosity = RadiosityScene::new(&scene, params);
            radiosity.run(&mut hemicube, steps);
            render(settings, camera.as_ref(), || {
                RadiosityTracer::new(&radiosity, settings.max_depth)
            })
        }
    };

    image.save(output).with_context(|| format!("Failed to write {}", output))?;
    log::info!("Wrote {}", output);

    Ok(())
}

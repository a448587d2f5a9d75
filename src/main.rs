use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use coachmarks::scene::{self, Scene};

const USAGE: &str = "usage: coachmarks <scene.json> <out.png>";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args_os().skip(1);
    let (Some(scene_path), Some(out_path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    if args.next().is_some() {
        bail!(USAGE);
    }
    let (scene_path, out_path) = (PathBuf::from(scene_path), PathBuf::from(out_path));

    let scene = Scene::from_file(&scene_path)?;
    log::info!(
        "Rendering {} mark(s) on a {}x{} root @ {}",
        scene.marks.len(),
        scene.width,
        scene.height,
        scene.scale
    );
    let pixmap = scene
        .render()
        .with_context(|| format!("Failed to render {}", scene_path.display()))?;
    scene::save_png(&pixmap, &out_path)?;
    log::info!("Saved {}", out_path.display());
    Ok(())
}

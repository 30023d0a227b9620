#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use birbs::Engine;
    use birbs::engine::{PRESET_SKY_WIDGET, preset_catalog};
    use nalgebra::Vector3;
    use tracing_subscriber::EnvFilter;

    const FRAME_DT: f64 = 1.0 / 60.0;
    const DEFAULT_FRAMES: usize = 600;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // usage: birbs [preset] [frames]
    let mut args = std::env::args().skip(1);
    let preset = args.next().unwrap_or_else(|| PRESET_SKY_WIDGET.to_string());
    let frames = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut engine = match Engine::new_builtin(&preset) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("available presets:");
            for info in preset_catalog() {
                eprintln!("  {:<12} {}", info.id, info.description);
            }
            std::process::exit(2);
        }
    };

    println!("preset = {}, agents = {}", engine.preset_id(), engine.len());
    println!("boundary = {:?}", engine.flock().boundary().to_array());

    for frame in 1..=frames {
        engine.tick(FRAME_DT);
        if frame % 60 == 0 || frame == frames {
            let flock = engine.flock();
            let c = flock.centroid().unwrap_or_else(Vector3::zeros);
            println!(
                "t = {:6.2} s  centroid = ({:8.1}, {:8.1}, {:8.1})  mean speed = {:6.1}  outside = {}",
                flock.time(),
                c.x,
                c.y,
                c.z,
                flock.mean_speed(),
                flock.count_outside(),
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

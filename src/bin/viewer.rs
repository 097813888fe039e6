use gravlens::scene::Quality;
use gravlens::viewer::{run_viewer, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = ViewerConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-w" | "--width" => {
                config.width = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1024);
                i += 1;
            }
            "-h" | "--height" => {
                config.height = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(768);
                i += 1;
            }
            "-q" | "--quality" => {
                let q = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(2);
                config.quality = Quality::new(q);
                i += 1;
            }
            "--fov" => {
                config.fov_deg = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(80.0);
                i += 1;
            }
            "-d" | "--distance" => {
                config.distance = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(20.0);
                i += 1;
            }
            "--disk" => {
                config.disk_path = args.get(i + 1).map(Into::into);
                i += 1;
            }
            "--sky" => {
                config.sky_path = args.get(i + 1).map(Into::into);
                i += 1;
            }
            "--no-vsync" => {
                config.vsync = false;
            }
            "--help" => {
                println!("gravlens - gravitational lensing viewer");
                println!();
                println!("Usage: viewer [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -w, --width <PIXELS>     Window width (default: 1024)");
                println!("  -h, --height <PIXELS>    Window height (default: 768)");
                println!("  -q, --quality <1-20>     Quality preset (default: 2)");
                println!("      --fov <DEGREES>      Field of view, 30-150 (default: 80)");
                println!("  -d, --distance <UNITS>   Camera distance, 5-50 (default: 20)");
                println!("      --disk <PATH>        Accretion disk texture image");
                println!("      --sky <PATH>         Sky sphere texture image");
                println!("      --no-vsync           Uncapped present mode");
                return Ok(());
            }
            other => {
                log::warn!("ignoring unknown argument {other:?}");
            }
        }
        i += 1;
    }

    run_viewer(config)
}

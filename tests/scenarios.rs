// tests/scenarios.rs
// End-to-end accumulation scenarios at 256x256 against a headless
// device. Every test skips cleanly on machines without a GPU adapter.

use glam::Vec3;
use image::RgbaImage;

use gravlens::camera::OrbitCamera;
use gravlens::math::to_spherical;
use gravlens::scene::{Hitable, Scene};
use gravlens::Renderer;

const SIZE: u32 = 256;

fn make_renderer(width: u32, height: u32) -> Option<Renderer> {
    let gpu = match gravlens::gpu::ctx() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("skipping GPU scenario: {e}");
            return None;
        }
    };
    Some(
        Renderer::new(gpu, width, height, wgpu::TextureFormat::Rgba8Unorm)
            .expect("renderer creation failed"),
    )
}

fn camera_at(position: Vec3) -> OrbitCamera {
    let s = to_spherical(position);
    OrbitCamera::new(s.r, s.phi, s.theta)
}

fn solid(r: u8, g: u8, b: u8) -> RgbaImage {
    let mut img = RgbaImage::new(1, 1);
    img.put_pixel(0, 0, image::Rgba([r, g, b, 255]));
    img
}

fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

#[test]
fn flat_space_without_hitables_stays_zero() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    let mut scene = Scene::default();
    scene.camera = camera_at(Vec3::new(0.0, 3.0, -20.0));
    scene.ode.set_potential_coefficient(0.0);
    scene.hitables.clear();
    renderer.set_scene(scene);
    // Nothing can stop a ray; the property holds for any iteration cap.
    renderer.set_max_iterations(2_000);

    let rays = renderer.step_frame(None).expect("frame failed");
    assert_eq!(rays, SIZE * SIZE);

    let data = renderer.image_data().expect("readback failed");
    assert_eq!(data.len(), (SIZE * SIZE * 4) as usize);
    assert!(data.iter().all(|&b| b == 0), "expected an all-zero image");
}

#[test]
fn white_sky_converges_in_one_frame() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    let mut scene = Scene::default();
    scene.camera = camera_at(Vec3::new(0.0, 3.0, -20.0));
    scene.ode.set_potential_coefficient(0.0);
    scene.hitables = vec![Hitable::Sky { radius: 30.0, phi_offset: 0.0 }];
    renderer.set_scene(scene);
    renderer.load_sky_texture(&solid(255, 255, 255));
    renderer.set_max_iterations(5_000);

    renderer.step_frame(None).expect("frame failed");
    let data = renderer.image_data().expect("readback failed");
    assert!(
        data.iter().all(|&b| b == 255),
        "every escaping ray must pick up the white sky at full strength"
    );
}

#[test]
fn horizon_silhouette_is_black_on_zero() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    let mut scene = Scene::default();
    scene.camera = camera_at(Vec3::new(0.0, 0.0, -20.0));
    scene.hitables = vec![Hitable::Horizon { radius: 2.0 }];
    renderer.set_scene(scene);
    renderer.set_max_iterations(5_000);

    renderer.step_frame(None).expect("frame failed");
    let data = renderer.image_data().expect("readback failed");

    // Captured rays composite opaque black; the silhouette spans well
    // past the center at the default 80 degree FOV.
    let center = pixel(&data, SIZE, SIZE / 2, SIZE / 2);
    assert_eq!(center, [0, 0, 0, 255], "center must be the shadow");

    // Far off-axis rays miss everything and never composite.
    let corner = pixel(&data, SIZE, 2, 2);
    assert_eq!(corner, [0, 0, 0, 0], "corner must stay untouched");
}

#[test]
fn full_scene_layers_disk_and_sky() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    renderer.set_scene(Scene::default());
    renderer.load_disk_texture(&solid(255, 0, 0));
    renderer.load_sky_texture(&solid(0, 0, 255));
    renderer.set_max_iterations(10_000);

    for _ in 0..5 {
        renderer.step_frame(None).expect("frame failed");
    }
    assert_eq!(renderer.frame_count(), 5);

    let data = renderer.image_data().expect("readback failed");
    let mut disk_dominant = 0usize;
    let mut sky_dominant = 0usize;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let [r, _, b, a] = pixel(&data, SIZE, x, y);
            if a == 0 {
                continue;
            }
            if r > 128 && r > b {
                disk_dominant += 1;
            }
            if b > 128 && b > r {
                sky_dominant += 1;
            }
        }
    }
    assert!(disk_dominant > 100, "disk hits: {disk_dominant}");
    assert!(sky_dominant > 1000, "sky hits: {sky_dominant}");
}

#[test]
fn parameter_change_resets_accumulator() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    let mut scene = Scene::default();
    scene.camera = camera_at(Vec3::new(0.0, 3.0, -20.0));
    renderer.set_scene(scene.clone());
    renderer.load_disk_texture(&solid(255, 0, 0));
    renderer.load_sky_texture(&solid(0, 0, 255));
    renderer.set_max_iterations(5_000);
    // Zero jitter makes every frame identical, so images compare exact.
    renderer.set_jitter_scale(0.0);

    for _ in 0..10 {
        renderer.step_frame(None).expect("frame failed");
    }
    let before = renderer.image_data().expect("readback failed");

    scene.camera.set_fov_deg(60.0);
    renderer.set_scene(scene);
    assert_eq!(renderer.frame_count(), 0, "scene change must reset");

    renderer.step_frame(None).expect("frame failed");
    let first = renderer.image_data().expect("readback failed");
    assert_ne!(before, first, "narrower FOV must change the image");

    // The post-reset frame wrote its color directly: re-running a
    // single deterministic frame reproduces it bit for bit.
    renderer.reset();
    renderer.step_frame(None).expect("frame failed");
    let again = renderer.image_data().expect("readback failed");
    assert_eq!(first, again);
}

#[test]
fn horizon_crossing_inside_annulus_paints_disk() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    // Near-equatorial camera aimed at the origin: the central ray's
    // height shrinks toward the hole, so its horizon crossing satisfies
    // |y| < 0.1 before the ray ever crosses the disk plane. With the
    // annulus reaching inside the horizon radius, that crossing paints
    // the disk instead of the shadow.
    let mut scene = Scene::default();
    scene.camera = camera_at(Vec3::new(0.0, 0.5, -20.0));
    scene.hitables = vec![
        Hitable::Disk { r_inner: 1.0, r_outer: 12.0 },
        Hitable::Horizon { radius: 2.0 },
    ];
    renderer.set_scene(scene.clone());
    renderer.load_disk_texture(&solid(255, 0, 0));
    renderer.set_max_iterations(5_000);
    renderer.set_jitter_scale(0.0);

    renderer.step_frame(None).expect("frame failed");
    let data = renderer.image_data().expect("readback failed");
    let center = pixel(&data, SIZE, SIZE / 2, SIZE / 2);
    assert_eq!(center[3], 255);
    assert!(center[0] > 200, "center must carry the disk sample: {center:?}");

    // Control: with the annulus outside the horizon, the same ray is
    // swallowed black.
    scene.hitables[0] = Hitable::Disk { r_inner: 2.6, r_outer: 12.0 };
    renderer.set_scene(scene);
    renderer.step_frame(None).expect("frame failed");
    let data = renderer.image_data().expect("readback failed");
    let center = pixel(&data, SIZE, SIZE / 2, SIZE / 2);
    assert_eq!(center, [0, 0, 0, 255]);
}

#[test]
fn readback_is_tightly_packed_at_odd_widths() {
    // 250 * 4 = 1000 bytes per row, forcing copy padding.
    let Some(mut renderer) = make_renderer(250, 130) else {
        return;
    };
    let mut scene = Scene::default();
    scene.hitables = vec![Hitable::Sky { radius: 30.0, phi_offset: 0.0 }];
    scene.ode.set_potential_coefficient(0.0);
    renderer.set_scene(scene);
    renderer.load_sky_texture(&solid(255, 255, 255));
    renderer.set_max_iterations(5_000);

    renderer.step_frame(None).expect("frame failed");
    let data = renderer.image_data().expect("readback failed");
    assert_eq!(data.len(), 250 * 130 * 4);
    assert!(data.iter().all(|&b| b == 255));
}

#[test]
fn resize_recreates_targets_and_resets() {
    let Some(mut renderer) = make_renderer(SIZE, SIZE) else {
        return;
    };
    renderer.set_max_iterations(2_000);
    renderer.step_frame(None).expect("frame failed");
    assert_eq!(renderer.frame_count(), 1);

    renderer.resize(128, 64);
    assert_eq!(renderer.frame_count(), 0);
    assert_eq!((renderer.width(), renderer.height()), (128, 64));

    let rays = renderer.step_frame(None).expect("frame failed");
    assert_eq!(rays, 128 * 64);
    let data = renderer.image_data().expect("readback failed");
    assert_eq!(data.len(), 128 * 64 * 4);
}

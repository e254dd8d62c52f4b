use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::math::{clamp_u8, hsv_to_rgb, Vec3};
use crate::record::{encode_record, quantize_quat_component, RECORD_SIZE};

// --- Demo scene generators, emitting raw 32-byte records ---

fn random_sphere_point(rng: &mut impl Rng) -> Vec3 {
    let z = rng.random_range(-1.0_f32..1.0_f32);
    let theta = rng.random_range(0.0_f32..TAU);
    let r = (1.0 - z * z).sqrt();
    Vec3::new(r * theta.cos(), z, r * theta.sin())
}

fn random_quat(rng: &mut impl Rng) -> [u8; 4] {
    let v = [
        rng.random_range(-1.0_f32..1.0_f32),
        rng.random_range(-1.0_f32..1.0_f32),
        rng.random_range(-1.0_f32..1.0_f32),
        rng.random_range(-1.0_f32..1.0_f32),
    ];
    let len = v.iter().map(|c| c * c).sum::<f32>().sqrt().max(1e-6);
    v.map(|c| quantize_quat_component(c / len))
}

fn push_record(out: &mut Vec<u8>, position: Vec3, scale: Vec3, rgb: [u8; 3], opacity: f32, quat: [u8; 4]) {
    let color = [rgb[0], rgb[1], rgb[2], clamp_u8(opacity * 255.0)];
    out.extend_from_slice(&encode_record(position.to_array(), scale.to_array(), color, quat));
}

fn torus_knot_records(rng: &mut StdRng, count: usize, out: &mut Vec<u8>) {
    let p = 2.0;
    let q = 3.0;
    let major = 1.4;
    let minor = 0.38;

    for i in 0..count {
        let t = i as f32 / count.max(1) as f32 * TAU * 2.0;

        // Knot lies in the XZ plane, Y up.
        let base = Vec3::new(
            (major + minor * (q * t).cos()) * (p * t).cos(),
            minor * (q * t).sin(),
            (major + minor * (q * t).cos()) * (p * t).sin(),
        );
        let jitter = Vec3::new(
            rng.random_range(-0.04_f32..0.04_f32),
            rng.random_range(-0.04_f32..0.04_f32),
            rng.random_range(-0.04_f32..0.04_f32),
        );

        let hue = ((q * t).sin() * 0.5 + 0.5) * 360.0;
        let scale = rng.random_range(0.018_f32..0.042_f32);
        let opacity = rng.random_range(0.68_f32..0.95_f32);
        let quat = random_quat(rng);
        push_record(
            out,
            base + jitter,
            Vec3::new(scale, scale * rng.random_range(0.9..1.2), scale),
            hsv_to_rgb(hue, 0.80, 0.95),
            opacity,
            quat,
        );
    }
}

fn sphere_cluster_records(rng: &mut StdRng, count: usize, out: &mut Vec<u8>) {
    let centers = [
        Vec3::new(1.8, 0.3, 0.4),
        Vec3::new(-1.6, -0.2, 0.8),
        Vec3::new(0.3, 1.2, -1.6),
        Vec3::new(-0.5, -1.0, -1.4),
    ];
    let palette = [
        [255, 120, 80],
        [100, 210, 255],
        [160, 255, 130],
        [255, 220, 90],
    ];

    for i in 0..count {
        let cluster = i % centers.len();
        let base_color: [u8; 3] = palette[cluster];

        let dir = random_sphere_point(rng);
        let radius = rng.random::<f32>().cbrt() * rng.random_range(0.5_f32..1.4_f32);
        let position = centers[cluster] + dir * radius;

        let color = [
            clamp_u8(base_color[0] as f32 + rng.random_range(-25.0_f32..25.0_f32)),
            clamp_u8(base_color[1] as f32 + rng.random_range(-25.0_f32..25.0_f32)),
            clamp_u8(base_color[2] as f32 + rng.random_range(-25.0_f32..25.0_f32)),
        ];

        let scale = rng.random_range(0.02_f32..0.06_f32);
        let opacity = rng.random_range(0.60_f32..0.95_f32);
        let quat = random_quat(rng);
        push_record(
            out,
            position,
            Vec3::new(scale, scale * rng.random_range(0.8..1.3), scale),
            color,
            opacity,
            quat,
        );
    }
}

/// Torus knot (two thirds) plus four sphere clusters, reproducible per seed.
pub fn generate_demo_records(count: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(count * RECORD_SIZE);
    let knot = count * 2 / 3;
    torus_knot_records(&mut rng, knot, &mut out);
    sphere_cluster_records(&mut rng, count - knot, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordBuffer;

    #[test]
    fn count_and_determinism() {
        let a = generate_demo_records(300, 5);
        assert_eq!(a.len(), 300 * RECORD_SIZE);
        assert_eq!(a, generate_demo_records(300, 5));
        assert_ne!(a, generate_demo_records(300, 6));
    }

    #[test]
    fn records_stay_near_the_origin() {
        let bytes = generate_demo_records(1_000, 1);
        let records = RecordBuffer::from_bytes(&bytes).expect("records");
        for record in records.iter() {
            let c = Vec3::from(record.center());
            assert!(c.length() < 4.0, "{c:?} outside the demo scene");
            assert!(record.scale().iter().all(|&s| s > 0.0 && s < 0.1));
        }
    }
}

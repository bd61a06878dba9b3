use std::f32::consts::PI;

use crate::scene::{PerspectiveCamera, Vec3};

const EPS: f32 = 1e-6;

/// Polar angle measured from +Y, azimuth measured around +Y from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit-style camera input: rotate around, dolly toward and pan the target.
///
/// Input accumulates into deltas; `update` applies them to the camera. With
/// damping enabled only a `damping_factor` share of each delta is applied per
/// update and the remainder decays, so motion eases out across frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    disposed: bool,
}

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            enable_damping: true,
            damping_factor,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            disposed: false,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        if !self.disposed {
            self.delta.theta -= angle;
        }
    }

    pub fn rotate_up(&mut self, angle: f32) {
        if !self.disposed {
            self.delta.phi -= angle;
        }
    }

    /// `factor > 1` moves the camera in, `factor < 1` moves it out.
    pub fn dolly_in(&mut self, factor: f32) {
        if !self.disposed && factor > 0.0 {
            self.scale /= factor;
        }
    }

    pub fn pan(&mut self, offset: Vec3) {
        if !self.disposed {
            self.pan_offset = self.pan_offset + offset;
        }
    }

    /// Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let mut spherical = Spherical::from_offset(camera.position - camera.target);

        if self.enable_damping {
            spherical.theta += self.delta.theta * self.damping_factor;
            spherical.phi += self.delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.delta.theta;
            spherical.phi += self.delta.phi;
        }
        spherical.phi = spherical.phi.clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let target = if self.enable_damping {
            camera.target + self.pan_offset * self.damping_factor
        } else {
            camera.target + self.pan_offset
        };
        let position = target + spherical.to_offset();

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.delta.theta *= decay;
            self.delta.phi *= decay;
            self.pan_offset = self.pan_offset * decay;
        } else {
            self.delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = (position - camera.position).length() > EPS
            || (target - camera.target).length() > EPS;
        camera.position = position;
        camera.target = target;
        moved
    }

    /// Drops pending motion and ignores further input.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.delta = Spherical::default();
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

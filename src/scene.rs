//! Scene graph for the point-cloud view.
//!
//! `Scene` owns lights and meshes, `PerspectiveCamera` projects world space into
//! normalized device coordinates. Only the render task mutates a scene.

use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 { self } else { self * (1.0 / len) }
    }

    /// Applies an XYZ-ordered Euler rotation (`Rx * Ry * Rz * v`).
    pub fn rotate_euler(self, euler: Vec3) -> Vec3 {
        let (sz, cz) = euler.z.sin_cos();
        let v = Vec3::new(self.x * cz - self.y * sz, self.x * sz + self.y * cz, self.z);
        let (sy, cy) = euler.y.sin_cos();
        let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        let (sx, cx) = euler.x.sin_cos();
        Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Vec3::new(x, y, z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// A point after projection: `x`/`y` in NDC, `depth` is view-space distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    focal: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            focal: 1.0,
        };
        camera.update_projection();
        camera
    }

    /// Must be called after changing `fov` or `aspect`.
    pub fn update_projection(&mut self) {
        self.focal = 1.0 / (self.fov.to_radians() / 2.0).tan();
    }

    pub fn focal(&self) -> f32 {
        self.focal
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Returns `None` for points outside the near/far range.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);

        let rel = world - self.position;
        let depth = rel.dot(forward);
        if depth < self.near || depth > self.far {
            return None;
        }
        Some(Projected {
            x: self.focal / self.aspect * rel.dot(right) / depth,
            y: self.focal * rel.dot(up) / depth,
            depth,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: u32,
        intensity: f32,
    },
    Directional {
        color: u32,
        intensity: f32,
        position: Vec3,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Points,
    LineStrip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: u32,
    /// World-space point size, attenuated by distance. Ignored for lines.
    pub size: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub kind: MeshKind,
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex colours; when absent the material colour is used.
    pub colors: Option<Vec<[f32; 3]>>,
    pub material: Material,
    pub rotation: Vec3,
}

impl Mesh {
    pub fn points(positions: Vec<[f32; 3]>, colors: Vec<[f32; 3]>, material: Material) -> Self {
        Self {
            kind: MeshKind::Points,
            positions,
            colors: Some(colors),
            material,
            rotation: Vec3::ZERO,
        }
    }

    pub fn line(positions: Vec<[f32; 3]>, material: Material) -> Self {
        Self {
            kind: MeshKind::LineStrip,
            positions,
            colors: None,
            material,
            rotation: Vec3::ZERO,
        }
    }

    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .iter()
            .map(|&p| Vec3::from(p).rotate_euler(self.rotation))
    }

    pub fn vertex_color(&self, index: usize) -> [f32; 3] {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or_else(|| hex_to_rgb(self.material.color))
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    lights: Vec<Light>,
    meshes: Vec<(MeshId, Mesh)>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.push((id, mesh));
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        let index = self.meshes.iter().position(|(mesh_id, _)| *mesh_id == id)?;
        Some(self.meshes.remove(index).1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes
            .iter()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, mesh)| mesh)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes
            .iter_mut()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, mesh)| mesh)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().map(|(_, mesh)| mesh)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

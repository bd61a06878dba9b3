//! Everything the render task owns: scene, camera, controls, renderer and the
//! meshes built from the current series.

use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    Result,
    animation::Tween,
    config::ViewConfig,
    controls::OrbitControls,
    geometry::plot_positions,
    models::PricePoint,
    render::Renderer,
    scene::{Light, Material, Mesh, MeshId, PerspectiveCamera, Scene, Vec3},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotMeshes {
    pub points: MeshId,
    pub line: MeshId,
}

pub struct SceneView {
    config: ViewConfig,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    renderer: Box<dyn Renderer>,
    plot: Option<PlotMeshes>,
    spin: Option<Tween>,
    disposed: bool,
}

impl SceneView {
    pub fn new(config: ViewConfig, width: u32, height: u32, mut renderer: Box<dyn Renderer>) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut camera = PerspectiveCamera::new(
            config.fov,
            width as f32 / height as f32,
            config.near,
            config.far,
        );
        camera.position = Vec3::new(0.0, 0.0, config.camera_distance);
        camera.look_at(Vec3::ZERO);

        renderer.set_size(width, height);
        renderer.set_clear_color(config.clear_color);

        let mut scene = Scene::new();
        scene.add_light(Light::Ambient {
            color: config.ambient_color,
            intensity: config.ambient_intensity,
        });
        scene.add_light(Light::Directional {
            color: config.directional_color,
            intensity: config.directional_intensity,
            position: config.directional_position.into(),
        });

        Self {
            controls: OrbitControls::new(config.damping_factor),
            config,
            scene,
            camera,
            renderer,
            plot: None,
            spin: None,
            disposed: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn plot(&self) -> Option<PlotMeshes> {
        self.plot
    }

    /// Swaps the plotted meshes for ones built from `points`.
    ///
    /// An empty series keeps whatever is on screen and returns `false`.
    pub fn rebuild_geometry(&mut self, points: &[PricePoint]) -> bool {
        if points.is_empty() {
            warn!("No data available for visualization.");
            return false;
        }

        if let Some(old) = self.plot.take() {
            self.scene.remove(old.points);
            self.scene.remove(old.line);
        }
        self.spin = None;

        let positions = plot_positions(points);
        let colors = vec![self.config.vertex_color; positions.len()];
        let cloud = Mesh::points(
            positions.clone(),
            colors,
            Material {
                color: self.config.point_color,
                size: self.config.point_size,
                opacity: self.config.point_opacity,
            },
        );
        let line = Mesh::line(
            positions,
            Material {
                color: self.config.line_color,
                size: 0.0,
                opacity: self.config.line_opacity,
            },
        );

        self.plot = Some(PlotMeshes {
            points: self.scene.add(cloud),
            line: self.scene.add(line),
        });
        self.spin = Some(Tween::spin(self.config.rotation_period));
        debug!("plotted {} points", points.len());
        true
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.camera.aspect = width as f32 / height as f32;
        self.camera.update_projection();
        self.renderer.set_size(width, height);
    }

    /// One display tick: damping, rotation, draw.
    pub fn frame(&mut self, dt: Duration) -> Result<()> {
        self.controls.update(&mut self.camera);
        if let (Some(plot), Some(spin)) = (self.plot, self.spin.as_mut()) {
            let angle = spin.advance(dt);
            if let Some(mesh) = self.scene.get_mut(plot.points) {
                mesh.rotation.y = angle;
            }
        }
        self.renderer.render(&self.scene, &self.camera)
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.controls.dispose();
        self.renderer.dispose();
    }
}

use image::{Rgba, RgbaImage};
use tracing::debug;
use vello_cpu::{
    Pixmap, RenderContext,
    color::{AlphaColor, Srgb},
    kurbo::{BezPath, Point, Rect, Stroke},
};

use crate::{
    Error, Result,
    scene::{Mesh, MeshKind, PerspectiveCamera, Projected, Scene, hex_to_rgb},
    surface::{Frame, new_frame},
};

const LINE_WIDTH: f64 = 1.0;

/// Draws a scene into a frame.
pub trait Renderer: Send {
    fn set_size(&mut self, width: u32, height: u32);
    fn set_clear_color(&mut self, rgba: [u8; 4]);
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;
    /// The buffer the renderer draws into; mounted into the container.
    fn frame(&self) -> Frame;
    fn dispose(&mut self);
}

/// CPU renderer for unlit points and line strips on top of `vello_cpu`.
///
/// Points become screen-aligned squares whose side shrinks with distance and
/// each line strip is stroked as a single path. The pixmap is copied into the
/// mounted frame after every draw.
pub struct SoftwareRenderer {
    ctx: RenderContext,
    pixmap: Pixmap,
    frame: Frame,
    clear: [u8; 4],
    disposed: bool,
    frames_drawn: u64,
}

/// Pixmaps are addressed with `u16`; larger surfaces are clamped.
fn surface_size(width: u32, height: u32) -> (u16, u16) {
    let clamp = |v: u32| u16::try_from(v.max(1)).unwrap_or(u16::MAX);
    (clamp(width), clamp(height))
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = surface_size(width, height);
        Self {
            ctx: RenderContext::new(w, h),
            pixmap: Pixmap::new(w, h),
            frame: new_frame(w.into(), h.into()),
            clear: [0, 0, 0, 0],
            disposed: false,
            frames_drawn: 0,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn size(&self) -> (f64, f64) {
        (self.pixmap.width().into(), self.pixmap.height().into())
    }

    fn to_screen(&self, p: Projected) -> Option<Point> {
        let (w, h) = self.size();
        let x = (f64::from(p.x) + 1.0) * 0.5 * w;
        let y = (1.0 - f64::from(p.y)) * 0.5 * h;
        (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
    }

    fn draw_points(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) {
        let half_height = self.size().1 / 2.0;
        for (i, world) in mesh.world_positions().enumerate() {
            let Some(p) = camera.project(world) else {
                continue;
            };
            let Some(center) = self.to_screen(p) else {
                continue;
            };
            let side = (f64::from(mesh.material.size) * half_height * f64::from(camera.focal())
                / f64::from(p.depth))
            .max(1.0);
            self.ctx
                .set_paint(paint(mesh.vertex_color(i), mesh.material.opacity));
            self.ctx
                .fill_rect(&Rect::from_center_size(center, (side, side)));
        }
    }

    fn draw_line_strip(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) {
        let mut path = BezPath::new();
        let mut pen_down = false;
        for world in mesh.world_positions() {
            match camera.project(world).and_then(|p| self.to_screen(p)) {
                Some(point) if pen_down => path.line_to(point),
                Some(point) => {
                    path.move_to(point);
                    pen_down = true;
                }
                // Vertices behind the camera split the strip.
                None => pen_down = false,
            }
        }
        if path.elements().is_empty() {
            return;
        }
        self.ctx.set_stroke(Stroke::new(LINE_WIDTH));
        self.ctx
            .set_paint(paint(hex_to_rgb(mesh.material.color), mesh.material.opacity));
        self.ctx.stroke_path(&path);
    }

    fn copy_to_frame(&self) -> Result<()> {
        let mut image = self
            .frame
            .write()
            .map_err(|_| Error::Internal("frame lock poisoned".into()))?;
        let (w, h) = (u32::from(self.pixmap.width()), u32::from(self.pixmap.height()));
        if image.dimensions() != (w, h) {
            *image = RgbaImage::new(w, h);
        }
        for (dst, src) in image.pixels_mut().zip(self.pixmap.data()) {
            *dst = unpremultiply(src.r, src.g, src.b, src.a);
        }
        Ok(())
    }
}

fn paint(rgb: [f32; 3], opacity: f32) -> AlphaColor<Srgb> {
    AlphaColor::new([rgb[0], rgb[1], rgb[2], opacity.clamp(0.0, 1.0)])
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let scale = |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
    Rgba([scale(r), scale(g), scale(b), a])
}

impl Renderer for SoftwareRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        let (w, h) = surface_size(width, height);
        if (self.pixmap.width(), self.pixmap.height()) != (w, h) {
            self.ctx = RenderContext::new(w, h);
            self.pixmap = Pixmap::new(w, h);
        }
        if let Ok(mut image) = self.frame.write() {
            if image.dimensions() != (w.into(), h.into()) {
                *image = RgbaImage::from_pixel(w.into(), h.into(), Rgba(self.clear));
            }
        }
    }

    fn set_clear_color(&mut self, rgba: [u8; 4]) {
        self.clear = rgba;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        self.ctx.reset();
        if self.clear[3] > 0 {
            let [r, g, b, a] = self.clear;
            let (w, h) = self.size();
            self.ctx.set_paint(AlphaColor::<Srgb>::from_rgba8(r, g, b, a));
            self.ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));
        }
        for mesh in scene.meshes() {
            match mesh.kind {
                MeshKind::Points => self.draw_points(mesh, camera),
                MeshKind::LineStrip => self.draw_line_strip(mesh, camera),
            }
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.copy_to_frame()?;
        self.frames_drawn += 1;
        Ok(())
    }

    fn frame(&self) -> Frame {
        self.frame.clone()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            debug!("releasing renderer after {} frames", self.frames_drawn);
            self.disposed = true;
        }
    }
}

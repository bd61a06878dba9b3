//! The display side of the widget: the container it draws into and the
//! labels it writes summary figures to.

use dashmap::DashMap;
use image::RgbaImage;
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU32, Ordering},
};
use tokio::sync::watch;
use ustr::Ustr;

/// Output buffer a renderer draws into and a container displays.
pub type Frame = Arc<RwLock<RgbaImage>>;

pub fn new_frame(width: u32, height: u32) -> Frame {
    Arc::new(RwLock::new(RgbaImage::new(width, height)))
}

/// A sized display region that hosts the rendered frame.
pub trait Container: Send + Sync {
    fn client_width(&self) -> u32;
    fn client_height(&self) -> u32;

    /// Takes the rendering output so the container can present it.
    fn mount(&self, frame: Frame);

    /// Fires whenever the container's size changes.
    fn resize_events(&self) -> watch::Receiver<()>;
}

pub trait Labels: Send + Sync {
    fn set_text(&self, id: Ustr, text: &str);
    fn set_color(&self, id: Ustr, color: Ustr);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub color: Option<Ustr>,
}

/// In-memory label store keyed by label id.
#[derive(Debug, Default)]
pub struct LabelBoard {
    labels: DashMap<Ustr, Label>,
}

impl LabelBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Label> {
        self.labels.get(&Ustr::from(id)).map(|label| label.clone())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Labels for LabelBoard {
    fn set_text(&self, id: Ustr, text: &str) {
        self.labels.entry(id).or_default().text = text.to_string();
    }

    fn set_color(&self, id: Ustr, color: Ustr) {
        self.labels.entry(id).or_default().color = Some(color);
    }
}

/// A container with no window behind it; size changes are driven by `resize`.
#[derive(Debug)]
pub struct HeadlessContainer {
    width: AtomicU32,
    height: AtomicU32,
    frame: RwLock<Option<Frame>>,
    resized: watch::Sender<()>,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        let (resized, _) = watch::channel(());
        Arc::new(Self {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            frame: RwLock::new(None),
            resized,
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
        self.resized.send_replace(());
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame.read().ok().and_then(|frame| frame.clone())
    }
}

impl Container for HeadlessContainer {
    fn client_width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    fn client_height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }

    fn mount(&self, frame: Frame) {
        if let Ok(mut slot) = self.frame.write() {
            slot.replace(frame);
        }
    }

    fn resize_events(&self) -> watch::Receiver<()> {
        self.resized.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ustr::ustr;

    #[test]
    fn test_label_board_updates_in_place() {
        let board = LabelBoard::new();
        assert!(board.is_empty());
        board.set_text(ustr("price-change"), "1.25%");
        board.set_color(ustr("price-change"), ustr("#48bb78"));
        board.set_text(ustr("price-change"), "-0.50%");

        let label = board.get("price-change").unwrap();
        assert_eq!(label.text, "-0.50%");
        assert_eq!(label.color, Some(ustr("#48bb78")));
        assert_eq!(board.len(), 1);
        assert!(board.get("current-price").is_none());
    }

    #[tokio::test]
    async fn test_headless_resize_notifies() {
        let container = HeadlessContainer::new(640, 480);
        let mut events = container.resize_events();
        container.resize(800, 600);
        events.changed().await.unwrap();
        assert_eq!(container.client_width(), 800);
        assert_eq!(container.client_height(), 600);
    }

    #[test]
    fn test_mount_exposes_frame() {
        let container = HeadlessContainer::new(4, 2);
        assert!(container.frame().is_none());
        container.mount(new_frame(4, 2));
        let frame = container.frame().unwrap();
        assert_eq!(frame.read().unwrap().dimensions(), (4, 2));
    }
}

use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval, sleep},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    Error, Result,
    client::QuoteSource,
    config::{FeedConfig, LabelConfig, WidgetConfig},
    models::PricePoint,
    render::Renderer,
    scene::Vec3,
    stats::refresh_stats,
    surface::{Container, Labels},
    view::SceneView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WidgetState {
    Uninitialized = 0,
    Initializing = 1,
    Live = 2,
    Disposed = 3,
}

impl From<u8> for WidgetState {
    fn from(value: u8) -> Self {
        match value {
            0 => WidgetState::Uninitialized,
            1 => WidgetState::Initializing,
            2 => WidgetState::Live,
            _ => WidgetState::Disposed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewCommand {
    Resize { width: u32, height: u32 },
    Orbit { left: f32, up: f32 },
    Zoom(f32),
    Pan(Vec3),
}

pub type Series = Arc<Vec<PricePoint>>;

/// Live 3D view of the intraday series for one ticker.
///
/// Construction spawns three tasks on the current tokio runtime: the render
/// loop (sole owner of the scene), the fetch loop, and a resize listener.
/// All of them stop when the widget is disposed or dropped.
pub struct MarketVisualization {
    container: Arc<dyn Container>,
    state: AtomicU8,
    closed: CancellationToken,
    series: Arc<watch::Sender<Series>>,
    commands: mpsc::UnboundedSender<ViewCommand>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

#[bon::bon]
impl MarketVisualization {
    #[builder]
    pub async fn new(
        container: Arc<dyn Container>,
        labels: Arc<dyn Labels>,
        source: Arc<dyn QuoteSource>,
        renderer: Box<dyn Renderer>,
        #[builder(default)] config: WidgetConfig,
    ) -> Arc<Self> {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (series, series_rx) = watch::channel(Series::default());

        let widget = Arc::new(Self {
            container: container.clone(),
            state: AtomicU8::new(WidgetState::Uninitialized as u8),
            closed: CancellationToken::new(),
            series: Arc::new(series),
            commands,
            tasks: Mutex::new(Vec::with_capacity(3)),
        });
        widget.set_state(WidgetState::Initializing);

        container.mount(renderer.frame());
        let view = SceneView::new(
            config.view.clone(),
            container.client_width(),
            container.client_height(),
            renderer,
        );
        let render = tokio::spawn(render_loop(
            view,
            RenderInputs {
                closed: widget.closed.clone(),
                commands: command_rx,
                series: series_rx,
                labels,
                label_config: config.labels.clone(),
                frame_interval: config.view.frame_interval,
            },
        ));
        let fetch = tokio::spawn(fetch_loop(
            source,
            widget.series.clone(),
            config.feed.clone(),
            widget.closed.clone(),
        ));
        let resize = tokio::spawn(resize_listener(
            container.clone(),
            container.resize_events(),
            widget.commands.clone(),
            widget.closed.clone(),
        ));
        widget.tasks.lock().await.extend([render, fetch, resize]);

        widget.set_state(WidgetState::Live);
        info!("Market visualization live for {}", config.feed.symbol);
        widget
    }

    fn set_state(&self, state: WidgetState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub fn state(&self) -> WidgetState {
        self.state.load(Ordering::SeqCst).into()
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == WidgetState::Disposed
    }

    /// Latest series delivered by the fetch loop.
    pub fn snapshot(&self) -> Series {
        self.series.borrow().clone()
    }

    /// Resolves once the fetch loop publishes a new series, or `None` after disposal.
    pub async fn next_series(&self) -> Option<Series> {
        let mut rx = self.series.subscribe();
        tokio::select! {
            _ = self.closed.cancelled() => None,
            changed = rx.changed() => changed.ok().map(|_| rx.borrow_and_update().clone()),
        }
    }

    fn send(&self, command: ViewCommand) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        self.commands
            .send(command)
            .map_err(|_| Error::Internal("render loop has stopped".into()))
    }

    /// Re-reads the container size into the camera and renderer.
    pub fn on_resize(&self) -> Result<()> {
        self.send(ViewCommand::Resize {
            width: self.container.client_width(),
            height: self.container.client_height(),
        })
    }

    /// Orbit the camera by the given angles in radians.
    pub fn orbit(&self, left: f32, up: f32) -> Result<()> {
        self.send(ViewCommand::Orbit { left, up })
    }

    pub fn zoom(&self, factor: f32) -> Result<()> {
        self.send(ViewCommand::Zoom(factor))
    }

    pub fn pan(&self, offset: Vec3) -> Result<()> {
        self.send(ViewCommand::Pan(offset))
    }

    /// Stops every loop and releases the controls and renderer.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    pub async fn dispose(&self) -> Result<()> {
        let previous: WidgetState = self
            .state
            .swap(WidgetState::Disposed as u8, Ordering::SeqCst)
            .into();
        if previous == WidgetState::Disposed {
            debug!("dispose called on an already disposed widget");
            return Ok(());
        }
        self.closed.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            task.await?;
        }
        info!("Market visualization disposed");
        Ok(())
    }
}

impl Drop for MarketVisualization {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

struct RenderInputs {
    closed: CancellationToken,
    commands: mpsc::UnboundedReceiver<ViewCommand>,
    series: watch::Receiver<Series>,
    labels: Arc<dyn Labels>,
    label_config: LabelConfig,
    frame_interval: std::time::Duration,
}

async fn render_loop(mut view: SceneView, mut inputs: RenderInputs) {
    let mut ticker = interval(inputs.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            biased;
            _ = inputs.closed.cancelled() => break,
            Some(command) = inputs.commands.recv() => apply_command(&mut view, command),
            Ok(()) = inputs.series.changed() => {
                let series = inputs.series.borrow_and_update().clone();
                view.rebuild_geometry(&series);
                refresh_stats(&series, inputs.labels.as_ref(), &inputs.label_config);
            }
            now = ticker.tick() => {
                let dt = now.duration_since(last);
                last = now;
                if let Err(e) = view.frame(dt) {
                    error!("Render loop stopped: {}", e);
                    break;
                }
            }
        }
    }

    view.dispose();
    debug!("render loop finished");
}

fn apply_command(view: &mut SceneView, command: ViewCommand) {
    match command {
        ViewCommand::Resize { width, height } => view.resize(width, height),
        ViewCommand::Orbit { left, up } => {
            let controls = view.controls_mut();
            controls.rotate_left(left);
            controls.rotate_up(up);
        }
        ViewCommand::Zoom(factor) => view.controls_mut().dolly_in(factor),
        ViewCommand::Pan(offset) => view.controls_mut().pan(offset),
    }
}

/// Fetch, publish, wait, repeat. A failed fetch ends the chain.
async fn fetch_loop(
    source: Arc<dyn QuoteSource>,
    series: Arc<watch::Sender<Series>>,
    config: FeedConfig,
    closed: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            _ = closed.cancelled() => break,
            result = source.fetch() => result,
        };
        if closed.is_cancelled() {
            break;
        }

        match result {
            Ok(points) => {
                info!("Fetched {} points for {}", points.len(), config.symbol);
                series.send_replace(Arc::new(points));
            }
            Err(e) => {
                error!("Error fetching market data: {}", e);
                break;
            }
        }

        tokio::select! {
            _ = closed.cancelled() => break,
            _ = sleep(config.refresh_interval) => {}
        }
    }
    debug!("fetch loop finished");
}

async fn resize_listener(
    container: Arc<dyn Container>,
    mut events: watch::Receiver<()>,
    commands: mpsc::UnboundedSender<ViewCommand>,
    closed: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = closed.cancelled() => break,
            changed = events.changed() => {
                if changed.is_err() {
                    break;
                }
                let command = ViewCommand::Resize {
                    width: container.client_width(),
                    height: container.client_height(),
                };
                if commands.send(command).is_err() {
                    break;
                }
            }
        }
    }
}

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::{Mutex, mpsc},
    time::sleep,
};

use market_viz::{async_trait, prelude::*, ustr};

/// Hands out whatever responses the test pushes, one per fetch.
struct ScriptedSource {
    responses: Mutex<mpsc::UnboundedReceiver<Result<Vec<PricePoint>>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<Vec<PricePoint>>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(Self {
            responses: Mutex::new(rx),
            calls: AtomicUsize::new(0),
        });
        (source, tx)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<PricePoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        responses
            .recv()
            .await
            .unwrap_or_else(|| Err(Error::Generic(ustr("script exhausted"))))
    }
}

fn series(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint::new(1_700_000_000 + i as i64 * 300, price))
        .collect()
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

struct Harness {
    widget: Arc<MarketVisualization>,
    container: Arc<HeadlessContainer>,
    labels: Arc<LabelBoard>,
    source: Arc<ScriptedSource>,
    responses: mpsc::UnboundedSender<Result<Vec<PricePoint>>>,
}

async fn harness(frame_interval: Duration) -> Harness {
    let container = HeadlessContainer::new(64, 48);
    let labels = Arc::new(LabelBoard::new());
    let (source, responses) = ScriptedSource::new();
    let config = WidgetConfig::builder()
        .view(ViewConfig::builder().frame_interval(frame_interval).build())
        .build();

    let widget = MarketVisualization::builder()
        .container(container.clone())
        .labels(labels.clone())
        .source(source.clone())
        .renderer(Box::new(SoftwareRenderer::new(64, 48)))
        .config(config)
        .build()
        .await;

    Harness {
        widget,
        container,
        labels,
        source,
        responses,
    }
}

fn label_text(labels: &LabelBoard, id: &str) -> Option<String> {
    labels.get(id).map(|label| label.text)
}

#[tokio::test]
async fn test_series_reaches_labels_and_frame() -> anyhow::Result<()> {
    let h = harness(Duration::from_millis(5)).await;
    assert_eq!(h.widget.state(), WidgetState::Live);
    assert!(h.container.frame().is_some());

    h.responses.send(Ok(series(&[100.0, 104.5, 110.0])))?;
    wait_for(|| label_text(&h.labels, "current-price").as_deref() == Some("$110.00")).await;

    let change = h.labels.get("price-change").unwrap();
    assert_eq!(change.text, "10.00%");
    assert_eq!(change.color.unwrap().as_str(), "#48bb78");
    assert_eq!(h.widget.snapshot().len(), 3);

    let frame = h.container.frame().unwrap();
    wait_for(|| frame.read().unwrap().pixels().any(|p| p.0[3] > 0)).await;

    h.widget.dispose().await?;
    Ok(())
}

#[tokio::test]
async fn test_falling_series_uses_negative_color() -> anyhow::Result<()> {
    let h = harness(Duration::from_millis(5)).await;
    h.responses.send(Ok(series(&[100.0, 90.0])))?;
    wait_for(|| label_text(&h.labels, "price-change").is_some()).await;

    let change = h.labels.get("price-change").unwrap();
    assert_eq!(change.text, "-10.00%");
    assert_eq!(change.color.unwrap().as_str(), "#f56565");
    h.widget.dispose().await?;
    Ok(())
}

#[tokio::test]
async fn test_dispose_is_idempotent() -> anyhow::Result<()> {
    let h = harness(Duration::from_millis(5)).await;
    h.widget.dispose().await?;
    h.widget.dispose().await?;
    assert_eq!(h.widget.state(), WidgetState::Disposed);
    assert!(matches!(h.widget.orbit(0.1, 0.0), Err(Error::Disposed)));
    assert!(matches!(h.widget.on_resize(), Err(Error::Disposed)));
    assert!(h.widget.next_series().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_refreshes_on_schedule() -> anyhow::Result<()> {
    let h = harness(Duration::from_secs(3600)).await;
    h.responses.send(Ok(series(&[1.0, 2.0])))?;
    wait_for(|| h.widget.snapshot().len() == 2).await;
    assert_eq!(h.source.calls(), 1);

    sleep(Duration::from_secs(299)).await;
    assert_eq!(h.source.calls(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.source.calls(), 2);

    h.widget.dispose().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_ends_refresh_chain() -> anyhow::Result<()> {
    let h = harness(Duration::from_secs(3600)).await;
    h.responses.send(Err(Error::Generic(ustr("network down"))))?;
    wait_for(|| h.source.calls() == 1).await;

    sleep(Duration::from_secs(30 * 60)).await;
    assert_eq!(h.source.calls(), 1);
    assert!(h.labels.is_empty());
    assert!(h.widget.snapshot().is_empty());
    assert_eq!(h.widget.state(), WidgetState::Live);

    h.widget.dispose().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_future_fetches() -> anyhow::Result<()> {
    let h = harness(Duration::from_secs(3600)).await;
    h.responses.send(Ok(series(&[5.0, 6.0])))?;
    wait_for(|| h.widget.snapshot().len() == 2).await;

    h.widget.dispose().await?;
    // A response is queued but nothing should ask for it.
    h.responses.send(Ok(series(&[7.0])))?;
    sleep(Duration::from_secs(60 * 60)).await;
    assert_eq!(h.source.calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_empty_series_keeps_previous_labels() -> anyhow::Result<()> {
    let h = harness(Duration::from_secs(3600)).await;
    h.responses.send(Ok(series(&[50.0, 55.0])))?;
    wait_for(|| label_text(&h.labels, "current-price").is_some()).await;

    h.responses.send(Ok(vec![]))?;
    sleep(Duration::from_secs(301)).await;
    wait_for(|| h.widget.snapshot().is_empty()).await;
    // Give the render loop a turn to process the empty series.
    sleep(Duration::from_millis(50)).await;

    assert_eq!(h.source.calls(), 2);
    assert_eq!(
        label_text(&h.labels, "current-price").as_deref(),
        Some("$55.00")
    );
    assert_eq!(
        label_text(&h.labels, "price-change").as_deref(),
        Some("10.00%")
    );
    h.widget.dispose().await?;
    Ok(())
}

#[tokio::test]
async fn test_container_resize_reaches_renderer() -> anyhow::Result<()> {
    let h = harness(Duration::from_millis(5)).await;
    let frame = h.container.frame().unwrap();
    assert_eq!(frame.read().unwrap().dimensions(), (64, 48));

    h.container.resize(32, 16);
    wait_for(|| frame.read().unwrap().dimensions() == (32, 16)).await;

    h.container.resize(20, 20);
    h.widget.on_resize()?;
    wait_for(|| frame.read().unwrap().dimensions() == (20, 20)).await;

    h.widget.dispose().await?;
    Ok(())
}

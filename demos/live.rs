use dotenv::dotenv;
use std::{env, sync::Arc, time::Duration};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use market_viz::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let symbol = env::var("MARKET_VIZ_SYMBOL").unwrap_or_else(|_| "SPY".to_string());
    let config = WidgetConfig::builder()
        .feed(FeedConfig::builder().symbol(symbol.as_str()).build())
        .build();

    let container = HeadlessContainer::new(960, 540);
    let labels = Arc::new(LabelBoard::new());
    let source = Arc::new(ChartClient::new(config.feed.clone())?);

    let widget = MarketVisualization::builder()
        .container(container.clone())
        .labels(labels.clone())
        .source(source)
        .renderer(Box::new(SoftwareRenderer::new(960, 540)))
        .config(config)
        .build()
        .await;

    match timeout(Duration::from_secs(30), widget.next_series()).await {
        Ok(Some(series)) => info!("Received {} points", series.len()),
        _ => warn!("No series arrived within 30s"),
    }

    // Let the render loop pick up the series and spin for a moment.
    widget.orbit(0.3, 0.1)?;
    sleep(Duration::from_secs(2)).await;

    for id in ["current-price", "price-change"] {
        if let Some(label) = labels.get(id) {
            info!("{id}: {} ({:?})", label.text, label.color);
        }
    }

    container.resize(640, 360);
    sleep(Duration::from_millis(200)).await;

    if let Some(frame) = container.frame() {
        let path = env::temp_dir().join(format!("{symbol}-cloud.png"));
        frame
            .read()
            .map_err(|_| anyhow::anyhow!("frame lock poisoned"))?
            .save(&path)?;
        info!("Saved frame to {}", path.display());
    }

    widget.dispose().await?;
    Ok(())
}

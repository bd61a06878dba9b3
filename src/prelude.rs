pub use crate::client::{ChartClient, QuoteSource};
pub use crate::config::{
    ExportConfig, ExportTarget, FeedConfig, LabelConfig, RetryPolicy, ViewConfig, WidgetConfig,
};
pub use crate::models::{Interval, PricePoint, Range};
pub use crate::render::{Renderer, SoftwareRenderer};
pub use crate::surface::{Container, HeadlessContainer, LabelBoard, Labels};
pub use crate::widget::{MarketVisualization, WidgetState};
pub use crate::{Error, Result};

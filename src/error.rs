use thiserror::Error;
use ustr::Ustr;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(Ustr),

    #[error("failed to send the api request")]
    RequestError(#[from] reqwest::Error),

    #[error("failed to parse the api response")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid url")]
    UrlError(#[from] url::ParseError),

    #[error("chart request failed with status {0}")]
    HttpStatus(u16),

    #[error("chart api returned an error: {code}: {description}")]
    ChartApi { code: Ustr, description: String },

    #[error("No chart result found")]
    NoChartResult,

    #[error("timestamp and close series differ in length ({timestamps} vs {closes})")]
    MisalignedSeries { timestamps: usize, closes: usize },

    #[error("failed to read or write a file")]
    IoError(#[from] std::io::Error),

    #[error("failed to decode or resize the image")]
    ImageError(#[from] image::ImageError),

    #[error("failed to encode the jpeg output")]
    EncodingError(#[from] jpeg_encoder::EncodingError),

    #[error("image dimensions {width}x{height} exceed the encoder limit")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Widget has been disposed")]
    Disposed,

    #[error("Internal error: {0}")]
    Internal(Ustr),

    #[error("Tokio task join error")]
    TokioJoinError(#[from] tokio::task::JoinError),
}

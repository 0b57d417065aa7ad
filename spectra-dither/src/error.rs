use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("image has zero area: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

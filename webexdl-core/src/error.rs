use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Page address is not a recording page: {0}")]
    AddressMismatch(String),

    #[error("Metadata response is missing `{0}`")]
    MetadataShape(String),

    #[error("Invalid stream descriptor: {0}")]
    DescriptorParse(String),

    #[error("Container element `.{0}` not found in page")]
    ContainerMissing(String),

    #[error("Fetch collaborator failed: {0}")]
    Fetch(String),

    #[error("Page closed before the player mounted")]
    PageClosed,

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

impl PipelineError {
    pub fn fetch(err: anyhow::Error) -> Self {
        Self::Fetch(format!("{:#}", err))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

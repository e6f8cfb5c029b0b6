pub mod api;
pub mod parser;

pub const STREAM_DESCRIPTOR_PATH: &str = "apis/html5-pipeline.do";
pub const DOWNLOAD_PATH: &str = "apis/download.do";

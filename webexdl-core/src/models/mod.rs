pub mod recording;
pub mod settings;

pub mod events;
pub mod filename;
pub mod messages;
pub mod url_parser;

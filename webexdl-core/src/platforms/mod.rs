pub mod traits;
pub mod webex;

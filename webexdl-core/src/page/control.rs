use tokio::sync::mpsc;

use crate::core::messages::DownloadMessage;
use crate::models::recording::ResolvedDownload;

pub const CONTROL_ID: &str = "playerDownload";
pub const CONTROL_TITLE: &str = "Download";
pub const CONTROL_ROLE: &str = "button";
pub const CONTROL_EXTRA_CLASS: &str = "recordingDownload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone)]
pub struct DownloadControl {
    pub id: String,
    pub title: String,
    pub role: String,
    pub tabindex: i32,
    pub aria_label: String,
    pub classes: Vec<String>,
    message: DownloadMessage,
    relay: mpsc::UnboundedSender<DownloadMessage>,
}

impl DownloadControl {
    pub fn new(
        resolved: &ResolvedDownload,
        marker_class: &str,
        relay: mpsc::UnboundedSender<DownloadMessage>,
    ) -> Self {
        Self {
            id: CONTROL_ID.to_string(),
            title: CONTROL_TITLE.to_string(),
            role: CONTROL_ROLE.to_string(),
            tabindex: 0,
            aria_label: format!("Download recording: {}", resolved.savename),
            classes: vec![marker_class.to_string(), CONTROL_EXTRA_CLASS.to_string()],
            message: DownloadMessage {
                download_url: resolved.download_url.clone(),
                savepath: resolved.savename.clone(),
            },
            relay,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn message(&self) -> &DownloadMessage {
        &self.message
    }

    pub fn activate(&self, via: Activation) -> bool {
        tracing::debug!("Control activated via {:?}: {}", via, self.message.savepath);
        self.relay.send(self.message.clone()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedDownload {
        ResolvedDownload {
            download_url: "https://h/apis/download.do?fileName=v.mp4".into(),
            savename: "Team_Sync.mp4".into(),
        }
    }

    #[test]
    fn attributes() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let control = DownloadControl::new(&resolved(), "icon-download", tx);
        assert_eq!(control.id, "playerDownload");
        assert_eq!(control.role, "button");
        assert_eq!(control.tabindex, 0);
        assert_eq!(control.aria_label, "Download recording: Team_Sync.mp4");
        assert!(control.has_class("icon-download"));
        assert!(control.has_class("recordingDownload"));
    }

    #[test]
    fn pointer_and_keyboard_relay_same_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = DownloadControl::new(&resolved(), "icon-download", tx);

        assert!(control.activate(Activation::Pointer));
        assert!(control.activate(Activation::Keyboard));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.savepath, "Team_Sync.mp4");
        assert_eq!(first.download_url, "https://h/apis/download.do?fileName=v.mp4");
    }

    #[test]
    fn activation_without_collaborator_reports_failure() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let control = DownloadControl::new(&resolved(), "icon-download", tx);
        assert!(!control.activate(Activation::Pointer));
    }
}

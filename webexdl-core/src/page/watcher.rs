use super::{wait_for, MutationObserver, PageDocument, PageHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Watching,
    Fired,
}

/// Detects the moment the player's title element first appears.
/// Fires once per page session and never re-arms.
#[derive(Debug, Clone)]
pub struct ReadinessDetector {
    title_class: String,
    state: DetectorState,
}

impl ReadinessDetector {
    pub fn new(title_class: &str) -> Self {
        Self {
            title_class: title_class.to_string(),
            state: DetectorState::Watching,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Handles one change notification. True only on the Watching -> Fired transition.
    pub fn on_mutation<P: PageDocument>(&mut self, doc: &P) -> bool {
        if self.state == DetectorState::Fired || !doc.contains_class(&self.title_class) {
            return false;
        }
        self.state = DetectorState::Fired;
        true
    }

    /// Consumes `observer` until the detector fires. Returns false if it had
    /// already fired or the page closed first.
    pub async fn wait<P: PageDocument>(&mut self, page: &PageHandle<P>, observer: MutationObserver) -> bool {
        if self.state == DetectorState::Fired {
            return false;
        }
        let fired = wait_for(page, observer, |doc| self.on_mutation(doc)).await;
        if fired {
            tracing::info!("Player mounted (.{} present)", self.title_class);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    #[test]
    fn stays_watching_without_title() {
        let mut detector = ReadinessDetector::new("recordingTitle");
        let mut doc = MemoryPage::new();
        doc.add_element(&["loading"]);
        assert!(!detector.on_mutation(&doc));
        assert_eq!(detector.state(), DetectorState::Watching);
    }

    #[test]
    fn fires_only_once() {
        let mut detector = ReadinessDetector::new("recordingTitle");
        let mut doc = MemoryPage::new();
        doc.add_element(&["recordingTitle"]);

        assert!(detector.on_mutation(&doc));
        assert_eq!(detector.state(), DetectorState::Fired);

        doc.remove_elements("recordingTitle");
        doc.add_element(&["recordingTitle"]);
        assert!(!detector.on_mutation(&doc));
        assert!(!detector.on_mutation(&doc));
    }

    #[tokio::test]
    async fn disconnects_after_firing() {
        let page = PageHandle::new(MemoryPage::new());
        let observer = page.observe();
        let mut detector = ReadinessDetector::new("recordingTitle");

        page.mutate(|doc| doc.add_element(&["header"]));
        page.mutate(|doc| doc.add_element(&["recordingTitle"]));
        page.mutate(|doc| doc.add_element(&["recordingTitle"]));

        assert!(detector.wait(&page, observer).await);
        assert_eq!(page.observer_count(), 0);

        // A second wait never re-arms, even with fresh notifications.
        let again = page.observe();
        page.mutate(|doc| doc.add_element(&["recordingTitle"]));
        assert!(!detector.wait(&page, again).await);
    }
}

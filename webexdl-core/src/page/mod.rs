//! Page abstraction: a document the pipeline can query and append to, plus a
//! subscription to its structural changes.

pub mod control;
pub mod memory;
pub mod watcher;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

pub use control::{Activation, DownloadControl};
pub use memory::MemoryPage;
pub use watcher::{DetectorState, ReadinessDetector};

pub trait PageDocument: Send + 'static {
    /// True if any element, injected controls included, carries `class`.
    fn contains_class(&self, class: &str) -> bool;

    /// Appends `control` to the first element carrying `container_class`.
    /// Returns false when no such element exists.
    fn append_control(&mut self, container_class: &str, control: DownloadControl) -> bool;

    fn controls(&self) -> Vec<&DownloadControl>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub seq: u64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PageHandle<P> {
    document: Arc<Mutex<P>>,
    observers: Arc<Mutex<Vec<mpsc::UnboundedSender<Mutation>>>>,
    seq: Arc<AtomicU64>,
}

impl<P> Clone for PageHandle<P> {
    fn clone(&self) -> Self {
        Self {
            document: self.document.clone(),
            observers: self.observers.clone(),
            seq: self.seq.clone(),
        }
    }
}

impl<P: PageDocument> PageHandle<P> {
    pub fn new(document: P) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
            observers: Arc::new(Mutex::new(Vec::new())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn observe(&self) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.observers).push(tx);
        MutationObserver { rx }
    }

    pub fn read<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&lock(&self.document))
    }

    /// Applies a structural change and notifies live observers.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let result = f(&mut lock(&self.document));
        let mutation = Mutation {
            seq: self.seq.fetch_add(1, Ordering::Relaxed) + 1,
        };
        lock(&self.observers).retain(|tx| tx.send(mutation).is_ok());
        result
    }

    pub fn observer_count(&self) -> usize {
        let mut observers = lock(&self.observers);
        observers.retain(|tx| !tx.is_closed());
        observers.len()
    }

    /// Ends every subscription, as a page unload would.
    pub fn close(&self) {
        lock(&self.observers).clear();
    }
}

pub struct MutationObserver {
    rx: mpsc::UnboundedReceiver<Mutation>,
}

impl MutationObserver {
    pub async fn next(&mut self) -> Option<Mutation> {
        self.rx.recv().await
    }

    pub fn disconnect(self) {}
}

/// Waits until `predicate` holds for the page, checking after each change.
/// The observer is disconnected once the predicate holds. Returns false if
/// the page stops producing changes first.
pub async fn wait_for<P, F>(page: &PageHandle<P>, mut observer: MutationObserver, mut predicate: F) -> bool
where
    P: PageDocument,
    F: FnMut(&P) -> bool,
{
    while observer.next().await.is_some() {
        if page.read(|doc| predicate(doc)) {
            observer.disconnect();
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_fires_on_matching_change() {
        let page = PageHandle::new(MemoryPage::new());
        let observer = page.observe();

        page.mutate(|doc| doc.add_element(&["spinner"]));
        page.mutate(|doc| doc.add_element(&["recordingTitle"]));

        assert!(wait_for(&page, observer, |doc| doc.contains_class("recordingTitle")).await);
        assert_eq!(page.observer_count(), 0);
    }

    #[tokio::test]
    async fn wait_for_ignores_state_before_first_change() {
        let mut doc = MemoryPage::new();
        doc.add_element(&["recordingTitle"]);
        let page = PageHandle::new(doc);
        let observer = page.observe();
        page.close();

        assert!(!wait_for(&page, observer, |doc| doc.contains_class("recordingTitle")).await);
    }

    #[tokio::test]
    async fn wait_for_returns_false_when_page_closes() {
        let page = PageHandle::new(MemoryPage::new());
        let observer = page.observe();
        page.mutate(|doc| doc.add_element(&["unrelated"]));
        page.close();

        assert!(!wait_for(&page, observer, |doc| doc.contains_class("recordingTitle")).await);
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let page = PageHandle::new(MemoryPage::new());
        let a = page.observe();
        let _b = page.observe();
        assert_eq!(page.observer_count(), 2);
        a.disconnect();
        page.mutate(|doc| doc.add_element(&["x"]));
        assert_eq!(page.observer_count(), 1);
    }
}

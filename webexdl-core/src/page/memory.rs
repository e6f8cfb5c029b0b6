use super::{DownloadControl, PageDocument};

#[derive(Debug, Default)]
struct Element {
    classes: Vec<String>,
    controls: Vec<DownloadControl>,
}

#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: Vec<Element>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose player header is already mounted.
    pub fn player_shell(title_class: &str, container_class: &str) -> Self {
        let mut page = Self::new();
        page.add_element(&[container_class]);
        page.add_element(&[title_class]);
        page
    }

    pub fn add_element(&mut self, classes: &[&str]) {
        self.elements.push(Element {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            controls: Vec::new(),
        });
    }

    pub fn remove_elements(&mut self, class: &str) {
        self.elements.retain(|e| !e.classes.iter().any(|c| c == class));
    }
}

impl PageDocument for MemoryPage {
    fn contains_class(&self, class: &str) -> bool {
        self.elements.iter().any(|e| {
            e.classes.iter().any(|c| c == class) || e.controls.iter().any(|c| c.has_class(class))
        })
    }

    fn append_control(&mut self, container_class: &str, control: DownloadControl) -> bool {
        match self
            .elements
            .iter_mut()
            .find(|e| e.classes.iter().any(|c| c == container_class))
        {
            Some(container) => {
                container.controls.push(control);
                true
            }
            None => false,
        }
    }

    fn controls(&self) -> Vec<&DownloadControl> {
        self.elements.iter().flat_map(|e| e.controls.iter()).collect()
    }
}

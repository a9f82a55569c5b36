//! Global presentation state that preferences are applied to

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

pub const PRIMARY_PROPERTY: &str = "--primary";

/// Receiver of root-level classes and style properties
pub trait PresentationSink: Send + Sync {
    fn set_root_class(&self, class: &str, enabled: bool);
    fn set_property(&self, name: &str, value: &str);
}

/// In-process root element: a class list plus custom properties
#[derive(Default)]
pub struct RootPresentation {
    classes: RwLock<BTreeSet<String>>,
    properties: RwLock<BTreeMap<String, String>>,
}

impl RootPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.read().contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.read().iter().cloned().collect()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.properties.read().get(name).cloned()
    }
}

impl PresentationSink for RootPresentation {
    fn set_root_class(&self, class: &str, enabled: bool) {
        let mut classes = self.classes.write();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn set_property(&self, name: &str, value: &str) {
        self.properties
            .write()
            .insert(name.to_string(), value.to_string());
    }
}

use orbit::sizes::SizeKey;
use orbit::{LayoutHost, Size, TriggerId, ViewportInfo};
use std::collections::HashMap;

/// Host state fed in from the command line or socket commands; stands in for
/// a real presentation layer's viewport and measured panel sizes.
#[derive(Debug, Clone, Default)]
pub struct DaemonHost {
    pub viewport: ViewportInfo,
    panels: HashMap<TriggerId, Size>,
}

impl DaemonHost {
    pub fn new(viewport: ViewportInfo) -> Self {
        Self {
            viewport,
            panels: HashMap::new(),
        }
    }

    pub fn set_panel_size(&mut self, id: TriggerId, size: Size) {
        self.panels.insert(id, size);
    }
}

impl LayoutHost for DaemonHost {
    fn viewport(&self) -> ViewportInfo {
        self.viewport
    }

    fn measure(&self, key: &SizeKey) -> Option<Size> {
        match key {
            SizeKey::Panel(id) => self.panels.get(id).copied(),
            SizeKey::Trigger(_) => None,
        }
    }
}

use crate::geometry::Size;
use crate::layout::TriggerId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SizeKey {
    Panel(TriggerId),
    Trigger(TriggerId),
}

/// Memoized host measurements.
///
/// Only usable measurements are remembered. A missing or degenerate one is
/// answered with the caller's floor and asked for again on the next lookup,
/// since it usually means the content has not been laid out yet.
#[derive(Debug, Default)]
pub struct SizeCache {
    sizes: HashMap<SizeKey, Size>,
    measurements: usize,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_size(
        &mut self,
        key: &SizeKey,
        floor: Size,
        measure: impl FnOnce(&SizeKey) -> Option<Size>,
    ) -> Size {
        self.lookup(key, measure).unwrap_or(floor)
    }

    /// The memoized or freshly measured size, if the host produced a usable one.
    pub fn lookup(
        &mut self,
        key: &SizeKey,
        measure: impl FnOnce(&SizeKey) -> Option<Size>,
    ) -> Option<Size> {
        if let Some(size) = self.sizes.get(key) {
            return Some(*size);
        }

        self.measurements += 1;
        let size = measure(key).filter(Size::is_measurable)?;
        self.sizes.insert(key.clone(), size);
        Some(size)
    }

    pub fn invalidate(&mut self, key: &SizeKey) {
        self.sizes.remove(key);
    }

    pub fn invalidate_all(&mut self) {
        self.sizes.clear();
    }

    /// Number of times the host has been asked to measure.
    pub fn measurements(&self) -> usize {
        self.measurements
    }
}

use crate::series::generate_series;
use crate::settings::AppSettings;
use crate::types::{StickerRecord, default_base_record};
use std::sync::Arc;

/// Which records an export would use. Exactly one source is active.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDataSource {
    Single(StickerRecord),
    Bulk(Vec<StickerRecord>),
    Series(Vec<StickerRecord>),
}

impl ActiveDataSource {
    pub fn label(&self) -> &'static str {
        match self {
            ActiveDataSource::Single(_) => "Single Design",
            ActiveDataSource::Bulk(_) => "CSV Import",
            ActiveDataSource::Series(_) => "Numbered Stickers",
        }
    }

    pub fn records(&self) -> &[StickerRecord] {
        match self {
            ActiveDataSource::Single(record) => std::slice::from_ref(record),
            ActiveDataSource::Bulk(records) | ActiveDataSource::Series(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Read-only copy of the records for an export run.
    pub fn snapshot(&self) -> Arc<[StickerRecord]> {
        Arc::from(self.records())
    }
}

/// Application state owned by the composition root.
///
/// Holds persisted settings, the editable base design, and the active data
/// source. Switching sources replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub settings: AppSettings,
    base: StickerRecord,
    source: ActiveDataSource,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        let base = default_base_record();
        Self {
            settings,
            source: ActiveDataSource::Single(base.clone()),
            base,
        }
    }

    pub fn base(&self) -> &StickerRecord {
        &self.base
    }

    pub fn source(&self) -> &ActiveDataSource {
        &self.source
    }

    /// Replace the base design. A single-design source follows the edit.
    pub fn set_base(&mut self, record: StickerRecord) {
        if let ActiveDataSource::Single(_) = self.source {
            self.source = ActiveDataSource::Single(record.clone());
        }
        self.base = record;
    }

    pub fn select_single(&mut self) {
        self.source = ActiveDataSource::Single(self.base.clone());
    }

    pub fn select_bulk(&mut self, records: Vec<StickerRecord>) {
        log::info!("Using {} imported stickers", records.len());
        self.source = ActiveDataSource::Bulk(records);
    }

    /// Expand the configured series from the base design and make it active.
    pub fn select_series(&mut self) -> usize {
        let records = generate_series(&self.settings.series, &self.base);
        let count = records.len();
        log::info!("Generated {count} numbered stickers");
        self.source = ActiveDataSource::Series(records);
        count
    }

    pub fn export_snapshot(&self) -> Arc<[StickerRecord]> {
        self.source.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::NumberSeriesConfig;

    #[test]
    fn test_default_is_single() {
        let state = AppState::default();
        assert_eq!(state.source().label(), "Single Design");
        assert_eq!(state.source().len(), 1);
    }

    #[test]
    fn test_sources_are_exclusive() {
        let mut state = AppState::default();
        state.settings.series = NumberSeriesConfig {
            start_number: 1,
            end_number: 3,
            ..Default::default()
        };

        state.select_bulk(vec![StickerRecord::default(); 2]);
        assert_eq!(state.source().label(), "CSV Import");
        assert_eq!(state.source().len(), 2);

        assert_eq!(state.select_series(), 3);
        assert_eq!(state.source().label(), "Numbered Stickers");
        assert_eq!(state.export_snapshot().len(), 3);

        state.select_single();
        assert_eq!(state.source().len(), 1);
    }

    #[test]
    fn test_set_base_updates_single_only() {
        let mut state = AppState::default();
        let edited = StickerRecord {
            name: "Edited".into(),
            ..state.base().clone()
        };
        state.set_base(edited.clone());
        assert_eq!(state.source().records()[0].name, "Edited");

        state.select_bulk(Vec::new());
        state.set_base(StickerRecord::default());
        assert!(state.source().is_empty());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut state = AppState::default();
        let snapshot = state.export_snapshot();
        state.set_base(StickerRecord::default());
        assert_eq!(snapshot[0].name, default_base_record().name);
    }
}

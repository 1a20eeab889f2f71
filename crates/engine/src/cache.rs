use roomsvital_core::{RoomId, RoomRecord};

/// What the directory renders out of the backing set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryView {
    Full,
    /// A single record picked by search.
    Filtered(RoomId),
}

/// Local copy of the `rooms` collection plus the active view.
/// Replaced wholesale on refresh; never merged.
#[derive(Debug)]
pub struct RoomCache {
    records: Vec<RoomRecord>,
    view: DirectoryView,
    /// Number of completed refreshes.
    generation: u64,
}

impl Default for RoomCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomCache {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            view: DirectoryView::Full,
            generation: 0,
        }
    }

    pub fn records(&self) -> &[RoomRecord] {
        &self.records
    }

    pub fn view(&self) -> &DirectoryView {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &RoomId) -> Option<&RoomRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn visible(&self) -> Vec<RoomRecord> {
        match &self.view {
            DirectoryView::Full => self.records.clone(),
            DirectoryView::Filtered(id) => self.get(id).cloned().into_iter().collect(),
        }
    }

    /// Installs a freshly fetched set and returns to the full view.
    pub(crate) fn replace(&mut self, mut records: Vec<RoomRecord>) {
        sort_by_room_no(&mut records);
        self.records = records;
        self.view = DirectoryView::Full;
        self.generation += 1;
    }

    /// Returns false if the id is not in the backing set.
    pub(crate) fn filter(&mut self, id: &RoomId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.view = DirectoryView::Filtered(id.clone());
        true
    }

    /// Sets the cached lock flag and returns the previous value, or `None`
    /// when the record is not cached.
    pub(crate) fn set_locked(&mut self, id: &RoomId, is_locked: bool) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| &r.id == id)?;
        let previous = record.is_locked;
        record.is_locked = is_locked;
        Some(previous)
    }

    /// Inverts the cached lock flag and returns the value it had before.
    pub(crate) fn toggle_locked(&mut self, id: &RoomId) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| &r.id == id)?;
        let previous = record.is_locked;
        record.is_locked = !previous;
        Some(previous)
    }
}

/// Ascending by numeric room number. Records without one go last, in id
/// order.
pub fn sort_by_room_no(records: &mut [RoomRecord]) {
    records.sort_by(|a, b| match (a.room_no, b.room_no) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomsvital_core::RoomNo;

    fn record(id: &str, room_no: Option<i64>) -> RoomRecord {
        RoomRecord {
            id: RoomId::new(id),
            name: format!("guest {id}"),
            gender: "MALE".into(),
            room_no: room_no.map(RoomNo::from),
            date: String::new(),
            is_locked: false,
        }
    }

    #[test]
    fn replace_sorts_numerically() {
        let mut cache = RoomCache::new();
        cache.replace(vec![
            record("12", Some(12)),
            record("x", None),
            record("5", Some(5)),
            record("100", Some(100)),
        ]);
        let ids: Vec<&str> = cache.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "12", "100", "x"]);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn filter_narrows_visible_only() {
        let mut cache = RoomCache::new();
        cache.replace(vec![record("5", Some(5)), record("12", Some(12))]);
        assert!(cache.filter(&RoomId::new("12")));
        assert_eq!(cache.visible().len(), 1);
        assert_eq!(cache.records().len(), 2);
        assert!(!cache.filter(&RoomId::new("99")));
        assert_eq!(cache.view(), &DirectoryView::Filtered(RoomId::new("12")));

        cache.replace(vec![record("5", Some(5))]);
        assert_eq!(cache.view(), &DirectoryView::Full);
    }

    #[test]
    fn set_locked_reports_previous() {
        let mut cache = RoomCache::new();
        cache.replace(vec![record("5", Some(5))]);
        assert_eq!(cache.set_locked(&RoomId::new("5"), true), Some(false));
        assert_eq!(cache.set_locked(&RoomId::new("5"), true), Some(true));
        assert_eq!(cache.set_locked(&RoomId::new("6"), true), None);
    }

    #[test]
    fn toggle_locked_flips_in_place() {
        let mut cache = RoomCache::new();
        cache.replace(vec![record("5", Some(5))]);
        let id = RoomId::new("5");
        assert_eq!(cache.toggle_locked(&id), Some(false));
        assert!(cache.get(&id).is_some_and(|r| r.is_locked));
        assert_eq!(cache.toggle_locked(&id), Some(true));
        assert!(cache.get(&id).is_some_and(|r| !r.is_locked));
        assert_eq!(cache.toggle_locked(&RoomId::new("6")), None);
    }

    #[test]
    fn fractional_room_numbers_sort_between_integers() {
        let mut cache = RoomCache::new();
        let mut half = record("12.5", None);
        half.room_no = RoomNo::from_f64(12.5);
        cache.replace(vec![record("13", Some(13)), half, record("12", Some(12))]);
        let ids: Vec<&str> = cache.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "12.5", "13"]);
    }
}

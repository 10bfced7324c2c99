//! 선택 서비스 -- 저장소 + 이벤트 버스 결합
//!
//! [`SelectionService`]는 상태를 바꾼 변경마다 정확히 하나의 이벤트를 발행합니다.
//! 저장소 기록이 끝난 뒤 이벤트가 발행되므로, 리스너는 알림 안에서
//! [`SelectionStore::load`]를 호출해 변경이 반영된 상태를 읽을 수 있습니다.

use tracing::{debug, info};

use composegenie_core::config::SelectionConfig;
use composegenie_core::event::{SelectionChange, SelectionEvent};
use composegenie_core::metrics as m;
use composegenie_core::types::SelectionEntry;

use crate::bus::{SelectionBus, Subscription};
use crate::store::SelectionStore;

/// 선택 저장소와 알림 버스를 묶은 파사드
#[derive(Debug, Clone)]
pub struct SelectionService {
    store: SelectionStore,
    bus: SelectionBus,
}

impl SelectionService {
    pub fn new(store: SelectionStore, bus: SelectionBus) -> Self {
        Self { store, bus }
    }

    /// 설정에 맞는 저장소와 새 버스로 서비스를 생성합니다.
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(SelectionStore::from_config(config), SelectionBus::new())
    }

    /// 메모리 저장소 기반 서비스
    pub fn in_memory() -> Self {
        Self::new(SelectionStore::in_memory(), SelectionBus::new())
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn bus(&self) -> &SelectionBus {
        &self.bus
    }

    /// 현재 선택 목록
    pub fn load(&self) -> Vec<SelectionEntry> {
        self.store.load()
    }

    pub fn contains(&self, name: &str, tag: &str) -> bool {
        self.store.contains(name, tag)
    }

    /// 엔트리를 추가하고, 상태가 바뀌었으면 `Added` 이벤트를 발행합니다.
    pub fn add(&self, entry: SelectionEntry) -> bool {
        if !self.store.add(entry.clone()) {
            return false;
        }

        info!(name = %entry.name, tag = %entry.tag, "selection added");
        self.emit(SelectionEvent::new(entry, SelectionChange::Added));
        true
    }

    /// 엔트리를 제거하고, 상태가 바뀌었으면 `Removed` 이벤트를 발행합니다.
    pub fn remove(&self, name: &str, tag: &str) -> bool {
        if !self.store.remove(name, tag) {
            return false;
        }

        info!(name, tag, "selection removed");
        self.emit(SelectionEvent::new(
            SelectionEntry::new(name, tag),
            SelectionChange::Removed,
        ));
        true
    }

    /// 모든 선택을 제거합니다.
    ///
    /// 제거된 엔트리마다 저장 순서대로 `Removed` 이벤트를 하나씩 발행하며,
    /// 이벤트들은 같은 trace ID를 공유합니다. 제거된 엔트리 수를 반환합니다.
    pub fn clear(&self) -> usize {
        let removed = self.store.clear();
        if removed.is_empty() {
            return 0;
        }

        let trace_id = uuid::Uuid::new_v4().to_string();
        info!(count = removed.len(), trace_id = %trace_id, "selections cleared");

        let count = removed.len();
        for entry in removed {
            self.emit(SelectionEvent::with_trace(
                entry,
                SelectionChange::Removed,
                trace_id.clone(),
            ));
        }
        count
    }

    /// 선택 변경 리스너를 등록합니다.
    #[must_use = "dropping the subscription immediately unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SelectionEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    fn emit(&self, event: SelectionEvent) {
        metrics::counter!(m::SELECTION_CHANGES_TOTAL, m::LABEL_CHANGE => event.change.to_string())
            .increment(1);
        let delivered = self.bus.publish(&event);
        debug!(event = %event, delivered, "selection event published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collect(service: &SelectionService) -> (Arc<Mutex<Vec<SelectionEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = service.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        (events, sub)
    }

    #[test]
    fn add_emits_added_event() {
        let service = SelectionService::in_memory();
        let (events, _sub) = collect(&service);

        assert!(service.add(SelectionEntry::new("redis", "7.2")));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].change, SelectionChange::Added);
        assert_eq!(events[0].entry, SelectionEntry::new("redis", "7.2"));
    }

    #[test]
    fn noop_mutations_emit_nothing() {
        let service = SelectionService::in_memory();
        service.add(SelectionEntry::new("redis", "7.2"));
        let (events, _sub) = collect(&service);

        assert!(!service.add(SelectionEntry::new("redis", "7.2")));
        assert!(!service.remove("nginx", "latest"));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn remove_emits_removed_event() {
        let service = SelectionService::in_memory();
        service.add(SelectionEntry::new("redis", "7.2"));
        let (events, _sub) = collect(&service);

        assert!(service.remove("redis", "7.2"));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].change, SelectionChange::Removed);
    }

    #[test]
    fn clear_emits_one_removed_per_entry_in_order() {
        let service = SelectionService::in_memory();
        service.add(SelectionEntry::new("nginx", "1.25.3"));
        service.add(SelectionEntry::new("redis", "7.2"));
        let (events, _sub) = collect(&service);

        assert_eq!(service.clear(), 2);

        let events = events.lock().unwrap();
        let names: Vec<_> = events.iter().map(|e| e.entry.name.as_str()).collect();
        assert_eq!(names, vec!["nginx", "redis"]);
        assert!(events.iter().all(|e| e.change == SelectionChange::Removed));
        assert_eq!(events[0].metadata.trace_id, events[1].metadata.trace_id);
    }

    #[test]
    fn clear_on_empty_store_emits_nothing() {
        let service = SelectionService::in_memory();
        let (events, _sub) = collect(&service);
        assert_eq!(service.clear(), 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn listener_observes_committed_state() {
        let service = SelectionService::in_memory();
        let view = service.store().clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = service.subscribe(move |_| sink.lock().unwrap().push(view.load().len()));

        service.add(SelectionEntry::new("nginx", "1.25.3"));
        service.add(SelectionEntry::new("redis", "7.2"));
        service.remove("nginx", "1.25.3");

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }
}

//! 선택 변경 이벤트 버스
//!
//! [`SelectionBus`]는 프로세스 내부의 fire-and-forget 알림 채널입니다.
//! 중앙 상태를 공유하지 않고, 각 뷰가 변경 알림을 받은 뒤 저장소를 다시 읽습니다.
//!
//! # 전달 규칙
//!
//! - 동기적으로 전달되며, 발행 호출이 반환되기 전에 모든 리스너가 호출됩니다.
//! - 리스너는 등록 순서대로 호출됩니다.
//! - 재생(replay)은 없습니다. 구독 이전의 이벤트는 전달되지 않습니다.
//! - 각 리스너는 독립된 실패 경계 안에서 실행됩니다. 한 리스너가 panic해도
//!   나머지 리스너는 계속 알림을 받습니다.
//! - [`Subscription`]을 drop하면 구독이 해제됩니다.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error};

use composegenie_core::event::{Event, SelectionEvent};
use composegenie_core::metrics as m;

type Listener = Arc<dyn Fn(&SelectionEvent) + Send + Sync + 'static>;

struct BusInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl BusInner {
    /// 리스너 목록 락
    ///
    /// 리스너는 락 밖에서 호출되므로 목록 자체가 중간 상태로 남을 수 없어,
    /// poison 상태여도 그대로 사용합니다.
    fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(&self, id: u64) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}

/// 선택 변경 브로드캐스트 채널
///
/// 복제본은 같은 리스너 목록을 공유합니다.
#[derive(Clone)]
pub struct SelectionBus {
    inner: Arc<BusInner>,
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl SelectionBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// 리스너를 등록합니다.
    ///
    /// 반환된 [`Subscription`]이 살아 있는 동안만 이벤트를 받습니다.
    #[must_use = "dropping the subscription immediately unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SelectionEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().push((id, Arc::new(listener)));
        debug!(subscription = id, "selection listener registered");

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// 현재 등록된 리스너 수
    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }

    /// 이벤트를 모든 리스너에게 전달합니다.
    ///
    /// 정상적으로 반환한 리스너 수를 반환합니다.
    /// 발행 도중 등록/해제된 리스너는 다음 발행부터 반영됩니다.
    pub fn publish(&self, event: &SelectionEvent) -> usize {
        let snapshot: Vec<(u64, Listener)> = self.inner.listeners().clone();

        let mut delivered = 0;
        for (id, listener) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    error!(
                        subscription = id,
                        event_id = %event.event_id(),
                        entry = %event.entry,
                        panic = panic_message(payload.as_ref()),
                        "selection listener panicked"
                    );
                    metrics::counter!(m::SELECTION_LISTENER_FAILURES_TOTAL).increment(1);
                }
            }
        }
        delivered
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

/// 구독 핸들
///
/// drop 시 리스너가 해제됩니다. 버스가 먼저 사라졌으면 아무것도 하지 않습니다.
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// 구독 ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 명시적으로 구독을 해제합니다.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let removed = self
            .bus
            .upgrade()
            .is_some_and(|bus| bus.unsubscribe(self.id));
        if removed {
            debug!(subscription = self.id, "selection listener removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composegenie_core::event::SelectionChange;
    use composegenie_core::types::SelectionEntry;

    fn added(name: &str) -> SelectionEvent {
        SelectionEvent::new(SelectionEntry::new(name, "latest"), SelectionChange::Added)
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&SelectionEvent) + Send + Sync) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |e: &SelectionEvent| {
            sink.lock().unwrap().push(e.entry.name.clone())
        })
    }

    #[test]
    fn publish_without_listeners_is_fine() {
        let bus = SelectionBus::new();
        assert_eq!(bus.publish(&added("redis")), 0);
    }

    #[test]
    fn listeners_called_in_registration_order() {
        let bus = SelectionBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                bus.subscribe(move |_| order.lock().unwrap().push(i))
            })
            .collect();

        bus.publish(&added("redis"));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let bus = SelectionBus::new();
        let (log, listener) = recorder();
        let _sub = bus.subscribe(listener);

        for name in ["a", "b", "c"] {
            bus.publish(&added(name));
        }
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let bus = SelectionBus::new();
        let _bad = bus.subscribe(|_| panic!("listener blew up"));
        let (log, listener) = recorder();
        let _good = bus.subscribe(listener);

        let delivered = bus.publish(&added("redis"));
        assert_eq!(delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["redis"]);

        // 다음 발행에도 계속 동작
        bus.publish(&added("nginx"));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = SelectionBus::new();
        let (log, listener) = recorder();
        let sub = bus.subscribe(listener);
        assert_eq!(bus.listener_count(), 1);

        drop(sub);
        assert_eq!(bus.listener_count(), 0);

        bus.publish(&added("redis"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn explicit_unsubscribe() {
        let bus = SelectionBus::new();
        let sub = bus.subscribe(|_| {});
        sub.unsubscribe();
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let bus = SelectionBus::new();
        bus.publish(&added("early"));

        let (log, listener) = recorder();
        let _sub = bus.subscribe(listener);
        assert!(log.lock().unwrap().is_empty());

        bus.publish(&added("late"));
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = SelectionBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn cloned_bus_shares_listeners() {
        let bus = SelectionBus::new();
        let other = bus.clone();
        let (log, listener) = recorder();
        let _sub = bus.subscribe(listener);

        other.publish(&added("redis"));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_publish() {
        let bus = SelectionBus::new();
        let inner_bus = bus.clone();
        let late_subs = Arc::new(Mutex::new(Vec::new()));
        let holder = Arc::clone(&late_subs);

        let _sub = bus.subscribe(move |_| {
            let sub = inner_bus.subscribe(|_| {});
            holder.lock().unwrap().push(sub);
        });

        bus.publish(&added("redis"));
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn panic_message_extracts_strings() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}

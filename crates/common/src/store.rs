//! Generic resource store
//!
//! One `ResourceStore<D>` owns the collection of a single domain and is its
//! only mutation surface. Handles are cheap to clone and share state.

use crate::ids::{Clock, EpochMillisIds, IdGenerator, SystemClock};
use crate::lifecycle::LifecycleSimulator;
use crate::types::{Change, Domain, Resource, ResourceEvent};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

const EVENT_CAPACITY: usize = 256;

/// Injected dependencies and timing for one store
#[derive(Clone)]
pub struct StoreOptions {
    pub provision_delay: Duration,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
}

impl StoreOptions {
    /// Domain delay, epoch-millisecond ids, wall clock
    pub fn for_domain<D: Domain>() -> Self {
        Self {
            provision_delay: D::PROVISION_DELAY,
            ids: Arc::new(EpochMillisIds::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.provision_delay = delay;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

struct Inner<D: Domain> {
    records: RwLock<Vec<Resource<D>>>,
    lifecycle: LifecycleSimulator,
    options: StoreOptions,
    events: broadcast::Sender<ResourceEvent>,
}

/// In-memory collection for one resource domain
pub struct ResourceStore<D: Domain> {
    inner: Arc<Inner<D>>,
}

impl<D: Domain> Clone for ResourceStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Domain> ResourceStore<D> {
    /// Create an empty store with the domain defaults.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_options(StoreOptions::for_domain::<D>())
    }

    pub fn with_options(options: StoreOptions) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                records: RwLock::new(Vec::new()),
                lifecycle: LifecycleSimulator::current()?,
                options,
                events,
            }),
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Snapshot of the collection in insertion order
    pub fn list(&self) -> Vec<Resource<D>> {
        self.inner.records.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Resource<D>> {
        self.inner.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.records.read().iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }

    /// Whether a deferred transition is still pending for `id`
    pub fn is_settling(&self, id: &str) -> bool {
        self.inner.lifecycle.is_armed(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResourceEvent> {
        self.inner.events.subscribe()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Append prebuilt records without arming any timers
    pub fn seed(&self, records: impl IntoIterator<Item = Resource<D>>) {
        let mut guard = self.inner.records.write();
        let before = guard.len();
        guard.extend(records);
        debug!("Seeded {} {} record(s)", guard.len() - before, D::KIND);
    }

    /// Create a resource in the transient state and arm its lifecycle timer
    pub fn create(&self, name: impl Into<String>, mut spec: D::Spec) -> Resource<D> {
        let name = name.into();
        let options = &self.inner.options;
        D::prepare(&name, &mut spec);

        let resource = Resource {
            id: options.ids.next_id(D::ID_PREFIX),
            name,
            status: D::TRANSIENT,
            created: options.clock.now(),
            spec,
        };

        self.inner.records.write().push(resource.clone());
        debug!("Created {}: {} ({})", D::KIND, resource.name, resource.id);
        self.publish(&resource.id, Change::Created {
            status: resource.status.to_string(),
        });

        let weak = Arc::downgrade(&self.inner);
        let id = resource.id.clone();
        self.inner
            .lifecycle
            .arm(&resource.id, options.provision_delay, move || {
                settle(&weak, &id);
            });

        resource
    }

    /// Replace the status of `id`. Unknown ids are ignored; any value is accepted.
    pub fn update_status(&self, id: &str, status: D::Status) {
        set_status(&self.inner, id, status);
    }

    /// Validated status change using the domain's transition table
    pub fn transition(&self, id: &str, status: D::Status) -> Result<()> {
        let from = {
            let mut guard = self.inner.records.write();
            let record = guard
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Error::NotFound {
                    kind: D::KIND.to_string(),
                    id: id.to_string(),
                })?;

            if !D::can_transition(record.status, status) {
                return Err(Error::InvalidStateTransition {
                    from: record.status.to_string(),
                    to: status.to_string(),
                });
            }
            std::mem::replace(&mut record.status, status)
        };

        debug!("{} {}: {} -> {}", D::KIND, id, from, status);
        self.publish(id, Change::StatusChanged {
            from: from.to_string(),
            to: status.to_string(),
        });
        Ok(())
    }

    /// Apply `f` to the payload of `id`. Unknown ids are ignored.
    pub fn update<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut D::Spec),
    {
        let found = {
            let mut guard = self.inner.records.write();
            match guard.iter_mut().find(|r| r.id == id) {
                Some(record) => {
                    f(&mut record.spec);
                    true
                }
                None => false,
            }
        };

        if found {
            debug!("Updated {} {}", D::KIND, id);
            self.publish(id, Change::Updated);
        }
    }

    /// Remove `id` and cancel its pending timer. Unknown ids are ignored.
    pub fn delete(&self, id: &str) {
        let removed = {
            let mut guard = self.inner.records.write();
            let before = guard.len();
            guard.retain(|r| r.id != id);
            guard.len() != before
        };
        self.inner.lifecycle.cancel(id);

        if removed {
            debug!("Deleted {} {}", D::KIND, id);
            self.publish(id, Change::Deleted);
        }
    }

    /// Arm a deferred `update_status(id, status)` after `delay`
    pub fn schedule(&self, id: &str, status: D::Status, delay: Duration) {
        let weak = Arc::downgrade(&self.inner);
        let target = id.to_string();
        self.inner.lifecycle.arm(id, delay, move || {
            if let Some(inner) = weak.upgrade() {
                set_status(&inner, &target, status);
            }
        });
    }

    fn publish(&self, id: &str, change: Change) {
        publish(&self.inner, id, change);
    }
}

fn publish<D: Domain>(inner: &Inner<D>, id: &str, change: Change) {
    // No receivers is fine.
    let _ = inner.events.send(ResourceEvent {
        kind: D::KIND,
        id: id.to_string(),
        change,
    });
}

fn set_status<D: Domain>(inner: &Inner<D>, id: &str, status: D::Status) {
    let from = {
        let mut guard = inner.records.write();
        match guard.iter_mut().find(|r| r.id == id) {
            Some(record) => std::mem::replace(&mut record.status, status),
            None => return,
        }
    };

    debug!("{} {}: {} -> {}", D::KIND, id, from, status);
    publish(inner, id, Change::StatusChanged {
        from: from.to_string(),
        to: status.to_string(),
    });
}

/// Provisioning completion: terminal status plus the domain's provisioning hook
fn settle<D: Domain>(inner: &Weak<Inner<D>>, id: &str) {
    let Some(inner) = inner.upgrade() else {
        return;
    };

    let from = {
        let mut guard = inner.records.write();
        let Some(record) = guard.iter_mut().find(|r| r.id == id) else {
            return;
        };
        D::provisioned(&mut record.spec);
        std::mem::replace(&mut record.status, D::TERMINAL)
    };

    info!("{} {} provisioned: {} -> {}", D::KIND, id, from, D::TERMINAL);
    publish(&inner, id, Change::StatusChanged {
        from: from.to_string(),
        to: D::TERMINAL.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{FixedClock, SequentialIds};
    use crate::types::DomainKind;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    enum WidgetStatus {
        Creating,
        Ready,
        Stopped,
    }

    impl std::fmt::Display for WidgetStatus {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct WidgetSpec {
        size: u32,
        label: Option<String>,
        serial: Option<String>,
    }

    #[derive(Debug, Clone)]
    struct Widget;

    impl Domain for Widget {
        type Spec = WidgetSpec;
        type Status = WidgetStatus;

        const KIND: DomainKind = DomainKind::Disk;
        const ID_PREFIX: &'static str = "w";
        const TRANSIENT: WidgetStatus = WidgetStatus::Creating;
        const TERMINAL: WidgetStatus = WidgetStatus::Ready;
        const PROVISION_DELAY: Duration = Duration::from_millis(1000);

        fn prepare(name: &str, spec: &mut WidgetSpec) {
            spec.label = Some(format!("{}.widgets.local", name));
        }

        fn provisioned(spec: &mut WidgetSpec) {
            spec.serial = Some("SN-1".to_string());
        }

        fn can_transition(from: WidgetStatus, to: WidgetStatus) -> bool {
            !matches!(
                (from, to),
                (WidgetStatus::Creating, WidgetStatus::Stopped) | (_, WidgetStatus::Creating)
            )
        }
    }

    fn store() -> ResourceStore<Widget> {
        let options = StoreOptions::for_domain::<Widget>()
            .with_ids(Arc::new(SequentialIds::new()));
        ResourceStore::with_options(options).unwrap()
    }

    fn ids(store: &ResourceStore<Widget>) -> Vec<String> {
        store.list().into_iter().map(|r| r.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_assigns_identity_and_transient_status() {
        let store = store();
        let a = store.create("alpha", WidgetSpec::default());
        let b = store.create("beta", WidgetSpec::default());

        assert_eq!(a.id, "w-1");
        assert_eq!(b.id, "w-2");
        assert_eq!(a.status, WidgetStatus::Creating);
        assert_eq!(a.spec.label.as_deref(), Some("alpha.widgets.local"));
        assert!(a.spec.serial.is_none());

        let unique: HashSet<String> = ids(&store).into_iter().collect();
        assert_eq!(unique.len(), 2);
        assert_eq!(ids(&store), vec!["w-1", "w-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_uses_injected_clock() {
        let at: DateTime<Utc> = "2023-12-15T16:41:12Z".parse().unwrap();
        let options = StoreOptions::for_domain::<Widget>().with_clock(Arc::new(FixedClock(at)));
        let store = ResourceStore::<Widget>::with_options(options).unwrap();

        let widget = store.create("alpha", WidgetSpec::default());
        assert_eq!(widget.created, at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_settles_exactly_once() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());
        assert!(store.is_settling(&w.id));

        tokio::time::sleep(Duration::from_millis(1001)).await;
        let settled = store.get(&w.id).unwrap();
        assert_eq!(settled.status, WidgetStatus::Ready);
        assert_eq!(settled.spec.serial.as_deref(), Some("SN-1"));
        assert!(!store.is_settling(&w.id));

        store.update_status(&w.id, WidgetStatus::Stopped);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.get(&w.id).unwrap().status, WidgetStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_is_idempotent_and_cancels_timer() {
        let store = store();
        let a = store.create("alpha", WidgetSpec::default());
        let b = store.create("beta", WidgetSpec::default());

        store.delete(&a.id);
        store.delete(&a.id);
        assert_eq!(ids(&store), vec![b.id.clone()]);
        assert!(!store.is_settling(&a.id));

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(store.get(&a.id).is_none());
        assert_eq!(store.get(&b.id).unwrap().status, WidgetStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_status_unknown_id_is_noop() {
        let store = store();
        store.create("alpha", WidgetSpec::default());
        let before = serde_json::to_value(store.list()).unwrap();

        store.update_status("nonexistent-id", WidgetStatus::Stopped);
        store.update("nonexistent-id", |spec| spec.size = 99);

        assert_eq!(serde_json::to_value(store.list()).unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_status_accepts_any_value() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());

        // Creating -> Stopped is rejected by the table but the permissive path allows it.
        store.update_status(&w.id, WidgetStatus::Stopped);
        assert_eq!(store.get(&w.id).unwrap().status, WidgetStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_enforces_table() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());

        let err = store.transition(&w.id, WidgetStatus::Stopped).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));

        let err = store.transition("w-404", WidgetStatus::Ready).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        tokio::time::sleep(Duration::from_millis(1001)).await;
        store.transition(&w.id, WidgetStatus::Stopped).unwrap();
        assert_eq!(store.get(&w.id).unwrap().status, WidgetStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_mutates_payload() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());

        store.update(&w.id, |spec| spec.size = 42);
        assert_eq!(store.get(&w.id).unwrap().spec.size, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_deferred_status() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());
        tokio::time::sleep(Duration::from_millis(1001)).await;

        store.update_status(&w.id, WidgetStatus::Stopped);
        store.schedule(&w.id, WidgetStatus::Ready, Duration::from_millis(500));
        assert_eq!(store.get(&w.id).unwrap().status, WidgetStatus::Stopped);

        tokio::time::sleep(Duration::from_millis(501)).await;
        assert_eq!(store.get(&w.id).unwrap().status, WidgetStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_does_not_arm_timers() {
        let store = store();
        store.seed(vec![Resource {
            id: "w-100".to_string(),
            name: "seeded".to_string(),
            status: WidgetStatus::Stopped,
            created: Utc::now(),
            spec: WidgetSpec::default(),
        }]);

        assert!(!store.is_settling("w-100"));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.get("w-100").unwrap().status, WidgetStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_lifecycle() {
        let store = store();
        let mut events = store.subscribe();

        let w = store.create("alpha", WidgetSpec::default());
        tokio::time::sleep(Duration::from_millis(1001)).await;
        store.delete(&w.id);

        let changes: Vec<Change> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.change)
            .collect();
        assert_eq!(
            changes,
            vec![
                Change::Created { status: "Creating".to_string() },
                Change::StatusChanged {
                    from: "Creating".to_string(),
                    to: "Ready".to_string()
                },
                Change::Deleted,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let store = store();
        let other = store.clone();
        let w = store.create("alpha", WidgetSpec::default());
        assert!(other.contains(&w.id));
        other.delete(&w.id);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_requires_runtime() {
        assert!(matches!(ResourceStore::<Widget>::new(), Err(Error::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serialized_record_is_flat() {
        let store = store();
        let w = store.create("alpha", WidgetSpec::default());
        let json = serde_json::to_value(&w).unwrap();

        assert_eq!(json["id"], "w-1");
        assert_eq!(json["status"], "Creating");
        assert_eq!(json["label"], "alpha.widgets.local");
        assert!(json["created"].as_str().unwrap().contains('T'));
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use coffer_core::backend::{
    BackendError, BackendResult, DatastreamProfile, ObjectProfile, ObjectStore,
};
use coffer_core::model::{Datastream, DatastreamKind, DigitalObject};
use coffer_core::registry::{GroupSpec, ObjectType};
use coffer_core_types::Pid;
use coffer_engine::{EngineConfig, Session};
use coffer_store::{MemoryIndex, MemoryStore};

/// The object type used by most scenarios: a `DC` metadata static and
/// an `image` group constrained to PNG content.
#[allow(dead_code)]
pub fn item_type() -> Arc<ObjectType> {
    ObjectType::builder("Item")
        .static_datastream("DC", DatastreamKind::Metadata, seed_dc)
        .named_group("image", GroupSpec::default().mime_type("image/png"))
        .build()
}

fn seed_dc(ds: &mut Datastream) {
    ds.label = "Descriptive metadata".to_string();
    ds.set_field("title", vec![String::new()]);
}

/// Memory-backed session plus handles on the concrete backends
#[allow(dead_code)]
pub fn memory_session() -> (Session, Arc<MemoryStore>, Arc<MemoryIndex>) {
    memory_session_with(EngineConfig::default())
}

#[allow(dead_code)]
pub fn memory_session_with(
    config: EngineConfig,
) -> (Session, Arc<MemoryStore>, Arc<MemoryIndex>) {
    let store = Arc::new(MemoryStore::new("demo"));
    let index = Arc::new(MemoryIndex::new());
    let session = Session::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::clone(&index) as Arc<dyn coffer_core::backend::SearchIndex>,
        config,
    );
    (session, store, index)
}

/// Object store wrapper counting datastream writes and optionally
/// failing on one dsid, for dirty-tracking and partial-failure
/// scenarios.
pub struct CountingStore {
    inner: Arc<MemoryStore>,
    pub datastream_writes: AtomicUsize,
    pub written_dsids: Mutex<Vec<String>>,
    pub fail_dsid: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            datastream_writes: AtomicUsize::new(0),
            written_dsids: Mutex::new(Vec::new()),
            fail_dsid: Mutex::new(None),
        }
    }

    pub fn fail_on(&self, dsid: &str) {
        *self.fail_dsid.lock().unwrap() = Some(dsid.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_dsid.lock().unwrap() = None;
    }

    pub fn writes(&self) -> usize {
        self.datastream_writes.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<String> {
        self.written_dsids.lock().unwrap().clone()
    }

    pub fn reset_counts(&self) {
        self.datastream_writes.store(0, Ordering::SeqCst);
        self.written_dsids.lock().unwrap().clear();
    }
}

impl ObjectStore for CountingStore {
    fn mint_pid(&self) -> BackendResult<Pid> {
        self.inner.mint_pid()
    }

    fn fetch_object(&self, pid: &Pid) -> BackendResult<Option<ObjectProfile>> {
        self.inner.fetch_object(pid)
    }

    fn fetch_datastream_manifest(&self, pid: &Pid) -> BackendResult<Vec<DatastreamProfile>> {
        self.inner.fetch_datastream_manifest(pid)
    }

    fn fetch_datastream_content(&self, pid: &Pid, dsid: &str) -> BackendResult<Option<Vec<u8>>> {
        self.inner.fetch_datastream_content(pid, dsid)
    }

    fn save_object(&self, object: &DigitalObject) -> BackendResult<ObjectProfile> {
        self.inner.save_object(object)
    }

    fn save_datastream(
        &self,
        pid: &Pid,
        profile: &DatastreamProfile,
        content: &[u8],
    ) -> BackendResult<()> {
        if self.fail_dsid.lock().unwrap().as_deref() == Some(profile.dsid.as_str()) {
            return Err(BackendError::Io(format!(
                "injected failure writing {}",
                profile.dsid
            )));
        }
        self.datastream_writes.fetch_add(1, Ordering::SeqCst);
        self.written_dsids.lock().unwrap().push(profile.dsid.clone());
        self.inner.save_datastream(pid, profile, content)
    }

    fn delete_object(&self, pid: &Pid) -> BackendResult<bool> {
        self.inner.delete_object(pid)
    }
}

/// Session over a counting store
#[allow(dead_code)]
pub fn counting_session() -> (Session, Arc<CountingStore>, Arc<MemoryIndex>) {
    let store = Arc::new(CountingStore::new(Arc::new(MemoryStore::new("demo"))));
    let index = Arc::new(MemoryIndex::new());
    let session = Session::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::clone(&index) as Arc<dyn coffer_core::backend::SearchIndex>,
        EngineConfig::default(),
    );
    (session, store, index)
}

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::EncoderConfiguration;
use crate::models::error::EncoderError;
use crate::models::handle::SessionHandle;
use crate::session::encoder::Encoder;
use crate::traits::codec_engine::EngineFactory;

/// Engine instance shared between the registry and in-flight calls.
///
/// The mutex serializes every call on one instance.
pub type SharedEngine<E> = Arc<Mutex<E>>;

struct Slot<E> {
    generation: u32,
    engine: Option<SharedEngine<E>>,
}

/// Arena of engine instances addressed by generation-checked handles.
struct SlotTable<E> {
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
    live: usize,
}

impl<E> SlotTable<E> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    fn insert(&mut self, engine: E) -> Result<SessionHandle, EncoderError> {
        let engine = Some(Arc::new(Mutex::new(engine)));
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.engine = engine;
                index
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| {
                    EncoderError::EngineCreation("session table is full".into())
                })?;
                self.slots.push(Slot {
                    generation: 1,
                    engine,
                });
                index
            }
        };
        self.live += 1;
        Ok(SessionHandle::new(index, self.slots[index as usize].generation))
    }

    fn get(&self, handle: SessionHandle) -> Option<&SharedEngine<E>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.engine.as_ref())
    }

    fn remove(&mut self, handle: SessionHandle) -> Option<SharedEngine<E>> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let engine = slot.engine.take()?;
        self.live -= 1;
        // A slot whose generation would wrap is retired so no handle value
        // is ever issued twice.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(handle.index());
        }
        Some(engine)
    }
}

/// Maps opaque handles to live engine instances.
///
/// The handle table is guarded by one lock covering create, lookup and
/// release. Engine calls hold only the per-instance lock, so distinct
/// sessions encode concurrently.
pub struct SessionRegistry<F: EngineFactory> {
    factory: F,
    table: Mutex<SlotTable<F::Engine>>,
}

impl<F: EngineFactory> SessionRegistry<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            table: Mutex::new(SlotTable::new()),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Allocate an engine instance for `config` and bind it to a fresh handle.
    pub fn create(&self, config: &EncoderConfiguration) -> Result<SessionHandle, EncoderError> {
        let engine = self.factory.create(config)?;
        let handle = self.table.lock().insert(engine)?;
        log::debug!(
            "issued session {} ({} Hz -> {} Hz, {} ch, {} kbps, q{})",
            handle,
            config.input_sample_rate_hz(),
            config.output_sample_rate_hz(),
            config.channel_count(),
            config.output_bitrate_kbps(),
            config.quality().value()
        );
        Ok(handle)
    }

    /// Create a session and wrap it in an [`Encoder`].
    pub fn open_session(
        self: &Arc<Self>,
        config: EncoderConfiguration,
    ) -> Result<Encoder<F>, EncoderError> {
        Encoder::open(Arc::clone(self), config)
    }

    pub fn lookup(&self, handle: SessionHandle) -> Result<SharedEngine<F::Engine>, EncoderError> {
        self.table
            .lock()
            .get(handle)
            .cloned()
            .ok_or(EncoderError::InvalidHandle(handle))
    }

    /// Run `f` on the engine bound to `handle` while holding its lock.
    pub fn with_engine<R>(
        &self,
        handle: SessionHandle,
        f: impl FnOnce(&mut F::Engine) -> R,
    ) -> Result<R, EncoderError> {
        let engine = self.lookup(handle)?;
        let mut guard = engine.lock();
        Ok(f(&mut guard))
    }

    /// Remove the binding and destroy the engine instance.
    ///
    /// Releasing an unknown or already released handle is an error. When
    /// another thread is mid-call on the instance, destruction happens as
    /// soon as that call returns.
    pub fn release(&self, handle: SessionHandle) -> Result<(), EncoderError> {
        let engine = self
            .table
            .lock()
            .remove(handle)
            .ok_or(EncoderError::InvalidHandle(handle))?;
        drop(engine);
        log::debug!("released session {}", handle);
        Ok(())
    }

    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.table.lock().get(handle).is_some()
    }

    pub fn live_sessions(&self) -> usize {
        self.table.lock().live
    }

    /// Forward the process-wide engine logging toggle.
    pub fn set_logging(&self, enabled: bool) {
        self.factory.set_logging(enabled);
    }
}

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quotelog_core::{QuoteSource, QuotelogError, Snapshot};

/// Instruction for how a `snapshot` call should behave for a given instrument.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the provided snapshot immediately.
    Return(Snapshot),
    /// Fail immediately with the provided error.
    Fail(QuotelogError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    // One-shot behaviors consumed before the standing rule.
    queued: HashMap<String, VecDeque<MockBehavior>>,
    rules: HashMap<String, MockBehavior>,
    calls: Vec<String>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the standing behavior for an instrument.
    pub async fn set_behavior(&self, instrument: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(instrument.into(), behavior);
    }

    /// Queue a behavior for the next call on `instrument` only.
    pub async fn push_behavior(&self, instrument: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard
            .queued
            .entry(instrument.into())
            .or_default()
            .push_back(behavior);
    }

    /// Instruments requested so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    /// Clear all configured behaviors and the call log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.queued.clear();
        guard.rules.clear();
        guard.calls.clear();
    }
}

/// A quote source that defers all behavior to an external controller.
///
/// Unscripted instruments answer `NotFound`.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn QuoteSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn QuoteSource>, controller)
    }
}

#[async_trait]
impl QuoteSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError> {
        // Resolve the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.calls.push(instrument.to_string());
            let queued = guard
                .queued
                .get_mut(instrument)
                .and_then(VecDeque::pop_front);
            queued.or_else(|| guard.rules.get(instrument).cloned())
        };

        match behavior {
            Some(MockBehavior::Return(s)) => Ok(s),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(QuotelogError::not_found(format!(
                "snapshot for {instrument}"
            ))),
        }
    }
}

//! Test fixtures: an in-memory unit loader and a ready-made engine over a
//! temporary plugin directory.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::json;

use hookbridge_core::types::{HttpMethod, Payload};
use hookbridge_core::{AppError, AppResult};
use hookbridge_plugin::loader::LoadedUnit;
use hookbridge_plugin::traits::{
    Handler, HandlerError, HandlerFactory, Invocation, UnitDescriptor, UnitLoader,
};

use crate::engine::ExecutionEngine;

/// What a test unit does when invoked.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    /// Generic handler reporting which capability ran.
    Echo,
    /// Like `Echo`, but with a GET override.
    Rest,
    /// Echoes the request payload back verbatim.
    Mirror,
    /// Fails with the given message.
    Fail(String),
    /// Panics.
    Panic,
}

struct TestHandler {
    behavior: Behavior,
}

#[async_trait::async_trait]
impl Handler for TestHandler {
    async fn handle(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        match &self.behavior {
            Behavior::Echo | Behavior::Rest => {
                let mut out = Payload::new();
                out.insert("handler".to_string(), json!("generic"));
                out.insert("method".to_string(), json!(invocation.method));
                Ok(out)
            }
            Behavior::Mirror => Ok(invocation.payload.clone()),
            Behavior::Fail(message) => Err(HandlerError::new(message.clone())),
            Behavior::Panic => panic!("plugin blew up"),
        }
    }

    async fn get(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        if matches!(self.behavior, Behavior::Rest) {
            let mut out = Payload::new();
            out.insert("handler".to_string(), json!("get"));
            Ok(out)
        } else {
            self.handle(invocation).await
        }
    }
}

struct TestFactory {
    name: String,
    behavior: Behavior,
}

impl HandlerFactory for TestFactory {
    fn descriptor(&self) -> UnitDescriptor {
        match self.behavior {
            Behavior::Rest => UnitDescriptor::new(&self.name, "RESTful test plugin")
                .with_override(HttpMethod::Get),
            _ => UnitDescriptor::new(&self.name, ""),
        }
    }

    fn create(&self) -> Box<dyn Handler> {
        Box::new(TestHandler {
            behavior: self.behavior.clone(),
        })
    }
}

/// In-memory loader keyed by file stem; counts loads per unit.
pub(crate) struct StubLoader {
    behaviors: HashMap<String, Behavior>,
    failing: HashSet<String>,
    counts: Mutex<HashMap<String, usize>>,
}

impl StubLoader {
    pub(crate) fn load_count(&self, name: &str) -> usize {
        self.counts
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }
}

impl UnitLoader for StubLoader {
    fn load(&self, path: &Path) -> AppResult<Arc<LoadedUnit>> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        *self.counts.lock().unwrap().entry(stem.clone()).or_insert(0) += 1;

        if self.failing.contains(&stem) {
            return Err(AppError::load(format!(
                "Failed to load plugin '{stem}': unresolved symbol"
            )));
        }

        let behavior = self
            .behaviors
            .get(&stem)
            .cloned()
            .ok_or_else(|| AppError::load(format!("No test unit registered for '{stem}'")))?;

        Ok(Arc::new(LoadedUnit::from_factory(Box::new(TestFactory {
            name: stem,
            behavior,
        }))))
    }
}

/// An engine over a temporary plugin directory with stub-loaded units.
pub(crate) struct Fixture {
    pub engine: ExecutionEngine,
    pub loader: Arc<StubLoader>,
    _dir: tempfile::TempDir,
}

impl Fixture {
    /// The full default roster, one unit per behavior plus a unit that
    /// fails to load.
    pub(crate) fn new() -> Self {
        Self::with_units(
            &[
                ("echo", Behavior::Echo),
                ("rest", Behavior::Rest),
                ("mirror", Behavior::Mirror),
                ("forbidden", Behavior::Fail("permission denied".to_string())),
                ("slow", Behavior::Fail("operation timeout".to_string())),
                ("panicky", Behavior::Panic),
            ],
            &["broken"],
        )
    }

    /// No plugin units at all.
    pub(crate) fn empty() -> Self {
        Self::with_units(&[], &[])
    }

    pub(crate) fn with_units(units: &[(&str, Behavior)], failing: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut behaviors = HashMap::new();
        for (name, behavior) in units {
            touch_unit(dir.path(), name);
            behaviors.insert((*name).to_string(), behavior.clone());
        }
        for name in failing {
            touch_unit(dir.path(), name);
        }

        let loader = Arc::new(StubLoader {
            behaviors,
            failing: failing.iter().map(|s| (*s).to_string()).collect(),
            counts: Mutex::new(HashMap::new()),
        });

        let config = hookbridge_core::config::plugin::PluginConfig {
            directory: dir.path().to_string_lossy().into_owned(),
            extra_directories: Vec::new(),
        };

        Self {
            engine: ExecutionEngine::new(config, Arc::clone(&loader) as Arc<dyn UnitLoader>),
            loader,
            _dir: dir,
        }
    }
}

fn touch_unit(dir: &Path, stem: &str) {
    std::fs::write(
        dir.join(format!("{stem}.{}", std::env::consts::DLL_EXTENSION)),
        b"",
    )
    .unwrap();
}

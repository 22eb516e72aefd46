// ABOUTME: In-memory rendering surface - records every attribute the coordinator
// ABOUTME: sets so headless hosts and tests can inspect the rendered state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{Container, Frame, Mount, Surface};
use crate::app::{ApplicationRecord, Version};

/// Container that remembers its displayed attributes.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    state: Mutex<ContainerState>,
}

#[derive(Debug, Default, Clone)]
struct ContainerState {
    version: Option<String>,
    error: bool,
    marker: bool,
    marker_shown: usize,
}

impl MemoryContainer {
    /// Displayed version, as text.
    pub fn version(&self) -> Option<String> {
        self.state.lock().version.clone()
    }

    /// Whether the unresponsive indicator is showing.
    pub fn has_error(&self) -> bool {
        self.state.lock().error
    }

    /// Whether the new-version marker is showing.
    pub fn has_marker(&self) -> bool {
        self.state.lock().marker
    }

    /// How many times the marker has been switched on.
    pub fn marker_shown(&self) -> usize {
        self.state.lock().marker_shown
    }
}

impl Container for MemoryContainer {
    fn set_version(&self, version: Option<&Version>) {
        self.state.lock().version = version.map(ToString::to_string);
    }

    fn set_error(&self, error: bool) {
        self.state.lock().error = error;
    }

    fn set_new_version_marker(&self, visible: bool) {
        let mut state = self.state.lock();
        if visible {
            state.marker_shown += 1;
        }
        state.marker = visible;
    }
}

/// Frame that remembers every address it was pointed at.
#[derive(Debug, Default)]
pub struct MemoryFrame {
    state: Mutex<FrameState>,
}

#[derive(Debug, Default, Clone)]
struct FrameState {
    src: String,
    name: String,
    loads: Vec<String>,
}

impl MemoryFrame {
    /// Current name attribute.
    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    /// Every address set on this frame, oldest first.
    pub fn loads(&self) -> Vec<String> {
        self.state.lock().loads.clone()
    }

    /// Number of times the frame was navigated.
    pub fn load_count(&self) -> usize {
        self.state.lock().loads.len()
    }
}

impl Frame for MemoryFrame {
    fn src(&self) -> String {
        self.state.lock().src.clone()
    }

    fn set_src(&self, src: &str) {
        let mut state = self.state.lock();
        state.src = src.to_string();
        state.loads.push(src.to_string());
    }

    fn set_name(&self, name: &str) {
        self.state.lock().name = name.to_string();
    }
}

/// A surface made of in-memory containers and frames, keyed by application id.
#[derive(Default, Clone)]
pub struct MemorySurface {
    mounts: Arc<RwLock<HashMap<String, (Arc<MemoryContainer>, Arc<MemoryFrame>)>>>,
}

impl MemorySurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface with a container and frame for each id.
    pub fn with_apps<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let surface = Self::new();
        for id in ids {
            surface.add(id);
        }
        surface
    }

    /// Add a container and frame for `id`, replacing any existing pair.
    pub fn add(&self, id: impl Into<String>) {
        self.mounts.write().insert(
            id.into(),
            (
                Arc::new(MemoryContainer::default()),
                Arc::new(MemoryFrame::default()),
            ),
        );
    }

    /// The container for `id`.
    pub fn container(&self, id: &str) -> Option<Arc<MemoryContainer>> {
        self.mounts.read().get(id).map(|(c, _)| c.clone())
    }

    /// The frame for `id`.
    pub fn frame(&self, id: &str) -> Option<Arc<MemoryFrame>> {
        self.mounts.read().get(id).map(|(_, f)| f.clone())
    }
}

impl Surface for MemorySurface {
    fn mount(&self, record: &ApplicationRecord) -> Option<Mount> {
        let mounts = self.mounts.read();
        let (container, frame) = mounts.get(&record.id)?;
        Some(Mount {
            container: container.clone(),
            frame: frame.clone(),
        })
    }
}

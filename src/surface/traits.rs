// ABOUTME: Defines the rendering-surface traits - a container per application
// ABOUTME: and the embedded frame inside it that the coordinator drives.

use std::sync::Arc;

use crate::app::{ApplicationRecord, Version};

/// The element hosting one application's frame.
///
/// The coordinator calls these methods with no locks held, so an
/// implementation may call back into the coordinator.
pub trait Container: Send + Sync {
    /// Show the version the application last reported.
    fn set_version(&self, version: Option<&Version>);

    /// Show or hide the unresponsive indicator.
    fn set_error(&self, error: bool);

    /// Show or hide the transient "new version" marker.
    fn set_new_version_marker(&self, visible: bool);
}

/// The embedded frame that renders an application.
///
/// Called with no coordinator locks held. A surface that learns about
/// load completion synchronously may report it from `set_src` by calling
/// `Coordinator::frame_loaded`.
pub trait Frame: Send + Sync {
    /// Address the frame is currently loaded from.
    fn src(&self) -> String;

    /// Navigate the frame to `src`.
    fn set_src(&self, src: &str);

    /// Set the frame's name attribute.
    fn set_name(&self, name: &str);
}

/// Handles for one application, owned by its registry entry.
#[derive(Clone)]
pub struct Mount {
    pub container: Arc<dyn Container>,
    pub frame: Arc<dyn Frame>,
}

/// Looks up where an application is rendered.
pub trait Surface: Send + Sync {
    /// Return the container and frame for `record`, if the surface has them.
    fn mount(&self, record: &ApplicationRecord) -> Option<Mount>;
}

// ABOUTME: Defines the cross-boundary messages of the liveness handshake:
// ABOUTME: the host's ping and the frame's reply, in their JSON wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppPatch;
use crate::timer::TimerId;

/// Host to frame: "answer before this timer fires".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingMessage {
    #[serde(rename = "timeoutID")]
    pub timeout_id: TimerId,
}

/// Frame to host: an optional liveness reply and an optional state report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    #[serde(rename = "timeoutID", default, skip_serializing_if = "Option::is_none")]
    pub timeout_id: Option<TimerId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppPatch>,
}

impl FrameMessage {
    /// Decode a raw frame message, field by field.
    ///
    /// `timeoutID` and `app` are read independently, so a malformed state
    /// report never costs the liveness reply it travels with. Returns
    /// `None` only when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let timeout_id = fields
            .get("timeoutID")
            .and_then(|v| TimerId::deserialize(v).ok());
        let app = fields
            .get("app")
            .and_then(|v| AppPatch::deserialize(v).ok());
        Some(Self { timeout_id, app })
    }

    /// A reply to `ping` with no state report.
    pub fn reply(ping: &PingMessage) -> Self {
        Self {
            timeout_id: Some(ping.timeout_id),
            app: None,
        }
    }

    /// A state report with no liveness reply.
    pub fn report(app: AppPatch) -> Self {
        Self {
            timeout_id: None,
            app: Some(app),
        }
    }

    /// Attach a state report.
    pub fn with_app(mut self, app: AppPatch) -> Self {
        self.app = Some(app);
        self
    }
}

/// The origin (`scheme://host[:port]`) of a frame address.
///
/// Returns `None` for addresses that do not parse or have an opaque origin
/// (`about:blank`, `data:` URLs), which cannot be messaged safely.
pub fn origin_of(address: &str) -> Option<String> {
    let url = reqwest::Url::parse(address).ok()?;
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

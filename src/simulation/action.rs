//! Action envelopes submitted by drivers and agents
//!
//! Every mutation an agent can make goes through `SimWorld::apply_action`.
//! Envelopes are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "create_path", "station_indices": [0, 1, 2], "loop": true}
//! {"type": "remove_path", "index": 0}
//! {"type": "set_speed", "multiplier": 2}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Noop,
    /// Build a finished path through stations given by list index
    CreatePath {
        station_indices: Vec<usize>,
        #[serde(default, rename = "loop")]
        looped: bool,
    },
    /// Remove a path by list index or by id; exactly one must be given
    RemovePath {
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        path_id: Option<usize>,
    },
    Pause,
    Resume,
    SetSpeed {
        multiplier: u32,
    },
    PurchasePathSlot {
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub ok: bool,
}

impl ActionResult {
    pub const OK: ActionResult = ActionResult { ok: true };
    pub const REJECTED: ActionResult = ActionResult { ok: false };

    pub fn from_bool(ok: bool) -> Self {
        Self { ok }
    }
}

impl Action {
    /// Parse a JSON envelope; unknown or malformed envelopes yield `None`
    pub fn from_json(text: &str) -> Option<Action> {
        serde_json::from_str(text).ok()
    }
}

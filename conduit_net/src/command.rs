// Structural edits as data.
//
// An `EditCommand` is one thing the outside world can do to the pipe graph:
// place or remove a pipe, toggle a pipe side, advance the clock, or tear
// the world down. They are what a world loader replays on chunk load and
// what the `replay` binary reads from a scenario file, and they map 1:1 onto
// `NetworkManager`/`NetworkRegistry` calls (see `replay.rs`).
//
// Commands are plain serde data (externally tagged enums, as serde_json
// writes them by default):
//
//   [
//     {"Place": {"world": 0, "position": {"x": 0, "y": 0, "z": 0}}},
//     {"SetConnection": {"world": 0, "position": {"x": 0, "y": 0, "z": 0},
//                        "side": "PosX", "allowed": false}},
//     {"Tick": {"count": 20}},
//     "Stop"
//   ]

use crate::types::{Direction, DirectionSet, VoxelCoord, WorldId};
use serde::{Deserialize, Serialize};

/// A single structural edit or clock event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditCommand {
    /// Place a pipe. `blacklist` names sides that start disabled.
    Place {
        world: WorldId,
        position: VoxelCoord,
        #[serde(default)]
        blacklist: DirectionSet,
    },
    /// Remove the pipe placed at `position`.
    Remove {
        world: WorldId,
        position: VoxelCoord,
    },
    /// Allow or forbid one side of a pipe (and the matching side of its
    /// neighbor).
    SetConnection {
        world: WorldId,
        position: VoxelCoord,
        side: Direction,
        allowed: bool,
    },
    /// Run `count` global ticks.
    Tick {
        #[serde(default = "one_tick")]
        count: u32,
    },
    /// Tear the world down, as on server stop.
    Stop,
}

fn one_tick() -> u32 {
    1
}

/// Parse a JSON array of commands.
pub fn parse_commands(json: &str) -> Result<Vec<EditCommand>, serde_json::Error> {
    serde_json::from_str(json)
}

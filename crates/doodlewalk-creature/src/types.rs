//! Common handle and display types for creatures
//!
//! Bodies and joints live in arenas owned by the physics engine; creatures
//! only hold these index handles, so teardown never has to untangle
//! references in both directions.

use serde::{Deserialize, Serialize};

/// Index of a rigid body inside the physics engine's body arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub usize);

impl BodyHandle {
    /// Get the raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Index of a constraint inside the physics engine's joint arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointHandle(pub usize);

impl JointHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for JointHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.0)
    }
}

/// Index of a body part inside its creature (0 is always the main body)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub usize);

impl PartId {
    pub const MAIN: PartId = PartId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

/// RGBA color, matching the `[u8; 4]` layout renderers consume
pub type Color = [u8; 4];

// Core types shared across the network engine.
//
// Defines spatial coordinates (`VoxelCoord`) and their packed 64-bit form,
// the six axis directions (`Direction`) with a compact bitset over them
// (`DirectionSet`), and the integer identifiers for worlds, nodes and
// networks.
//
// Packing follows the usual block-position layout: 26 bits of x, 26 bits of
// z and 12 bits of y, each two's-complement. Coordinates outside that range
// can't be packed and are rejected at the manager boundary, so packed keys
// are unique within a world.
//
// See also: `node.rs` for how connections are stored per direction,
// `manager.rs` which keys its position maps by packed coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

const PACKED_X_BITS: u32 = 26;
const PACKED_Z_BITS: u32 = 26;
const PACKED_Y_BITS: u32 = 12;
const PACKED_Z_SHIFT: u32 = PACKED_Y_BITS;
const PACKED_X_SHIFT: u32 = PACKED_Y_BITS + PACKED_Z_BITS;

/// A position in the 3D voxel grid. Each component is in voxel units.
///
/// The coordinate system uses right-handed conventions:
/// - X: east  (positive) / west  (negative)
/// - Y: up    (positive) / down  (negative)
/// - Z: south (positive) / north (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The face-adjacent coordinate in `direction`.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.to_offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Whether every component fits in its packed bit field.
    pub fn is_packable(self) -> bool {
        fits_signed(self.x, PACKED_X_BITS)
            && fits_signed(self.y, PACKED_Y_BITS)
            && fits_signed(self.z, PACKED_Z_BITS)
    }

    /// Pack into a single `u64` key. Returns `None` if any component is
    /// outside the packable range.
    pub fn pack(self) -> Option<u64> {
        if !self.is_packable() {
            return None;
        }
        let x = (self.x as i64 as u64) & mask(PACKED_X_BITS);
        let y = (self.y as i64 as u64) & mask(PACKED_Y_BITS);
        let z = (self.z as i64 as u64) & mask(PACKED_Z_BITS);
        Some((x << PACKED_X_SHIFT) | (z << PACKED_Z_SHIFT) | y)
    }

    /// Inverse of `pack()`. Every `u64` decodes to some coordinate; only
    /// values produced by `pack()` round-trip.
    pub fn unpack(packed: u64) -> Self {
        let signed = packed as i64;
        // Shift each field to the top of the word, then sign-extend back down.
        let x = signed >> PACKED_X_SHIFT;
        let z = (signed << (64 - PACKED_X_SHIFT)) >> (64 - PACKED_Z_BITS);
        let y = (signed << (64 - PACKED_Y_BITS)) >> (64 - PACKED_Y_BITS);
        Self::new(x as i32, y as i32, z as i32)
    }
}

fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

fn fits_signed(value: i32, bits: u32) -> bool {
    let limit = 1i64 << (bits - 1);
    (-limit..limit).contains(&(value as i64))
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// One of the six axis-aligned face directions.
///
/// Discriminants double as stable ids (0..6) for bitmasks: down, up, north,
/// south, west, east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    NegY = 0,
    PosY = 1,
    NegZ = 2,
    PosZ = 3,
    NegX = 4,
    PosX = 5,
}

impl Direction {
    /// All six directions in id order.
    pub const ALL: [Direction; 6] = [
        Direction::NegY,
        Direction::PosY,
        Direction::NegZ,
        Direction::PosZ,
        Direction::NegX,
        Direction::PosX,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::NegY => Direction::PosY,
            Direction::PosY => Direction::NegY,
            Direction::NegZ => Direction::PosZ,
            Direction::PosZ => Direction::NegZ,
            Direction::NegX => Direction::PosX,
            Direction::PosX => Direction::NegX,
        }
    }

    /// Unit offset `(dx, dy, dz)` of this direction.
    pub const fn to_offset(self) -> (i32, i32, i32) {
        match self {
            Direction::NegY => (0, -1, 0),
            Direction::PosY => (0, 1, 0),
            Direction::NegZ => (0, 0, -1),
            Direction::PosZ => (0, 0, 1),
            Direction::NegX => (-1, 0, 0),
            Direction::PosX => (1, 0, 0),
        }
    }

    const fn bit(self) -> u8 {
        1 << self.id()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::NegY => "-y",
            Direction::PosY => "+y",
            Direction::NegZ => "-z",
            Direction::PosZ => "+z",
            Direction::NegX => "-x",
            Direction::PosX => "+x",
        };
        f.write_str(name)
    }
}

/// A set of directions stored as a 6-bit mask (bit `Direction::id()`).
///
/// Serializes as the raw mask byte. Deserializing drops bits above the
/// sixth, like `from_bits`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct DirectionSet(u8);

/// Bitmask of the directions a node is actually connected through. This is
/// the snapshot handed to other execution contexts (rendering, shapes); it
/// is a plain copy and never aliases the live graph.
pub type ConnectionMask = DirectionSet;

impl DirectionSet {
    const VALID_BITS: u8 = 0b11_1111;

    pub const EMPTY: DirectionSet = DirectionSet(0);
    pub const ALL: DirectionSet = DirectionSet(Self::VALID_BITS);

    /// Build from a raw mask. Bits above the sixth are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn of(directions: &[Direction]) -> Self {
        directions.iter().copied().collect()
    }

    /// Both directions along the axis of `direction`.
    pub fn axis(direction: Direction) -> Self {
        Self::of(&[direction, direction.opposite()])
    }

    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn complement(self) -> Self {
        Self(!self.0 & Self::VALID_BITS)
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate contained directions in id order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

impl From<u8> for DirectionSet {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Identifiers: simple integers, never reused within a manager.
// ---------------------------------------------------------------------------

/// Identity of a simulated world. Nodes in different worlds never connect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world {}", self.0)
    }
}

/// Compact identifier for a node inside one manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Compact identifier for a network inside one manager. Handles are
/// sequential and never recycled, so a stale handle can only miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "network {}", self.0)
    }
}

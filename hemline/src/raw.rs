//! The header codec.
//!
//! An instance is laid out as follows; every multi-byte counter is
//! little-endian, regardless of the host.
//!
//! ```text
//! +------------+-------------+-------------+-------------+-----------------+
//! | descriptor | [ref count] | capacity    | [used len]  | payload + NUL   |
//! | 1 byte     | 8 bytes     | width bytes | width bytes | capacity+1 bytes|
//! +------------+-------------+-------------+-------------+-----------------+
//! ```
//!
//! The descriptor is decoded with explicit masks rather than relying on any
//! native bit-field packing, so the layout is identical on every target.

/// Descriptor bit: the instance may be mutated.
const WRITABLE: u8 = 0b0000_0001;
/// Descriptor bits: the storage [`Area`].
const AREA_SHIFT: u32 = 1;
const AREA_MASK: u8 = 0b0000_0110;
/// Descriptor bits: the counter [`Width`].
const WIDTH_SHIFT: u32 = 3;
const WIDTH_MASK: u8 = 0b0001_1000;
/// Descriptor bits: the length-tracking field. Any nonzero value means a
/// used-length counter follows the capacity counter; encoding writes 1.
const TRACKED_MASK: u8 = 0b0110_0000;
const TRACKED: u8 = 0b0010_0000;
/// The sanity bit, which must always read as zero.
const RESERVED: u8 = 0b1000_0000;

/// Size of the reference-count word carried by [`Area::Counted`] instances.
pub const REF_COUNT_LEN: usize = 8;

/// Where an instance's backing memory lives.
///
/// The area is informational: it records who owns the backing buffer, but it
/// does not change how the primitives treat the instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Area {
  /// Memory with static storage duration.
  Static = 0,
  /// Memory owned by a local (stack) buffer.
  Local = 1,
  /// Uniquely owned heap memory.
  Heap = 2,
  /// Heap memory with an attached reference count.
  Counted = 3,
}

impl Area {
  const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0 => Self::Static,
      1 => Self::Local,
      2 => Self::Heap,
      _ => Self::Counted,
    }
  }

  /// Returns the number of bytes this area adds between the descriptor and
  /// the capacity counter.
  pub const fn prefix_len(self) -> usize {
    match self {
      Self::Counted => REF_COUNT_LEN,
      _ => 0,
    }
  }
}

/// The byte width of every length counter in an instance.
///
/// Chosen once, from the capacity, when the instance is initialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Width {
  /// One-byte counters.
  U8 = 0,
  /// Two-byte counters.
  U16 = 1,
  /// Four-byte counters.
  U32 = 2,
  /// Eight-byte counters.
  U64 = 3,
}

impl Width {
  const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0 => Self::U8,
      1 => Self::U16,
      2 => Self::U32,
      _ => Self::U64,
    }
  }

  /// Returns the narrowest width able to describe an instance of the given
  /// capacity.
  ///
  /// ```
  /// # use hemline::Width;
  /// assert_eq!(Width::for_capacity(10), Width::U8);
  /// assert_eq!(Width::for_capacity(254), Width::U8);
  /// assert_eq!(Width::for_capacity(255), Width::U16);
  /// assert_eq!(Width::for_capacity(100_000), Width::U32);
  /// ```
  pub const fn for_capacity(capacity: usize) -> Self {
    let capacity = capacity as u64;
    if capacity < u8::MAX as u64 {
      Self::U8
    } else if capacity < u16::MAX as u64 {
      Self::U16
    } else if capacity < u32::MAX as u64 {
      Self::U32
    } else {
      Self::U64
    }
  }

  /// Returns the number of bytes in a counter of this width.
  pub const fn bytes(self) -> usize {
    1 << self as u8
  }
}

/// A decoded descriptor byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
  /// Whether mutating operations are permitted.
  pub writable: bool,
  /// The storage area of the backing buffer.
  pub area: Area,
  /// The width of the length counters.
  pub width: Width,
  /// Whether a used-length counter is present. If not, the length of the
  /// instance is always its capacity.
  pub tracked: bool,
}

impl Header {
  /// Returns the header the initializer writes for the given capacity.
  pub const fn for_capacity(capacity: usize, area: Area) -> Self {
    Self {
      writable: true,
      area,
      width: Width::for_capacity(capacity),
      tracked: true,
    }
  }

  /// Decodes a descriptor byte.
  ///
  /// Returns `None` if the sanity bit is set, meaning the byte does not
  /// start an instance. Both bits of the length-tracking field are honored,
  /// so `0b0100_0000` decodes the same as `0b0010_0000`.
  ///
  /// ```
  /// # use hemline::*;
  /// let header = Header::decode(0b0010_0011).unwrap();
  /// assert!(header.writable && header.tracked);
  /// assert_eq!(header.area, Area::Local);
  /// assert_eq!(header.width, Width::U8);
  ///
  /// assert!(Header::decode(0b0100_0001).unwrap().tracked);
  /// assert!(Header::decode(0b1000_0000).is_none());
  /// ```
  pub const fn decode(byte: u8) -> Option<Self> {
    if byte & RESERVED != 0 {
      return None;
    }

    Some(Self {
      writable: byte & WRITABLE != 0,
      area: Area::from_bits((byte & AREA_MASK) >> AREA_SHIFT),
      width: Width::from_bits((byte & WIDTH_MASK) >> WIDTH_SHIFT),
      tracked: byte & TRACKED_MASK != 0,
    })
  }

  /// Encodes this header into a descriptor byte.
  pub const fn encode(self) -> u8 {
    let mut byte = (self.area as u8) << AREA_SHIFT;
    byte |= (self.width as u8) << WIDTH_SHIFT;
    if self.writable {
      byte |= WRITABLE;
    }
    if self.tracked {
      byte |= TRACKED;
    }
    byte
  }

  /// Offset of the reference count word, if this header has one.
  pub const fn ref_count_offset(self) -> Option<usize> {
    match self.area {
      Area::Counted => Some(1),
      _ => None,
    }
  }

  /// Offset of the capacity counter.
  pub const fn capacity_offset(self) -> usize {
    1 + self.area.prefix_len()
  }

  /// Offset of the used-length counter, if this header tracks one.
  pub const fn len_offset(self) -> Option<usize> {
    match self.tracked {
      true => Some(self.capacity_offset() + self.width.bytes()),
      false => None,
    }
  }

  /// Offset of the first payload byte.
  pub const fn payload_offset(self) -> usize {
    let counters = 1 + self.tracked as usize;
    self.capacity_offset() + counters * self.width.bytes()
  }

  /// Returns the number of bytes of backing storage an instance with this
  /// header and the given capacity occupies, or `None` on overflow.
  pub const fn backing_size(self, capacity: usize) -> Option<usize> {
    // Payload plus its terminator.
    let Some(payload) = capacity.checked_add(1) else {
      return None;
    };
    payload.checked_add(self.payload_offset())
  }

  /// Returns whether `capacity` can be stored in this header's counters.
  pub const fn fits(self, capacity: usize) -> bool {
    let bits = self.width.bytes() as u32 * 8;
    bits >= u64::BITS || (capacity as u64) >> bits == 0
  }
}

/// Returns the number of bytes of backing storage needed for a writable,
/// length-tracking instance of the given capacity that is not reference
/// counted.
///
/// This is a `const fn` so that it can size fixed arrays:
///
/// ```
/// # use hemline::*;
/// let mut buf = [0; hemline::backing_size(10)];
/// let hem = Hem::init(&mut buf, &Config::new(10)).unwrap();
/// assert_eq!(hem.capacity(), 10);
/// assert_eq!(buf.len(), 1 + 2 + 10 + 1);
/// ```
///
/// # Panics
///
/// Panics if the size does not fit in a `usize`.
pub const fn backing_size(capacity: usize) -> usize {
  match Header::for_capacity(capacity, Area::Local).backing_size(capacity) {
    Some(size) => size,
    None => panic!("hemline: backing size overflows usize"),
  }
}

/// Reads a little-endian counter of the given width from the front of
/// `bytes`.
pub fn read_le(bytes: &[u8], width: Width) -> Option<u64> {
  let counter = bytes.get(..width.bytes())?;
  Some(counter.iter().rev().fold(0, |acc, &b| acc << 8 | b as u64))
}

/// Writes a little-endian counter of the given width to the front of `bytes`.
///
/// Returns `None`, without writing anything, if `value` does not fit in
/// `width` or `bytes` is too short.
pub fn write_le(bytes: &mut [u8], width: Width, value: u64) -> Option<()> {
  let n = width.bytes();
  if n < 8 && value >> (n * 8) != 0 {
    return None;
  }

  let counter = bytes.get_mut(..n)?;
  for (i, b) in counter.iter_mut().enumerate() {
    *b = (value >> (i * 8)) as u8;
  }
  Some(())
}

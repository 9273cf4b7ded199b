use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::fmt::Write;
use std::hash::Hash;
use std::hash::Hasher;

use crate::raw;
use crate::raw::Area;
use crate::raw::Header;
use crate::raw::Width;
use crate::Config;
use crate::Error;
use crate::Result;
use crate::Text;

#[cfg(doc)]
use crate::*;

/// A bounded byte string, viewed in place over its backing buffer.
///
/// `Hem` is an unsized type, like [`str`]: it is always handled through a
/// reference (`&Hem`, `&mut Hem`) or through an owning [`HemBox`]. The
/// referenced bytes are the whole instance: descriptor, counters, payload and
/// terminator, laid out as described in [`Header`].
///
/// Every `&Hem` has been either initialized by [`Hem::init()`] or
/// authenticated by [`Hem::from_bytes()`], so the primitives can trust the
/// counters they decode. They still fail soft (returning zero, `None` or an
/// [`Error`]) instead of panicking if the header turns out to be unusable.
#[repr(transparent)]
pub struct Hem {
  bytes: [u8],
}

/// The decoded header fields of an instance, read once per primitive call.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Fields {
  pub header: Header,
  pub capacity: usize,
  pub len: usize,
  /// Offset of the first payload byte within the instance.
  pub payload: usize,
}

impl Fields {
  /// Checks that the instance can take on the given length, before anything
  /// is written.
  pub fn check_len(&self, len: usize) -> Result<()> {
    if len > self.capacity {
      return Err(Error::OutOfRange);
    }
    if len != self.len && !self.header.tracked {
      return Err(Error::FixedLength);
    }
    Ok(())
  }
}

/// Resolves a possibly negative index into `0..len`.
///
/// `-1` is the last byte; anything below `-len` or at or above `len` is out
/// of the window.
pub(crate) fn resolve_index(index: isize, len: usize) -> Option<usize> {
  let len = len as isize;
  if index < -len || index >= len {
    return None;
  }
  let index = if index < 0 { index + len } else { index };
  Some(index as usize)
}

static EMPTY: [u8; 4] = [
  Header {
    writable: false,
    area: Area::Static,
    width: Width::U8,
    tracked: true,
  }
  .encode(),
  0,
  0,
  0,
];

impl Hem {
  pub(crate) const fn from_raw(bytes: &[u8]) -> &Hem {
    unsafe {
      // SAFETY: Hem is a transparent wrapper over [u8], so the fat pointer
      // metadata carries over unchanged.
      &*(bytes as *const [u8] as *const Hem)
    }
  }

  pub(crate) fn from_raw_mut(bytes: &mut [u8]) -> &mut Hem {
    unsafe {
      // SAFETY: As above; the returned reference reborrows `bytes`.
      &mut *(bytes as *mut [u8] as *mut Hem)
    }
  }

  /// Returns a reference to an empty, read-only instance of any lifetime.
  ///
  /// ```
  /// # use hemline::*;
  /// let empty = Hem::empty();
  /// assert_eq!(empty.capacity(), 0);
  /// assert!(empty.is_read_only());
  /// ```
  ///
  /// This will also be found by the `Default` impl for `&Hem`.
  pub fn empty<'a>() -> &'a Hem {
    Self::from_raw(&EMPTY)
  }

  /// Initializes a new, empty instance at the front of `buf`.
  ///
  /// `buf` must be at least [`Config::backing_size()`] bytes long; any bytes
  /// past that are left untouched and are not part of the instance. This is
  /// the single entry point through which every instance comes to exist,
  /// whatever storage `buf` lives in.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut buf = [0; 64];
  /// let hem = Hem::init(&mut buf, &Config::new(10)).unwrap();
  /// assert_eq!(hem.len(), 0);
  /// assert_eq!(hem.as_bytes_with_nul(), b"\0");
  ///
  /// assert_eq!(Hem::init(&mut [0; 4], &Config::new(10)), Err(Error::OutOfRange));
  /// ```
  pub fn init<'a>(buf: &'a mut [u8], config: &Config) -> Result<&'a mut Hem> {
    Self::init_with(buf, config, &b""[..])
  }

  /// Initializes a new instance at the front of `buf`, holding a copy of
  /// `content`.
  ///
  /// `content` is truncated to the capacity. Content can be given to a
  /// read-only config; this is the only way to fill a read-only instance.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut buf = [0; hemline::backing_size(5)];
  /// let hem = Hem::init_with(&mut buf, &Config::new(5), "truncated").unwrap();
  /// assert_eq!(hem, "trunc");
  /// ```
  pub fn init_with<'a, T: Text + ?Sized>(
    buf: &'a mut [u8],
    config: &Config,
    content: &T,
  ) -> Result<&'a mut Hem> {
    Self::init_bytes(buf, config, content.text())
  }

  /// Like [`Hem::init_with()`], but copies `content` verbatim, interior NULs
  /// included.
  pub(crate) fn init_bytes<'a>(
    buf: &'a mut [u8],
    config: &Config,
    content: &[u8],
  ) -> Result<&'a mut Hem> {
    let header = config.header();
    if !header.fits(config.capacity) {
      return Err(Error::OutOfRange);
    }
    let size = config.backing_size().ok_or(Error::OutOfRange)?;
    if buf.len() < size {
      log::debug!(
        "backing buffer of {} bytes is too small, need {size}",
        buf.len()
      );
      return Err(Error::OutOfRange);
    }
    let buf = &mut buf[..size];

    let len = content.len().min(config.capacity);

    buf[0] = header.encode();
    if let Some(at) = header.ref_count_offset() {
      raw::write_le(&mut buf[at..], Width::U64, 1).ok_or(Error::OutOfRange)?;
    }
    raw::write_le(
      &mut buf[header.capacity_offset()..],
      header.width,
      config.capacity as u64,
    )
    .ok_or(Error::OutOfRange)?;
    if let Some(at) = header.len_offset() {
      raw::write_le(&mut buf[at..], header.width, len as u64)
        .ok_or(Error::OutOfRange)?;
    }

    let payload = &mut buf[header.payload_offset()..];
    payload[..len].copy_from_slice(&content[..len]);
    payload[len] = 0;

    Ok(Self::from_raw_mut(buf))
  }

  /// Authenticates foreign memory as an instance.
  ///
  /// Checks that the descriptor is sane, that `bytes` is long enough to hold
  /// everything the counters describe, that the length does not exceed the
  /// capacity, and that the payload is terminated. The returned reference
  /// covers exactly the instance; trailing bytes are ignored.
  ///
  /// ```
  /// # use hemline::*;
  /// // Writable, local, one-byte counters, tracked length.
  /// let bytes = [0b0010_0011, 4, 2, b'h', b'i', 0, 0, 0, 0];
  /// let hem = Hem::from_bytes(&bytes).unwrap();
  /// assert_eq!(hem, "hi");
  /// assert_eq!(hem.capacity(), 4);
  ///
  /// let mut forged = bytes;
  /// forged[0] |= 0x80;
  /// assert!(Hem::from_bytes(&forged).is_err());
  /// ```
  pub fn from_bytes(bytes: &[u8]) -> Result<&Hem> {
    let size = Self::authenticate(bytes)?;
    Ok(Self::from_raw(&bytes[..size]))
  }

  /// Like [`Hem::from_bytes()`], but returns a mutable view.
  pub fn from_bytes_mut(bytes: &mut [u8]) -> Result<&mut Hem> {
    let size = Self::authenticate(bytes)?;
    Ok(Self::from_raw_mut(&mut bytes[..size]))
  }

  /// Validates `bytes` and returns the size of the instance at its front.
  fn authenticate(bytes: &[u8]) -> Result<usize> {
    let reject = |why: &'static str| {
      log::debug!("rejecting foreign memory: {why}");
      Error::InvalidArgument(why)
    };

    let hem = Self::from_raw(bytes);
    let header = hem.header().ok_or_else(|| reject("bad descriptor"))?;
    let fields = hem.fields().ok_or_else(|| reject("truncated counters"))?;
    let size = header
      .backing_size(fields.capacity)
      .filter(|&size| size <= bytes.len())
      .ok_or_else(|| reject("buffer shorter than its capacity"))?;

    if fields.len > fields.capacity {
      return Err(reject("length exceeds capacity"));
    }
    if bytes[fields.payload + fields.len] != 0 {
      return Err(reject("missing terminator"));
    }
    Ok(size)
  }

  /// Returns the decoded descriptor, or `None` if this is not a valid
  /// instance.
  pub fn header(&self) -> Option<Header> {
    Header::decode(*self.bytes.first()?)
  }

  fn counter(&self, at: usize, width: Width) -> Option<usize> {
    let value = raw::read_le(self.bytes.get(at..)?, width)?;
    usize::try_from(value).ok()
  }

  pub(crate) fn fields(&self) -> Option<Fields> {
    let header = self.header()?;
    let capacity = self.counter(header.capacity_offset(), header.width)?;
    let len = match header.len_offset() {
      Some(at) => self.counter(at, header.width)?,
      None => capacity,
    };

    Some(Fields {
      header,
      capacity,
      len,
      payload: header.payload_offset(),
    })
  }

  /// Like [`Hem::fields()`], but fails unless the instance is writable.
  pub(crate) fn writable_fields(&self) -> Result<Fields> {
    let fields = self
      .fields()
      .ok_or(Error::InvalidArgument("not a valid instance"))?;
    if !fields.header.writable {
      log::debug!("rejected write to a read-only instance");
      return Err(Error::ReadOnly);
    }
    Ok(fields)
  }

  /// Returns the whole payload region: `capacity` content bytes plus the
  /// terminator slot.
  pub(crate) fn payload_mut(&mut self, fields: &Fields) -> &mut [u8] {
    let end = fields.payload + fields.capacity + 1;
    self.bytes.get_mut(fields.payload..end).unwrap_or_default()
  }

  /// Updates the used-length counter.
  ///
  /// Fails if the instance is read-only, has no used-length counter, or if
  /// `len` exceeds the capacity. Does not touch the terminator.
  pub(crate) fn set_len(&mut self, len: usize) -> Result<usize> {
    let fields = self.writable_fields()?;
    let at = fields.header.len_offset().ok_or(Error::FixedLength)?;
    if len > fields.capacity {
      return Err(Error::OutOfRange);
    }

    let counter = self.bytes.get_mut(at..).ok_or(Error::OutOfRange)?;
    raw::write_le(counter, fields.header.width, len as u64)
      .ok_or(Error::OutOfRange)?;
    Ok(len)
  }

  /// Finishes a mutation: records the new length and re-establishes the
  /// terminator.
  pub(crate) fn commit(&mut self, fields: &Fields, len: usize) -> Result<usize> {
    if len != fields.len {
      self.set_len(len)?;
    }
    if let Some(nul) = self.payload_mut(fields).get_mut(len) {
      *nul = 0;
    }
    Ok(len)
  }

  /// Returns the maximum number of content bytes this instance can hold.
  ///
  /// Returns zero if this is not a valid instance.
  pub fn capacity(&self) -> usize {
    self.fields().map_or(0, |f| f.capacity)
  }

  /// Returns the number of content bytes currently held.
  ///
  /// For instances without a used-length counter, this is the capacity.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::with_capacity(8).unwrap();
  /// assert_eq!(hem.len(), 0);
  /// hem.append("abc").unwrap();
  /// assert_eq!(hem.len(), 3);
  /// ```
  pub fn len(&self) -> usize {
    self.fields().map_or(0, |f| f.len)
  }

  /// Checks whether this instance holds no content.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Checks whether this instance is full.
  ///
  /// An invalid instance is always full.
  pub fn is_full(&self) -> bool {
    self.fields().map_or(true, |f| f.len == f.capacity)
  }

  /// Checks whether mutations are refused.
  ///
  /// An invalid instance is always read-only.
  pub fn is_read_only(&self) -> bool {
    self.header().map_or(true, |h| !h.writable)
  }

  /// Returns the storage area recorded in the descriptor.
  pub fn area(&self) -> Option<Area> {
    self.header().map(|h| h.area)
  }

  /// Returns the counter width recorded in the descriptor.
  pub fn width(&self) -> Option<Width> {
    self.header().map(|h| h.width)
  }

  /// Returns the reference count, for instances in [`Area::Counted`].
  ///
  /// ```
  /// # use hemline::*;
  /// let config = Config::new(4).area(Area::Counted);
  /// let mut buf = vec![0; config.backing_size().unwrap()];
  /// let hem = Hem::init(&mut buf, &config).unwrap();
  /// assert_eq!(hem.ref_count(), Some(1));
  ///
  /// assert_eq!(HemBox::with_capacity(4).unwrap().ref_count(), None);
  /// ```
  pub fn ref_count(&self) -> Option<u64> {
    let at = self.header()?.ref_count_offset()?;
    raw::read_le(self.bytes.get(at..)?, Width::U64)
  }

  /// Returns the content bytes, without the terminator.
  pub fn as_bytes(&self) -> &[u8] {
    self
      .fields()
      .and_then(|f| self.bytes.get(f.payload..f.payload + f.len))
      .unwrap_or_default()
  }

  /// Returns the content bytes, including the terminator.
  pub fn as_bytes_with_nul(&self) -> &[u8] {
    self
      .fields()
      .and_then(|f| self.bytes.get(f.payload..=f.payload + f.len))
      .unwrap_or(b"\0")
  }

  /// Returns a C string view of the payload.
  ///
  /// If the content contains interior NUL bytes, the view ends at the first
  /// of them, which is what C code reading the payload would see.
  ///
  /// ```
  /// # use hemline::*;
  /// let hem = HemBox::duplicate("hello").unwrap();
  /// assert_eq!(hem.as_c_str(), c"hello");
  /// ```
  pub fn as_c_str(&self) -> &CStr {
    CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
  }

  /// Returns the content bytes for in-place modification.
  ///
  /// The length, and thus the terminator, cannot be changed through this
  /// slice. Returns `None` if this instance is read-only.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate("smol").unwrap();
  /// hem.as_mut_bytes().unwrap()[3] = b'g';
  /// assert_eq!(hem, "smog");
  /// ```
  pub fn as_mut_bytes(&mut self) -> Option<&mut [u8]> {
    let f = self.writable_fields().ok()?;
    self.bytes.get_mut(f.payload..f.payload + f.len)
  }

  /// Returns the byte at `index`.
  ///
  /// Negative indices count from the end; `-1` is the last byte.
  ///
  /// ```
  /// # use hemline::*;
  /// let hem = HemBox::duplicate("abc").unwrap();
  /// assert_eq!(hem.byte_at(0), Some(b'a'));
  /// assert_eq!(hem.byte_at(-1), Some(b'c'));
  /// assert_eq!(hem.byte_at(-4), None);
  /// assert_eq!(hem.byte_at(3), None);
  /// ```
  pub fn byte_at(&self, index: isize) -> Option<u8> {
    let bytes = self.as_bytes();
    resolve_index(index, bytes.len()).map(|i| bytes[i])
  }

  /// Returns the raw backing bytes of this instance, header included.
  pub fn as_raw_bytes(&self) -> &[u8] {
    &self.bytes
  }
}

impl fmt::Debug for Hem {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "\"{}\"", self.as_bytes().escape_ascii())
  }
}

impl fmt::Display for Hem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.as_bytes().utf8_chunks() {
      f.write_str(chunk.valid())?;
      if !chunk.invalid().is_empty() {
        f.write_char(char::REPLACEMENT_CHARACTER)?;
      }
    }
    Ok(())
  }
}

impl<T: Text + ?Sized> PartialEq<T> for Hem {
  fn eq(&self, that: &T) -> bool {
    self.as_bytes() == that.text()
  }
}

impl Eq for Hem {}

impl<T: Text + ?Sized> PartialOrd<T> for Hem {
  fn partial_cmp(&self, that: &T) -> Option<Ordering> {
    Some(self.as_bytes().cmp(that.text()))
  }
}

impl Ord for Hem {
  fn cmp(&self, that: &Self) -> Ordering {
    self.as_bytes().cmp(that.as_bytes())
  }
}

impl Hash for Hem {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_bytes().hash(state)
  }
}

impl Default for &Hem {
  fn default() -> Self {
    Hem::empty()
  }
}

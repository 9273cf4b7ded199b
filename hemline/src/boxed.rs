use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::raw::Area;
use crate::search;
use crate::Config;
use crate::Error;
use crate::Hem;
use crate::Result;
use crate::Text;

#[cfg(doc)]
use crate::*;

/// An owned instance on the heap.
///
/// A `HemBox` owns a backing buffer of exactly the size its header
/// describes. Boxes allocated here are tagged [`Area::Heap`]; one adopted
/// through [`HemBox::from_boxed_bytes()`] keeps the header it arrived with.
/// It dereferences to [`Hem`], so every primitive is available on it; the
/// buffer is released when the box is dropped.
///
/// Backing memory is reserved fallibly: running out of memory is reported as
/// [`Error::Alloc`] rather than aborting.
///
/// ```
/// # use hemline::*;
/// let mut greeting = HemBox::with_capacity(12).unwrap();
/// greeting.copy_from("hello").unwrap();
/// greeting.append(", world").unwrap();
/// assert_eq!(greeting, "hello, world");
/// assert!(greeting.is_full());
/// ```
pub struct HemBox {
  buf: Box<[u8]>,
}

impl HemBox {
  /// Allocates a new, empty, writable instance.
  pub fn with_capacity(capacity: usize) -> Result<Self> {
    Self::alloc(&Config::new(capacity), b"")
  }

  /// Allocates a new instance from a [`Config`], holding a copy of `content`
  /// truncated to the capacity.
  ///
  /// The area in `config` is ignored: a `HemBox` always lives in
  /// [`Area::Heap`].
  ///
  /// ```
  /// # use hemline::*;
  /// let config = Config::new(8).read_only();
  /// let mut frozen = HemBox::with_config(&config, "constant").unwrap();
  /// assert_eq!(frozen.area(), Some(Area::Heap));
  /// assert_eq!(frozen.append("!"), Err(Error::ReadOnly));
  /// ```
  pub fn with_config<T: Text + ?Sized>(
    config: &Config,
    content: &T,
  ) -> Result<Self> {
    Self::alloc(config, content.text())
  }

  fn alloc(config: &Config, content: &[u8]) -> Result<Self> {
    let config = config.area(Area::Heap);
    let size = config.backing_size().ok_or(Error::OutOfRange)?;

    let mut buf = Vec::new();
    if let Err(e) = buf.try_reserve_exact(size) {
      log::debug!("could not reserve {size} bytes: {e}");
      return Err(e.into());
    }
    buf.resize(size, 0);

    Hem::init_bytes(&mut buf, &config, content)?;
    Ok(Self {
      buf: buf.into_boxed_slice(),
    })
  }

  /// Allocates a copy of `src`, with a capacity equal to its length.
  ///
  /// Fails with [`Error::InvalidArgument`] if `src` is empty.
  ///
  /// ```
  /// # use hemline::*;
  /// let original = HemBox::duplicate("copy me").unwrap();
  /// let mut copy = HemBox::duplicate(&original).unwrap();
  /// copy.truncate(4).unwrap();
  ///
  /// assert_eq!(original, "copy me");
  /// assert_eq!(copy, "copy");
  /// assert_eq!(copy.capacity(), 7);
  ///
  /// assert!(HemBox::duplicate("").is_err());
  /// ```
  pub fn duplicate<T: Text + ?Sized>(src: &T) -> Result<Self> {
    Self::duplicate_bytes(src.text())
  }

  pub(crate) fn duplicate_bytes(src: &[u8]) -> Result<Self> {
    if src.is_empty() {
      return Err(Error::InvalidArgument("nothing to duplicate"));
    }
    Self::alloc(&Config::new(src.len()), src)
  }

  /// Allocates a copy of at most the first `len` bytes of `src`, with a
  /// capacity equal to the length of the copy.
  ///
  /// ```
  /// # use hemline::*;
  /// let head = HemBox::duplicate_range("prefix", 3).unwrap();
  /// assert_eq!(head, "pre");
  /// assert_eq!(head.capacity(), 3);
  ///
  /// assert_eq!(HemBox::duplicate_range("ab", 10).unwrap().capacity(), 2);
  /// ```
  pub fn duplicate_range<T: Text + ?Sized>(src: &T, len: usize) -> Result<Self> {
    let src = src.text();
    Self::duplicate_bytes(&src[..src.len().min(len)])
  }

  /// Allocates a copy of `src` with a capacity of at least `min_capacity`.
  ///
  /// Fails with [`Error::InvalidArgument`] if both `src` and `min_capacity`
  /// are zero.
  ///
  /// ```
  /// # use hemline::*;
  /// let roomy = HemBox::duplicate_at_least("ab", 10).unwrap();
  /// assert_eq!(roomy, "ab");
  /// assert_eq!(roomy.capacity(), 10);
  ///
  /// let blank = HemBox::duplicate_at_least("", 4).unwrap();
  /// assert!(blank.is_empty());
  /// ```
  pub fn duplicate_at_least<T: Text + ?Sized>(
    src: &T,
    min_capacity: usize,
  ) -> Result<Self> {
    let src = src.text();
    let capacity = src.len().max(min_capacity);
    if capacity == 0 {
      return Err(Error::InvalidArgument("zero capacity requested"));
    }
    Self::alloc(&Config::new(capacity), src)
  }

  /// Finds the next token of `hay` and allocates a copy of it.
  ///
  /// `cursor` behaves as in [`search::next_token()`], but only advances if
  /// the copy is allocated. Fails with [`Error::NotFound`] if there are no
  /// more tokens.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut cursor = 0;
  /// let first = HemBox::next_token("alpha beta", " ", &mut cursor).unwrap();
  /// assert_eq!(first, "alpha");
  /// assert_eq!(cursor, 6);
  /// ```
  pub fn next_token<T, D>(hay: &T, delims: &D, cursor: &mut isize) -> Result<Self>
  where
    T: Text + ?Sized,
    D: Text + ?Sized,
  {
    let hay = hay.text();
    let mut next = *cursor;
    let range = search::next_token_in(hay, delims.text(), &mut next)
      .ok_or(Error::NotFound)?;
    let token = Self::duplicate_bytes(&hay[range])?;
    *cursor = next;
    Ok(token)
  }

  /// Takes ownership of a raw instance, as produced by
  /// [`HemBox::into_boxed_bytes()`] or received from elsewhere.
  ///
  /// The bytes are authenticated as in [`Hem::from_bytes()`]; any trailing
  /// bytes past the instance are dropped. The header is kept as is, so the
  /// adopted box reports the area and writability it was created with.
  pub fn from_boxed_bytes(bytes: Box<[u8]>) -> Result<Self> {
    let size = Hem::from_bytes(&bytes)?.as_raw_bytes().len();
    if size == bytes.len() {
      return Ok(Self { buf: bytes });
    }

    let mut bytes = bytes.into_vec();
    bytes.truncate(size);
    Ok(Self {
      buf: bytes.into_boxed_slice(),
    })
  }

  /// Converts this box into its raw backing bytes, header included.
  ///
  /// ```
  /// # use hemline::*;
  /// let hem = HemBox::duplicate("hi").unwrap();
  /// let raw = hem.into_boxed_bytes();
  /// assert_eq!(&*raw, [0b0010_0101, 2, 2, b'h', b'i', 0]);
  ///
  /// let back = HemBox::from_boxed_bytes(raw).unwrap();
  /// assert_eq!(back, "hi");
  /// ```
  pub fn into_boxed_bytes(self) -> Box<[u8]> {
    self.buf
  }

  /// Returns the instance this box owns.
  pub fn as_hem(&self) -> &Hem {
    Hem::from_raw(&self.buf)
  }

  /// Returns the instance this box owns, mutably.
  pub fn as_hem_mut(&mut self) -> &mut Hem {
    Hem::from_raw_mut(&mut self.buf)
  }
}

impl Deref for HemBox {
  type Target = Hem;
  fn deref(&self) -> &Hem {
    self.as_hem()
  }
}

impl DerefMut for HemBox {
  fn deref_mut(&mut self) -> &mut Hem {
    self.as_hem_mut()
  }
}

impl Clone for HemBox {
  fn clone(&self) -> Self {
    Self {
      buf: self.buf.clone(),
    }
  }
}

impl fmt::Debug for HemBox {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    fmt::Debug::fmt(self.as_hem(), f)
  }
}

impl fmt::Display for HemBox {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self.as_hem(), f)
  }
}

impl<T: Text + ?Sized> PartialEq<T> for HemBox {
  fn eq(&self, that: &T) -> bool {
    self.as_bytes() == that.text()
  }
}

impl Eq for HemBox {}

impl<T: Text + ?Sized> PartialOrd<T> for HemBox {
  fn partial_cmp(&self, that: &T) -> Option<Ordering> {
    Some(self.as_bytes().cmp(that.text()))
  }
}

impl Ord for HemBox {
  fn cmp(&self, that: &Self) -> Ordering {
    self.as_hem().cmp(that.as_hem())
  }
}

impl Hash for HemBox {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.as_hem().hash(state)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn heap_layout() {
    let hem = HemBox::with_capacity(300).unwrap();
    assert_eq!(hem.area(), Some(Area::Heap));
    assert_eq!(hem.width(), Some(crate::Width::U16));
    assert_eq!(hem.as_raw_bytes().len(), 1 + 4 + 300 + 1);
    assert_eq!(hem.ref_count(), None);
  }

  #[test]
  fn counted_config_stays_on_heap() {
    let config = Config::new(4).area(Area::Counted);
    let hem = HemBox::with_config(&config, "abc").unwrap();
    assert_eq!(hem.area(), Some(Area::Heap));
    assert_eq!(hem.ref_count(), None);
    assert_eq!(hem, "abc");
  }

  #[test]
  fn duplicates_are_independent() {
    let mut a = HemBox::duplicate("shared").unwrap();
    let b = a.clone();
    let c = HemBox::duplicate(&*a).unwrap();
    a.set_byte_at(0, b'S', b' ').unwrap();

    assert_eq!(a, "Shared");
    assert_eq!(b, "shared");
    assert_eq!(c, "shared");
    assert_eq!(b, c);
  }

  #[test]
  fn degenerate_requests() {
    assert!(matches!(
      HemBox::duplicate(""),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      HemBox::duplicate_range("abc", 0),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
      HemBox::duplicate_at_least("", 0),
      Err(Error::InvalidArgument(_))
    ));
  }

  #[test]
  fn allocation_failure() {
    let err = HemBox::with_capacity(usize::MAX / 2).unwrap_err();
    assert!(matches!(err, Error::Alloc(_)), "{err:?}");
    assert_eq!(
      HemBox::with_capacity(usize::MAX).unwrap_err(),
      Error::OutOfRange
    );
  }

  #[test]
  fn tokens_to_boxes() {
    let mut cursor = 0;
    let mut words = Vec::new();
    while let Ok(word) = HemBox::next_token("a,,bc,", ",", &mut cursor) {
      words.push(word);
    }
    assert_eq!(words.len(), 2);
    assert_eq!(words[0], "a");
    assert_eq!(words[1], "bc");
    assert_eq!(words[1].capacity(), 2);
  }

  #[test]
  fn interior_nul_survives_duplication() {
    let mut hem = HemBox::duplicate("a-c").unwrap();
    hem.set_byte_at(1, 0, b' ').unwrap();
    let copy = HemBox::duplicate(&hem).unwrap();
    assert_eq!(copy.as_bytes(), b"a\0c");
    assert_eq!(copy.as_c_str(), c"a");

    let mut cursor = 0;
    let token = HemBox::next_token(&hem, "-", &mut cursor).unwrap();
    assert_eq!(token.as_bytes(), b"a\0c");
  }

  #[test]
  fn raw_round_trip() {
    let hem = HemBox::duplicate_at_least("wire", 6).unwrap();
    let mut raw = hem.clone().into_boxed_bytes().into_vec();
    raw.extend_from_slice(b"junk");

    let back = HemBox::from_boxed_bytes(raw.into_boxed_slice()).unwrap();
    assert_eq!(back.as_raw_bytes(), hem.as_raw_bytes());
    assert!(HemBox::from_boxed_bytes(Box::new([0xff; 4])).is_err());
  }

  #[test]
  fn adopted_header_is_kept() {
    // Read-only, local area, one-byte counters.
    let raw = vec![0b0010_0010, 3, 2, b'o', b'k', 0, 0];
    let mut adopted = HemBox::try_from(raw).unwrap();
    assert_eq!(adopted.area(), Some(Area::Local));
    assert!(adopted.is_read_only());
    assert_eq!(adopted.append("!"), Err(Error::ReadOnly));

    let copy = HemBox::duplicate(&adopted).unwrap();
    assert_eq!(copy.area(), Some(Area::Heap));
    assert_eq!(copy, "ok");
  }
}

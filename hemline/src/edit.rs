//! Mutation primitives.
//!
//! Every mutation checks writability first and returns the resulting length.
//! Writes that don't fit are truncated to the capacity; a write that cannot
//! make any progress at all fails without touching the instance.

use crate::hem::resolve_index;
use crate::hem::Fields;
use crate::Error;
use crate::Hem;
use crate::Result;
use crate::Text;

#[cfg(doc)]
use crate::*;

impl Hem {
  /// Replaces the content with `src`, truncated to the capacity.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::with_capacity(4).unwrap();
  /// assert_eq!(hem.copy_from("hi"), Ok(2));
  /// assert_eq!(hem.copy_from("hello"), Ok(4));
  /// assert_eq!(hem, "hell");
  /// ```
  pub fn copy_from<T: Text + ?Sized>(&mut self, src: &T) -> Result<usize> {
    self.copy_from_n(src, usize::MAX)
  }

  /// Replaces the content with at most `limit` bytes of `src`.
  ///
  /// A `limit` of zero empties the instance.
  pub fn copy_from_n<T: Text + ?Sized>(
    &mut self,
    src: &T,
    limit: usize,
  ) -> Result<usize> {
    let src = src.text();
    self.copy_bytes(&src[..src.len().min(limit)])
  }

  /// Replaces the content with `src`, interior NULs included.
  pub(crate) fn copy_bytes(&mut self, src: &[u8]) -> Result<usize> {
    let f = self.writable_fields()?;
    let n = src.len().min(f.capacity);
    f.check_len(n)?;

    self.payload_mut(&f)[..n].copy_from_slice(&src[..n]);
    self.commit(&f, n)
  }

  /// Appends `src`, truncated to the remaining room.
  ///
  /// Fails with [`Error::OutOfRange`] if the instance is already full and
  /// `src` is not empty.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::with_capacity(5).unwrap();
  /// assert_eq!(hem.append("abc"), Ok(3));
  /// assert_eq!(hem.append("def"), Ok(5));
  /// assert_eq!(hem.append("g"), Err(Error::OutOfRange));
  /// assert_eq!(hem.append(""), Ok(5));
  /// ```
  pub fn append<T: Text + ?Sized>(&mut self, src: &T) -> Result<usize> {
    self.append_n(src, usize::MAX)
  }

  /// Appends at most `limit` bytes of `src`.
  pub fn append_n<T: Text + ?Sized>(
    &mut self,
    src: &T,
    limit: usize,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    let src = src.text();
    let src = &src[..src.len().min(limit)];
    self.append_bytes(f, src, f.capacity - f.len)
  }

  /// Appends bytes of `src` until the content is `total` bytes long, the
  /// source runs out, or the instance is full.
  ///
  /// If the content is already at least `total` bytes long, nothing happens.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate_at_least("ab", 10).unwrap();
  /// assert_eq!(hem.append_up_to("cdefg", 4), Ok(4));
  /// assert_eq!(hem, "abcd");
  /// assert_eq!(hem.append_up_to("xyz", 2), Ok(4));
  /// ```
  pub fn append_up_to<T: Text + ?Sized>(
    &mut self,
    src: &T,
    total: usize,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    if total <= f.len {
      return Ok(f.len);
    }
    self.append_bytes(f, src.text(), total.min(f.capacity) - f.len)
  }

  fn append_bytes(&mut self, f: Fields, src: &[u8], room: usize) -> Result<usize> {
    if room == 0 && !src.is_empty() {
      log::debug!("no room to append {} bytes", src.len());
      return Err(Error::OutOfRange);
    }

    let n = src.len().min(room);
    let len = f.len + n;
    f.check_len(len)?;

    self.payload_mut(&f)[f.len..len].copy_from_slice(&src[..n]);
    self.commit(&f, len)
  }

  /// Shortens the content to `len` bytes.
  ///
  /// Does nothing if the content is already no longer than `len`.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate("hello").unwrap();
  /// assert_eq!(hem.truncate(9), Ok(5));
  /// assert_eq!(hem.truncate(2), Ok(2));
  /// assert_eq!(hem.as_bytes_with_nul(), b"he\0");
  /// ```
  pub fn truncate(&mut self, len: usize) -> Result<usize> {
    let f = self.writable_fields()?;
    if len >= f.len {
      return Ok(f.len);
    }
    f.check_len(len)?;
    self.commit(&f, len)
  }

  /// Empties the instance.
  pub fn clear(&mut self) -> Result<usize> {
    self.truncate(0)
  }

  /// Overwrites the byte at `index`.
  ///
  /// A negative `index` counts back from the end of the content. A
  /// non-negative `index` may point anywhere below the capacity: writing past
  /// the end of the content extends it, and the gap between the old end and
  /// `index` is filled with `filler`.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate_at_least("ab", 8).unwrap();
  /// assert_eq!(hem.set_byte_at(-1, b'B', b'.'), Ok(2));
  /// assert_eq!(hem.set_byte_at(5, b'!', b'.'), Ok(6));
  /// assert_eq!(hem, "aB...!");
  ///
  /// assert_eq!(hem.set_byte_at(8, b'?', b'.'), Err(Error::OutOfRange));
  /// assert_eq!(hem.set_byte_at(-7, b'?', b'.'), Err(Error::OutOfRange));
  /// ```
  pub fn set_byte_at(
    &mut self,
    index: isize,
    byte: u8,
    filler: u8,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    let i = match usize::try_from(index) {
      Ok(i) if i < f.capacity => i,
      Ok(_) => return Err(Error::OutOfRange),
      Err(_) => resolve_index(index, f.len).ok_or(Error::OutOfRange)?,
    };

    let len = f.len.max(i + 1);
    f.check_len(len)?;

    let payload = self.payload_mut(&f);
    if i > f.len {
      payload[f.len..i].fill(filler);
    }
    payload[i] = byte;
    self.commit(&f, len)
  }

  /// Appends a single byte.
  ///
  /// Fails with [`Error::OutOfRange`], leaving the content unchanged, if the
  /// instance is full.
  pub fn push_byte(&mut self, byte: u8) -> Result<usize> {
    let f = self.writable_fields()?;
    if f.len >= f.capacity {
      log::debug!("no room to push a byte");
      return Err(Error::OutOfRange);
    }

    let len = f.len + 1;
    f.check_len(len)?;
    self.payload_mut(&f)[f.len] = byte;
    self.commit(&f, len)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::Config;
  use crate::HemBox;

  #[test]
  fn bounded_append() {
    let mut buf = [0; crate::backing_size(10)];
    let hem = Hem::init(&mut buf, &Config::new(10)).unwrap();
    hem.copy_from("abc").unwrap();

    assert_eq!(hem.append("defgh"), Ok(8));
    assert_eq!(hem, "abcdefgh");
    assert_eq!(hem.append("XYZ"), Ok(10));
    assert_eq!(hem, "abcdefghXY");
    assert_eq!(hem.append("Z"), Err(Error::OutOfRange));
    assert_eq!(hem.as_bytes_with_nul(), b"abcdefghXY\0");
  }

  #[test]
  fn copy_limits() {
    let mut hem = HemBox::with_capacity(6).unwrap();
    assert_eq!(hem.copy_from_n("abcdef", 3), Ok(3));
    assert_eq!(hem, "abc");
    assert_eq!(hem.copy_from("z"), Ok(1));
    assert_eq!(hem.as_bytes_with_nul(), b"z\0");
    assert_eq!(hem.copy_from(""), Ok(0));
    assert!(hem.is_empty());

    hem.copy_from("full").unwrap();
    assert_eq!(hem.copy_from_n("xyz", 0), Ok(0));
    assert_eq!(hem, "");
  }

  #[test]
  fn copy_from_self_content() {
    let src = HemBox::duplicate("abcdef").unwrap();
    let mut dst = HemBox::with_capacity(4).unwrap();
    assert_eq!(dst.copy_from(&src), Ok(4));
    assert_eq!(dst.append(&*src), Err(Error::OutOfRange));
    assert_eq!(dst, "abcd");
  }

  #[test]
  fn append_n_and_up_to() {
    let mut hem = HemBox::with_capacity(6).unwrap();
    assert_eq!(hem.append_n("abcdef", 2), Ok(2));
    assert_eq!(hem.append_n("cdef", 0), Ok(2));
    assert_eq!(hem.append_up_to("cdefgh", 3), Ok(3));
    assert_eq!(hem, "abc");
    assert_eq!(hem.append_up_to("xyz", 100), Ok(6));
    assert_eq!(hem, "abcxyz");
    assert_eq!(hem.append_up_to("!", 100), Err(Error::OutOfRange));
    assert_eq!(hem.append_up_to("!", 6), Ok(6));
  }

  #[test]
  fn plain_sources_stop_at_nul() {
    let mut hem = HemBox::with_capacity(8).unwrap();
    assert_eq!(hem.append("ab\0cd"), Ok(2));
    assert_eq!(hem.append(&b"c\0"[..]), Ok(3));
    assert_eq!(hem, "abc");
  }

  #[test]
  fn read_only_is_untouched() {
    let config = Config::new(8).read_only();
    let mut buf = vec![0; config.backing_size().unwrap()];
    let hem = Hem::init_with(&mut buf, &config, "frozen").unwrap();
    let before = hem.as_raw_bytes().to_vec();

    assert_eq!(hem.copy_from("x"), Err(Error::ReadOnly));
    assert_eq!(hem.append("x"), Err(Error::ReadOnly));
    assert_eq!(hem.truncate(0), Err(Error::ReadOnly));
    assert_eq!(hem.set_byte_at(0, b'x', b' '), Err(Error::ReadOnly));
    assert_eq!(hem.push_byte(b'x'), Err(Error::ReadOnly));
    assert_eq!(hem.as_mut_bytes(), None);
    assert_eq!(hem.as_raw_bytes(), before);
  }

  #[test]
  fn truncate_and_clear() {
    let mut hem = HemBox::duplicate("hello").unwrap();
    assert_eq!(hem.truncate(5), Ok(5));
    assert_eq!(hem.truncate(3), Ok(3));
    assert_eq!(hem, "hel");
    assert_eq!(hem.clear(), Ok(0));
    assert_eq!(hem.as_bytes_with_nul(), b"\0");
    assert_eq!(hem.capacity(), 5);
  }

  #[test]
  fn set_byte_gap_fill() {
    let mut hem = HemBox::with_capacity(6).unwrap();
    assert_eq!(hem.set_byte_at(3, b'x', b'-'), Ok(4));
    assert_eq!(hem, "---x");
    assert_eq!(hem.set_byte_at(-4, b'a', b'-'), Ok(4));
    assert_eq!(hem.set_byte_at(4, b'y', b'-'), Ok(5));
    assert_eq!(hem, "a--xy");
    assert_eq!(hem.set_byte_at(5, b'z', b'-'), Ok(6));
    assert_eq!(hem.set_byte_at(6, b'!', b'-'), Err(Error::OutOfRange));
    assert_eq!(hem.set_byte_at(-7, b'!', b'-'), Err(Error::OutOfRange));
    assert_eq!(hem.as_bytes_with_nul(), b"a--xyz\0");
  }

  #[test]
  fn push_until_full() {
    let mut hem = HemBox::with_capacity(2).unwrap();
    assert_eq!(hem.push_byte(b'o'), Ok(1));
    assert_eq!(hem.push_byte(b'k'), Ok(2));
    assert_eq!(hem.push_byte(b'!'), Err(Error::OutOfRange));
    assert_eq!(hem, "ok");
  }

  #[test]
  fn capacity_only_keeps_length() {
    let mut bytes = [0b0000_0001, 3, b'a', b'b', b'c', 0];
    let hem = Hem::from_bytes_mut(&mut bytes).unwrap();

    assert_eq!(hem.truncate(1), Err(Error::FixedLength));
    assert_eq!(hem.copy_from("xy"), Err(Error::FixedLength));
    assert_eq!(hem.append("d"), Err(Error::OutOfRange));
    assert_eq!(hem.set_byte_at(-1, b'C', b' '), Ok(3));
    assert_eq!(hem.copy_from("xyz"), Ok(3));
    assert_eq!(bytes, [0b0000_0001, 3, b'x', b'y', b'z', 0]);
  }
}

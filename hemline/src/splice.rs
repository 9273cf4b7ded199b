//! Extraction and insertion primitives.
//!
//! Ranges select bytes of a source text. Negative positions count back from
//! the end of the text they index into; positions before its start clamp to
//! zero, except for an insertion point, where the excess instead skips that
//! many bytes from the front of the source.

use std::ops::Range;

use crate::hem::Fields;
use crate::Error;
use crate::Hem;
use crate::HemBox;
use crate::Result;
use crate::Text;

/// Resolves a position into a text of length `len`, clamping positions
/// before its start to zero.
fn clamp(pos: isize, len: usize) -> usize {
  match usize::try_from(pos) {
    Ok(pos) => pos,
    Err(_) => len.saturating_sub(pos.unsigned_abs()),
  }
}

/// Resolves an insertion point into content of length `len`, returning the
/// point and the number of source bytes to skip.
fn split(pos: isize, len: usize) -> (usize, usize) {
  match usize::try_from(pos) {
    Ok(pos) => (pos, 0),
    Err(_) => {
      let back = pos.unsigned_abs();
      match back.checked_sub(len) {
        Some(skip) => (0, skip),
        None => (len - back, 0),
      }
    }
  }
}

/// Selects the inclusive range `start..=end` of a text of length `len`,
/// clamping `end` to its last byte.
fn inclusive(len: usize, start: isize, end: isize) -> Option<Range<usize>> {
  let start = clamp(start, len);
  let end = clamp(end, len);
  if start >= len || start > end {
    return None;
  }
  Some(start..end.min(len - 1) + 1)
}

/// Selects up to `count` bytes of a text of length `len` from `start` on.
fn counted(len: usize, start: isize, count: usize) -> Option<Range<usize>> {
  let start = clamp(start, len);
  if count == 0 || start >= len {
    return None;
  }
  Some(start..start + count.min(len - start))
}

impl HemBox {
  /// Allocates a copy of the bytes of `src` from `start` to `end`,
  /// inclusive, with a capacity equal to their number.
  ///
  /// Negative positions count back from the end of `src`; an `end` past the
  /// last byte is clamped to it. Fails with [`Error::OutOfRange`] if the
  /// range selects nothing.
  ///
  /// ```
  /// # use hemline::*;
  /// let ell = HemBox::extract("hello", 1, 3).unwrap();
  /// assert_eq!(ell, "ell");
  /// assert_eq!(ell.capacity(), 3);
  ///
  /// assert_eq!(HemBox::extract("hello", -2, 99).unwrap(), "lo");
  /// assert_eq!(HemBox::extract("hello", 3, 1), Err(Error::OutOfRange));
  /// ```
  pub fn extract<T: Text + ?Sized>(
    src: &T,
    start: isize,
    end: isize,
  ) -> Result<Self> {
    let src = src.text();
    let range = inclusive(src.len(), start, end).ok_or(Error::OutOfRange)?;
    Self::duplicate_bytes(&src[range])
  }

  /// Allocates a copy of at most `len` bytes of `src`, from `start` on.
  ///
  /// ```
  /// # use hemline::*;
  /// assert_eq!(HemBox::extract_len("hello", -3, 2).unwrap(), "ll");
  /// assert_eq!(HemBox::extract_len("hello", 1, 99).unwrap(), "ello");
  /// assert_eq!(HemBox::extract_len("hello", 1, 0), Err(Error::OutOfRange));
  /// ```
  pub fn extract_len<T: Text + ?Sized>(
    src: &T,
    start: isize,
    len: usize,
  ) -> Result<Self> {
    let src = src.text();
    let range = counted(src.len(), start, len).ok_or(Error::OutOfRange)?;
    Self::duplicate_bytes(&src[range])
  }
}

impl Hem {
  /// Replaces the content with the bytes of `src` from `start` to `end`,
  /// inclusive, truncated to the capacity.
  ///
  /// Range resolution is as in [`HemBox::extract()`]. If the range selects
  /// nothing, the instance is emptied.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::with_capacity(3).unwrap();
  /// assert_eq!(hem.extract_from("a quick fox", 2, 6), Ok(3));
  /// assert_eq!(hem, "qui");
  /// assert_eq!(hem.extract_from("a quick fox", 6, 2), Ok(0));
  /// assert!(hem.is_empty());
  /// ```
  pub fn extract_from<T: Text + ?Sized>(
    &mut self,
    src: &T,
    start: isize,
    end: isize,
  ) -> Result<usize> {
    let src = src.text();
    match inclusive(src.len(), start, end) {
      Some(range) => self.copy_bytes(&src[range]),
      None => self.copy_bytes(b""),
    }
  }

  /// Replaces the content with at most `len` bytes of `src`, from `start`
  /// on, truncated to the capacity.
  ///
  /// If the range selects nothing, the instance is emptied.
  pub fn extract_len_from<T: Text + ?Sized>(
    &mut self,
    src: &T,
    start: isize,
    len: usize,
  ) -> Result<usize> {
    let src = src.text();
    match counted(src.len(), start, len) {
      Some(range) => self.copy_bytes(&src[range]),
      None => self.copy_bytes(b""),
    }
  }

  /// Writes bytes of `src` over positions `start` to `end`, inclusive, and
  /// returns the number of bytes written.
  ///
  /// * A non-negative `start` may lie anywhere below the capacity. If it is
  ///   past the end of the content, the gap is filled with `filler`.
  /// * A negative `start` counts back from the end of the content. If it
  ///   reaches back further than the content does, writing starts at zero and
  ///   the excess is skipped from the front of `src` instead.
  /// * `end` is clamped to the last byte of the capacity; a negative `end`
  ///   counts back from the end of the content.
  ///
  /// Writing stops at `end` or when `src` runs out. The content grows if the
  /// write extends past its end and never shrinks.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate_at_least("ab", 8).unwrap();
  /// assert_eq!(hem.insert("XYZ", 4, 5, b'.'), Ok(2));
  /// assert_eq!(hem, "ab..XY");
  ///
  /// // Two positions before the start: skip the first two source bytes.
  /// assert_eq!(hem.insert("1234", -8, 99, b'.'), Ok(2));
  /// assert_eq!(hem, "34..XY");
  /// ```
  pub fn insert<T: Text + ?Sized>(
    &mut self,
    src: &T,
    start: isize,
    end: isize,
    filler: u8,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    let src = src.text();

    if end < 0 && end.unsigned_abs() > f.len {
      return Err(Error::OutOfRange);
    }
    let (start, skip) = split(start, f.len);
    if start >= f.capacity {
      return Err(Error::OutOfRange);
    }
    let end = match usize::try_from(end) {
      Ok(end) => end.min(f.capacity - 1),
      Err(_) => f.len - end.unsigned_abs(),
    };
    if start > end || skip >= src.len() {
      return Err(Error::OutOfRange);
    }

    let n = (end - start + 1).min(src.len() - skip);
    self.write_at(f, start, &src[skip..skip + n], filler)
  }

  /// Writes at most `len` bytes of `src` at `start`, and returns the number
  /// of bytes written.
  ///
  /// `start` is resolved as in [`Hem::insert()`]; writing stops after `len`
  /// bytes, at the capacity, or when `src` runs out.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate_at_least("abc", 8).unwrap();
  /// assert_eq!(hem.insert_len("xyz", 6, 10, b'-'), Ok(2));
  /// assert_eq!(hem, "abc---xy");
  /// ```
  pub fn insert_len<T: Text + ?Sized>(
    &mut self,
    src: &T,
    start: isize,
    len: usize,
    filler: u8,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    let src = src.text();

    let (start, skip) = split(start, f.len);
    if start >= f.capacity || len == 0 || skip >= src.len() {
      return Err(Error::OutOfRange);
    }

    let n = len.min(f.capacity - start).min(src.len() - skip);
    self.write_at(f, start, &src[skip..skip + n], filler)
  }

  /// Copies at most `len` bytes of `src`, starting at `src_start`, to
  /// `dst_start` in this instance, and returns the number of bytes written.
  ///
  /// `src_start` is resolved against `src`, clamping to zero. `dst_start` is
  /// resolved as the start of [`Hem::insert()`]: reaching back past the
  /// start of the content skips the excess from the source as well. The
  /// count is clamped to what both sides can supply.
  ///
  /// ```
  /// # use hemline::*;
  /// let mut hem = HemBox::duplicate_at_least("hi", 10).unwrap();
  /// assert_eq!(hem.splice(7, "abc", -2, 5, b'*'), Ok(2));
  /// assert_eq!(hem, "hi*****bc");
  /// ```
  pub fn splice<T: Text + ?Sized>(
    &mut self,
    dst_start: isize,
    src: &T,
    src_start: isize,
    len: usize,
    filler: u8,
  ) -> Result<usize> {
    let f = self.writable_fields()?;
    let src = src.text();

    let (dst_start, skip) = split(dst_start, f.len);
    let src_start = clamp(src_start, src.len()).saturating_add(skip);
    if dst_start >= f.capacity || src_start >= src.len() || len == 0 {
      return Err(Error::OutOfRange);
    }

    let n = len
      .min(f.capacity - dst_start)
      .min(src.len() - src_start);
    self.write_at(f, dst_start, &src[src_start..src_start + n], filler)
  }

  /// Writes `bytes` at `at`, filling any gap after the current content with
  /// `filler`. The caller has checked that the write fits the capacity.
  fn write_at(
    &mut self,
    f: Fields,
    at: usize,
    bytes: &[u8],
    filler: u8,
  ) -> Result<usize> {
    let len = f.len.max(at + bytes.len());
    f.check_len(len)?;

    let payload = self.payload_mut(&f);
    if at > f.len {
      payload[f.len..at].fill(filler);
    }
    payload[at..at + bytes.len()].copy_from_slice(bytes);
    self.commit(&f, len)?;
    Ok(bytes.len())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn hem(content: &str, capacity: usize) -> HemBox {
    HemBox::duplicate_at_least(content, capacity).unwrap()
  }

  #[test]
  fn extract_ranges() {
    let ell = HemBox::extract("hello", 1, 3).unwrap();
    assert_eq!(ell, "ell");
    assert_eq!(ell.len(), 3);

    assert_eq!(HemBox::extract("hello", -9, 0).unwrap(), "h");
    assert_eq!(HemBox::extract("hello", 0, -1).unwrap(), "hello");
    assert_eq!(HemBox::extract("hello", 4, 4).unwrap(), "o");
    assert_eq!(HemBox::extract("hello", 5, 9), Err(Error::OutOfRange));
    assert_eq!(HemBox::extract("hello", 0, -9).unwrap(), "h");
    assert_eq!(HemBox::extract("", 0, 0), Err(Error::OutOfRange));

    assert_eq!(HemBox::extract_len("hello", -9, 2).unwrap(), "he");
    assert_eq!(HemBox::extract_len("hello", 5, 1), Err(Error::OutOfRange));
  }

  #[test]
  fn extract_into_truncates() {
    let mut dst = hem("", 4);
    assert_eq!(dst.extract_from("abcdefgh", 2, -1), Ok(4));
    assert_eq!(dst, "cdef");
    assert_eq!(dst.extract_len_from("abcdefgh", -3, 2), Ok(2));
    assert_eq!(dst, "fg");
    assert_eq!(dst.extract_len_from("abcdefgh", 8, 2), Ok(0));
    assert_eq!(dst, "");
  }

  #[test]
  fn insert_overwrites_in_place() {
    let mut dst = hem("hello", 10);
    assert_eq!(dst.insert("abc", -2, -1, b'_'), Ok(2));
    assert_eq!(dst, "helab");
    assert_eq!(dst.insert("J", 0, 0, b'_'), Ok(1));
    assert_eq!(dst, "Jelab");
  }

  #[test]
  fn insert_fills_gap() {
    let mut dst = hem("ab", 8);
    assert_eq!(dst.insert("XY", 4, 5, b'.'), Ok(2));
    assert_eq!(dst.as_bytes_with_nul(), b"ab..XY\0");

    // The end is clamped to the capacity.
    assert_eq!(dst.insert("0123456789", 7, 100, b'.'), Ok(1));
    assert_eq!(dst, "ab..XY.0");
  }

  #[test]
  fn insert_negative_start_skips_source() {
    let mut dst = hem("hello", 10);
    assert_eq!(dst.insert("12345", -7, 10, b'_'), Ok(3));
    assert_eq!(dst, "345lo");

    // Skipping the whole source leaves nothing to write.
    assert_eq!(dst.insert("12", -7, 10, b'_'), Err(Error::OutOfRange));
    assert_eq!(dst, "345lo");
  }

  #[test]
  fn insert_rejects_bad_windows() {
    let mut dst = hem("hello", 6);
    assert_eq!(dst.insert("x", 6, 6, b' '), Err(Error::OutOfRange));
    assert_eq!(dst.insert("x", 0, -6, b' '), Err(Error::OutOfRange));
    assert_eq!(dst.insert("x", 3, 2, b' '), Err(Error::OutOfRange));
    assert_eq!(dst.insert("", 0, 1, b' '), Err(Error::OutOfRange));
    assert_eq!(dst, "hello");

    let mut empty = HemBox::with_capacity(0).unwrap();
    assert_eq!(empty.insert("x", 0, 0, b' '), Err(Error::OutOfRange));
  }

  #[test]
  fn insert_len_bounds() {
    let mut dst = hem("abc", 8);
    assert_eq!(dst.insert_len("xyz", 6, 10, b'-'), Ok(2));
    assert_eq!(dst.as_bytes_with_nul(), b"abc---xy\0");

    let mut dst = hem("abc", 8);
    assert_eq!(dst.insert_len("xyz", -5, 10, b'-'), Ok(1));
    assert_eq!(dst, "zbc");
    assert_eq!(dst.insert_len("xyz", 1, 0, b'-'), Err(Error::OutOfRange));
    assert_eq!(dst.insert_len("xyz", 8, 1, b'-'), Err(Error::OutOfRange));
  }

  #[test]
  fn splice_clamps_both_sides() {
    let mut dst = hem("hello", 10);
    assert_eq!(dst.splice(-7, "0123456789", 1, 4, b'.'), Ok(4));
    assert_eq!(dst, "3456o");

    let mut dst = hem("hi", 10);
    assert_eq!(dst.splice(7, "abc", -2, 5, b'*'), Ok(2));
    assert_eq!(dst.as_bytes_with_nul(), b"hi*****bc\0");
    assert_eq!(dst.splice(9, "abc", 0, 5, b'*'), Ok(1));
    assert_eq!(dst, "hi*****bca");
    assert_eq!(dst.splice(10, "abc", 0, 5, b'*'), Err(Error::OutOfRange));
    assert_eq!(dst.splice(0, "abc", 3, 5, b'*'), Err(Error::OutOfRange));
  }

  #[test]
  fn read_only_destinations() {
    let mut dst =
      HemBox::with_config(&crate::Config::new(4).read_only(), "ro").unwrap();
    assert_eq!(dst.extract_from("abc", 0, 1), Err(Error::ReadOnly));
    assert_eq!(dst.insert("abc", 0, 1, b' '), Err(Error::ReadOnly));
    assert_eq!(dst.insert_len("abc", 0, 1, b' '), Err(Error::ReadOnly));
    assert_eq!(dst.splice(0, "abc", 0, 1, b' '), Err(Error::ReadOnly));
    assert_eq!(dst, "ro");
  }
}

//! Search, span, comparison and tokenization primitives.
//!
//! The functions in this module work on any [`Text`], so they apply equally
//! to instances and to plain strings; [`Hem`] has method versions of the
//! searches that take the instance as the haystack.
//!
//! Start positions are `isize`: a negative start counts back from the end of
//! the haystack. A start outside the haystack finds nothing.
//!
//! Case-insensitive variants fold ASCII letters only.

use std::cmp::Ordering;
use std::ops::Range;

use crate::hem::resolve_index;
use crate::Error;
use crate::Hem;
use crate::Result;
use crate::Text;

/// Finds the first occurrence of `byte` at or after `start`.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::find_byte("banana", b'a', 0), Some(1));
/// assert_eq!(search::find_byte("banana", b'a', 2), Some(3));
/// assert_eq!(search::find_byte("banana", b'a', -1), Some(5));
/// assert_eq!(search::find_byte("banana", b'x', 0), None);
/// assert_eq!(search::find_byte("banana", b'a', 6), None);
/// ```
pub fn find_byte<T: Text + ?Sized>(
  hay: &T,
  byte: u8,
  start: isize,
) -> Option<usize> {
  find_byte_by(hay.text(), start, |b| b == byte)
}

/// Like [`find_byte()`], but ignores ASCII case.
pub fn find_byte_ignore_case<T: Text + ?Sized>(
  hay: &T,
  byte: u8,
  start: isize,
) -> Option<usize> {
  find_byte_by(hay.text(), start, |b| b.eq_ignore_ascii_case(&byte))
}

/// Finds the last occurrence of `byte` at or before `start`.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::rfind_byte("banana", b'n', -1), Some(4));
/// assert_eq!(search::rfind_byte("banana", b'n', 3), Some(2));
/// assert_eq!(search::rfind_byte("banana", b'b', 0), Some(0));
/// assert_eq!(search::rfind_byte("banana", b'n', 1), None);
/// ```
pub fn rfind_byte<T: Text + ?Sized>(
  hay: &T,
  byte: u8,
  start: isize,
) -> Option<usize> {
  rfind_byte_by(hay.text(), start, |b| b == byte)
}

/// Like [`rfind_byte()`], but ignores ASCII case.
pub fn rfind_byte_ignore_case<T: Text + ?Sized>(
  hay: &T,
  byte: u8,
  start: isize,
) -> Option<usize> {
  rfind_byte_by(hay.text(), start, |b| b.eq_ignore_ascii_case(&byte))
}

fn find_byte_by(
  hay: &[u8],
  start: isize,
  mut pred: impl FnMut(u8) -> bool,
) -> Option<usize> {
  let start = resolve_index(start, hay.len())?;
  hay[start..].iter().position(|&b| pred(b)).map(|i| i + start)
}

fn rfind_byte_by(
  hay: &[u8],
  start: isize,
  mut pred: impl FnMut(u8) -> bool,
) -> Option<usize> {
  let start = resolve_index(start, hay.len())?;
  hay[..=start].iter().rposition(|&b| pred(b))
}

/// Finds the first occurrence of `needle` that starts at or after `start`.
///
/// An empty needle, or one longer than the haystack, is never found. A
/// `start` from which the needle could not fit finds nothing.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::find("hello world", "world", 0), Some(6));
/// assert_eq!(search::find("hello world", "xyz", 0), None);
/// assert_eq!(search::find("hello world", "o", -4), Some(7));
///
/// // "world" cannot start in the last four bytes.
/// assert_eq!(search::find("hello world", "world", -4), None);
/// ```
pub fn find<T, N>(hay: &T, needle: &N, start: isize) -> Option<usize>
where
  T: Text + ?Sized,
  N: Text + ?Sized,
{
  find_by(hay.text(), needle.text(), start, |a, b| a == b)
}

/// Like [`find()`], but ignores ASCII case.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::find_ignore_case("Hello", "HELLO", 0), Some(0));
/// assert_eq!(search::find_ignore_case("HELLO", "hello", 0), Some(0));
/// assert_eq!(search::find_ignore_case("say HeLLo", "hello", 0), Some(4));
/// ```
pub fn find_ignore_case<T, N>(hay: &T, needle: &N, start: isize) -> Option<usize>
where
  T: Text + ?Sized,
  N: Text + ?Sized,
{
  find_by(hay.text(), needle.text(), start, <[u8]>::eq_ignore_ascii_case)
}

fn find_by(
  hay: &[u8],
  needle: &[u8],
  start: isize,
  mut eq: impl FnMut(&[u8], &[u8]) -> bool,
) -> Option<usize> {
  if needle.is_empty() || needle.len() > hay.len() {
    return None;
  }

  // The needle must fit between the start and the end of the haystack.
  let start = if start >= 0 {
    let start = start as usize;
    if start > hay.len() - needle.len() {
      return None;
    }
    start
  } else if start <= -(needle.len() as isize) {
    resolve_index(start, hay.len())?
  } else {
    return None;
  };

  hay[start..]
    .windows(needle.len())
    .position(|window| eq(window, needle))
    .map(|i| i + start)
}

/// Finds the first byte at or after `start` that appears in `set`.
///
/// An empty `set` matches nothing.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::find_any("key = value", "=:", 0), Some(4));
/// assert_eq!(search::find_any("key = value", "=:", 5), None);
/// assert_eq!(search::find_any("key = value", "", 0), None);
/// ```
pub fn find_any<T, S>(hay: &T, set: &S, start: isize) -> Option<usize>
where
  T: Text + ?Sized,
  S: Text + ?Sized,
{
  let set = set.text();
  if set.is_empty() {
    return None;
  }
  find_byte_by(hay.text(), start, |b| set.contains(&b))
}

/// Counts the bytes, from `start` on, that all appear in `set`.
///
/// Returns `None` if the haystack or `set` is empty, or if `start` is
/// outside the haystack.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::span("  \tindent", " \t", 0), Some(3));
/// assert_eq!(search::span("  \tindent", " \t", 3), Some(0));
/// assert_eq!(search::span("   ", " ", -2), Some(2));
/// ```
pub fn span<T, S>(hay: &T, set: &S, start: isize) -> Option<usize>
where
  T: Text + ?Sized,
  S: Text + ?Sized,
{
  span_by(hay.text(), set.text(), start, true)
}

/// Counts the bytes, from `start` on, that do not appear in `set`.
///
/// Returns `None` if the haystack or `set` is empty, or if `start` is
/// outside the haystack.
///
/// ```
/// # use hemline::search;
/// assert_eq!(search::complement_span("path/to/file", "/", 0), Some(4));
/// assert_eq!(search::complement_span("path/to/file", "/", 8), Some(4));
/// ```
pub fn complement_span<T, S>(hay: &T, set: &S, start: isize) -> Option<usize>
where
  T: Text + ?Sized,
  S: Text + ?Sized,
{
  span_by(hay.text(), set.text(), start, false)
}

fn span_by(hay: &[u8], set: &[u8], start: isize, inside: bool) -> Option<usize> {
  if set.is_empty() {
    return None;
  }

  let start = resolve_index(start, hay.len())?;
  let rest = &hay[start..];
  let n = rest
    .iter()
    .position(|b| set.contains(b) != inside)
    .unwrap_or(rest.len());
  Some(n)
}

/// Compares two texts byte by byte.
///
/// A text that is a prefix of the other compares less.
///
/// ```
/// # use hemline::*;
/// # use std::cmp::Ordering;
/// let hem = HemBox::duplicate("abc").unwrap();
/// assert_eq!(search::compare(&hem, "abd"), Ordering::Less);
/// assert_eq!(search::compare("abcd", &hem), Ordering::Greater);
/// assert_eq!(search::compare(&hem, "abc"), Ordering::Equal);
/// ```
pub fn compare<A, B>(a: &A, b: &B) -> Ordering
where
  A: Text + ?Sized,
  B: Text + ?Sized,
{
  a.text().cmp(b.text())
}

/// Like [`compare()`], but ignores ASCII case.
pub fn compare_ignore_case<A, B>(a: &A, b: &B) -> Ordering
where
  A: Text + ?Sized,
  B: Text + ?Sized,
{
  fold(a.text()).cmp(fold(b.text()))
}

/// Compares at most the first `n` bytes of two texts.
///
/// ```
/// # use hemline::search;
/// # use std::cmp::Ordering;
/// assert_eq!(search::compare_n("prefix-a", "prefix-b", 6), Ordering::Equal);
/// assert_eq!(search::compare_n("prefix-a", "prefix-b", 8), Ordering::Less);
/// assert_eq!(search::compare_n("pre", "prefix", 5), Ordering::Less);
/// ```
pub fn compare_n<A, B>(a: &A, b: &B, n: usize) -> Ordering
where
  A: Text + ?Sized,
  B: Text + ?Sized,
{
  prefix(a.text(), n).cmp(prefix(b.text(), n))
}

/// Like [`compare_n()`], but ignores ASCII case.
pub fn compare_n_ignore_case<A, B>(a: &A, b: &B, n: usize) -> Ordering
where
  A: Text + ?Sized,
  B: Text + ?Sized,
{
  fold(prefix(a.text(), n)).cmp(fold(prefix(b.text(), n)))
}

fn prefix(bytes: &[u8], n: usize) -> &[u8] {
  &bytes[..bytes.len().min(n)]
}

fn fold(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
  bytes.iter().map(u8::to_ascii_uppercase)
}

/// Finds the next token of `hay`, starting at `*cursor`.
///
/// Tokens are maximal runs of bytes that do not appear in `delims`. Leading
/// delimiters are skipped. On success, `*cursor` is moved past the token and
/// past any delimiters that follow it, ready for the next call; once the
/// haystack is exhausted, `*cursor` is left at its length and `None` is
/// returned. A negative cursor counts back from the end and is normalized in
/// place.
///
/// ```
/// # use hemline::search;
/// let mut cursor = 0;
/// assert_eq!(search::next_token("a,,b", ",", &mut cursor), Some(0..1));
/// assert_eq!(cursor, 3);
/// assert_eq!(search::next_token("a,,b", ",", &mut cursor), Some(3..4));
/// assert_eq!(search::next_token("a,,b", ",", &mut cursor), None);
/// ```
pub fn next_token<T, D>(
  hay: &T,
  delims: &D,
  cursor: &mut isize,
) -> Option<Range<usize>>
where
  T: Text + ?Sized,
  D: Text + ?Sized,
{
  next_token_in(hay.text(), delims.text(), cursor)
}

pub(crate) fn next_token_in(
  hay: &[u8],
  delims: &[u8],
  cursor: &mut isize,
) -> Option<Range<usize>> {
  if delims.is_empty() {
    return None;
  }

  let at = resolve_index(*cursor, hay.len())?;
  let is_delim = |b: &u8| delims.contains(b);
  let skip = |from: usize| {
    hay[from..]
      .iter()
      .position(|b| !is_delim(b))
      .map_or(hay.len(), |i| i + from)
  };

  let start = skip(at);
  if start == hay.len() {
    *cursor = hay.len() as isize;
    return None;
  }

  let end = hay[start..]
    .iter()
    .position(is_delim)
    .map_or(hay.len(), |i| i + start);
  *cursor = skip(end) as isize;
  Some(start..end)
}

/// Returns an iterator over the tokens of `hay`.
///
/// ```
/// # use hemline::search;
/// let words: Vec<_> = search::tokens(" one  two three ", " ").collect();
/// assert_eq!(words, [&b"one"[..], b"two", b"three"]);
/// ```
pub fn tokens<'a, T, D>(hay: &'a T, delims: &'a D) -> Tokens<'a>
where
  T: Text + ?Sized,
  D: Text + ?Sized,
{
  Tokens {
    hay: hay.text(),
    delims: delims.text(),
    cursor: 0,
  }
}

/// An iterator over the tokens of some text.
///
/// Created by [`tokens()`] or [`Hem::tokens()`].
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
  hay: &'a [u8],
  delims: &'a [u8],
  cursor: isize,
}

impl Tokens<'_> {
  /// Returns the position the next token will be searched from.
  pub fn cursor(&self) -> usize {
    self.cursor as usize
  }
}

impl<'a> Iterator for Tokens<'a> {
  type Item = &'a [u8];

  fn next(&mut self) -> Option<Self::Item> {
    let range = next_token_in(self.hay, self.delims, &mut self.cursor)?;
    Some(&self.hay[range])
  }
}

impl Hem {
  /// Finds the first occurrence of `byte`; see [`find_byte()`].
  pub fn find_byte(&self, byte: u8, start: isize) -> Option<usize> {
    find_byte(self, byte, start)
  }

  /// Finds the last occurrence of `byte`; see [`rfind_byte()`].
  pub fn rfind_byte(&self, byte: u8, start: isize) -> Option<usize> {
    rfind_byte(self, byte, start)
  }

  /// Finds the first occurrence of `byte`, ignoring ASCII case.
  pub fn find_byte_ignore_case(&self, byte: u8, start: isize) -> Option<usize> {
    find_byte_ignore_case(self, byte, start)
  }

  /// Finds the last occurrence of `byte`, ignoring ASCII case.
  pub fn rfind_byte_ignore_case(&self, byte: u8, start: isize) -> Option<usize> {
    rfind_byte_ignore_case(self, byte, start)
  }

  /// Finds `needle` in this instance; see [`find()`].
  ///
  /// ```
  /// # use hemline::*;
  /// let hem = HemBox::duplicate("hello world").unwrap();
  /// assert_eq!(hem.find("world", 0), Some(6));
  /// assert_eq!(hem.find("xyz", 0), None);
  /// ```
  pub fn find<N: Text + ?Sized>(&self, needle: &N, start: isize) -> Option<usize> {
    find(self, needle, start)
  }

  /// Finds `needle` in this instance, ignoring ASCII case.
  pub fn find_ignore_case<N: Text + ?Sized>(
    &self,
    needle: &N,
    start: isize,
  ) -> Option<usize> {
    find_ignore_case(self, needle, start)
  }

  /// Finds the first byte that appears in `set`; see [`find_any()`].
  pub fn find_any<S: Text + ?Sized>(&self, set: &S, start: isize) -> Option<usize> {
    find_any(self, set, start)
  }

  /// Counts the leading bytes in `set`; see [`span()`].
  pub fn span<S: Text + ?Sized>(&self, set: &S, start: isize) -> Option<usize> {
    span(self, set, start)
  }

  /// Counts the leading bytes not in `set`; see [`complement_span()`].
  pub fn complement_span<S: Text + ?Sized>(
    &self,
    set: &S,
    start: isize,
  ) -> Option<usize> {
    complement_span(self, set, start)
  }

  /// Finds the next token; see [`next_token()`].
  pub fn next_token<D: Text + ?Sized>(
    &self,
    delims: &D,
    cursor: &mut isize,
  ) -> Option<Range<usize>> {
    next_token(self, delims, cursor)
  }

  /// Finds the next token and copies it into `dst`, truncated to fit.
  ///
  /// Returns the token's range within this instance; `dst` receives as much
  /// of it as its capacity allows. Fails with [`Error::NotFound`] if there
  /// are no more tokens. On any failure, neither `cursor` nor `dst` changes,
  /// so the call can be retried with another destination.
  ///
  /// ```
  /// # use hemline::*;
  /// let line = HemBox::duplicate("GET /index.html HTTP/1.1").unwrap();
  /// let mut word = HemBox::with_capacity(8).unwrap();
  /// let mut cursor = 0;
  ///
  /// assert_eq!(line.next_token_into(" ", &mut cursor, &mut word), Ok(0..3));
  /// assert_eq!(word, "GET");
  /// assert_eq!(line.next_token_into(" ", &mut cursor, &mut word), Ok(4..15));
  /// assert_eq!(word, "/index.h");
  /// ```
  pub fn next_token_into<D: Text + ?Sized>(
    &self,
    delims: &D,
    cursor: &mut isize,
    dst: &mut Hem,
  ) -> Result<Range<usize>> {
    let mut next = *cursor;
    let range = self.next_token(delims, &mut next).ok_or(Error::NotFound)?;
    dst.copy_bytes(&self.as_bytes()[range.clone()])?;
    *cursor = next;
    Ok(range)
  }

  /// Returns an iterator over the tokens of this instance.
  pub fn tokens<'a, D: Text + ?Sized>(&'a self, delims: &'a D) -> Tokens<'a> {
    tokens(self, delims)
  }
}

//! `hemline` - Bounded byte strings that know their own size 🧵📏
//!
//! A [`Hem`] is a fixed-capacity byte string that carries its capacity and
//! current length in a compact header, right in front of its bytes:
//!
//! * The header is one descriptor byte followed by little-endian counters
//!   whose width (1, 2, 4 or 8 bytes) is picked per instance from the
//!   capacity, so a 10-byte string costs three bytes of overhead.
//! * The payload is always NUL-terminated, so it can be handed to code that
//!   expects a C string via [`Hem::as_c_str()`].
//! * Every primitive (copy, append, search, extract, insert, tokenize) checks
//!   its bounds against the header. Writes that don't fit are truncated to
//!   the capacity instead of overflowing.
//! * Capacity never changes after initialization.
//!
//! ---
//!
//! An instance can live in any buffer you own. Ask how big the buffer has to
//! be, then initialize it in place:
//!
//! ```
//! # use hemline::*;
//! let mut buf = [0; hemline::backing_size(10)];
//! let hem = Hem::init(&mut buf, &Config::new(10)).unwrap();
//!
//! hem.copy_from("abc").unwrap();
//! assert_eq!(hem.append("defgh"), Ok(8));
//!
//! // Only two more bytes fit.
//! assert_eq!(hem.append("XYZ"), Ok(10));
//! assert_eq!(hem, "abcdefghXY");
//! ```
//!
//! Heap instances are owned by a [`HemBox`], which dereferences to [`Hem`]:
//!
//! ```
//! # use hemline::*;
//! let hello = HemBox::duplicate("hello world").unwrap();
//! assert_eq!(hello.find("world", 0), Some(6));
//!
//! let ell = HemBox::extract(&hello, 1, 3).unwrap();
//! assert_eq!(ell, "ell");
//! ```
//!
//! Anywhere an instance is read from, a plain string works too: every such
//! argument is generic over [`Text`], which is implemented for [`Hem`],
//! [`HemBox`], [`str`], `[u8]`, [`CStr`](std::ffi::CStr) and their owned
//! counterparts. Plain strings and byte slices follow C semantics and end at
//! their first NUL byte.

#![deny(missing_docs)]

use std::ffi::CStr;
use std::ffi::CString;

mod boxed;
mod config;
mod convert;
mod edit;
mod error;
mod hem;
mod raw;
pub mod search;
mod splice;

pub use boxed::HemBox;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use hem::Hem;
pub use raw::backing_size;
pub use raw::Area;
pub use raw::Header;
pub use raw::Width;
pub use search::Tokens;

/// A source of bytes that hemline primitives can read from.
///
/// This is what lets an instance and a plain string be used interchangeably
/// as the source, needle or character set of an operation.
pub trait Text {
  /// Returns the bytes of this text, without any terminator.
  fn text(&self) -> &[u8];
}

/// Returns the prefix of `bytes` before the first NUL, like `strlen` would.
fn until_nul(bytes: &[u8]) -> &[u8] {
  match bytes.iter().position(|&b| b == 0) {
    Some(nul) => &bytes[..nul],
    None => bytes,
  }
}

impl Text for Hem {
  fn text(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl Text for HemBox {
  fn text(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl Text for [u8] {
  fn text(&self) -> &[u8] {
    until_nul(self)
  }
}

impl<const N: usize> Text for [u8; N] {
  fn text(&self) -> &[u8] {
    until_nul(self)
  }
}

impl Text for Vec<u8> {
  fn text(&self) -> &[u8] {
    until_nul(self)
  }
}

impl Text for str {
  fn text(&self) -> &[u8] {
    until_nul(self.as_bytes())
  }
}

impl Text for String {
  fn text(&self) -> &[u8] {
    until_nul(self.as_bytes())
  }
}

impl Text for CStr {
  fn text(&self) -> &[u8] {
    self.to_bytes()
  }
}

impl Text for CString {
  fn text(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<T: Text + ?Sized> Text for &T {
  fn text(&self) -> &[u8] {
    T::text(self)
  }
}

impl<T: Text + ?Sized> Text for &mut T {
  fn text(&self) -> &[u8] {
    T::text(self)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn plain_text_stops_at_nul() {
    assert_eq!("abc".text(), b"abc");
    assert_eq!("ab\0c".text(), b"ab");
    assert_eq!(b"\0abc".text(), b"");
    assert_eq!(vec![1u8, 2, 0, 3].text(), [1, 2]);
    assert_eq!(c"xy".text(), b"xy");
    assert_eq!(String::from("q\0").text(), b"q");
  }

  #[test]
  fn instances_keep_interior_nul() {
    let mut hem = HemBox::duplicate("abc").unwrap();
    hem.set_byte_at(1, 0, b' ').unwrap();
    assert_eq!(hem.text(), b"a\0c");
    assert_eq!((&&*hem).text(), b"a\0c");
  }
}

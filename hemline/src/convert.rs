//! Conversion trait impls.

use std::borrow::Borrow;
use std::borrow::BorrowMut;
use std::ffi::CStr;

use crate::Error;
use crate::Hem;
use crate::HemBox;

impl AsRef<[u8]> for Hem {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl AsRef<CStr> for Hem {
  fn as_ref(&self) -> &CStr {
    self.as_c_str()
  }
}

impl AsRef<[u8]> for HemBox {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl AsRef<Hem> for HemBox {
  fn as_ref(&self) -> &Hem {
    self.as_hem()
  }
}

impl AsMut<Hem> for HemBox {
  fn as_mut(&mut self) -> &mut Hem {
    self.as_hem_mut()
  }
}

impl Borrow<Hem> for HemBox {
  fn borrow(&self) -> &Hem {
    self.as_hem()
  }
}

impl BorrowMut<Hem> for HemBox {
  fn borrow_mut(&mut self) -> &mut Hem {
    self.as_hem_mut()
  }
}

impl<'a> TryFrom<&'a [u8]> for &'a Hem {
  type Error = Error;

  fn try_from(bytes: &'a [u8]) -> Result<Self, Error> {
    Hem::from_bytes(bytes)
  }
}

impl<'a> TryFrom<&'a mut [u8]> for &'a mut Hem {
  type Error = Error;

  fn try_from(bytes: &'a mut [u8]) -> Result<Self, Error> {
    Hem::from_bytes_mut(bytes)
  }
}

impl TryFrom<Box<[u8]>> for HemBox {
  type Error = Error;

  fn try_from(bytes: Box<[u8]>) -> Result<Self, Error> {
    Self::from_boxed_bytes(bytes)
  }
}

impl TryFrom<Vec<u8>> for HemBox {
  type Error = Error;

  fn try_from(bytes: Vec<u8>) -> Result<Self, Error> {
    Self::from_boxed_bytes(bytes.into_boxed_slice())
  }
}

impl TryFrom<&str> for HemBox {
  type Error = Error;

  fn try_from(s: &str) -> Result<Self, Error> {
    Self::duplicate(s)
  }
}

impl TryFrom<&Hem> for HemBox {
  type Error = Error;

  fn try_from(hem: &Hem) -> Result<Self, Error> {
    Self::duplicate_at_least(hem, hem.capacity())
  }
}

impl From<HemBox> for Box<[u8]> {
  fn from(hem: HemBox) -> Self {
    hem.into_boxed_bytes()
  }
}

impl From<HemBox> for Vec<u8> {
  fn from(hem: HemBox) -> Self {
    hem.into_boxed_bytes().into_vec()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::Config;
  use crate::Text;

  #[test]
  fn raw_views() {
    let bytes = [0b0010_0011, 3, 2, b'o', b'k', 0, 0];
    let hem = <&Hem>::try_from(&bytes[..]).unwrap();
    assert_eq!(AsRef::<[u8]>::as_ref(hem), b"ok");
    assert_eq!(AsRef::<CStr>::as_ref(hem), c"ok");

    let bad = [0x80u8, 0, 0];
    assert!(<&Hem>::try_from(&bad[..]).is_err());
  }

  #[test]
  fn local_to_heap() {
    let mut buf = [0; 16];
    let local = Hem::init_with(&mut buf, &Config::new(6), "stack").unwrap();
    let heap = HemBox::try_from(&*local).unwrap();
    assert_eq!(heap, "stack");
    assert_eq!(heap.capacity(), 6);
    assert_eq!(heap.area(), Some(crate::Area::Heap));
  }

  #[test]
  fn owned_round_trip() {
    let hem = HemBox::try_from("bytes").unwrap();
    let raw: Vec<u8> = hem.clone().into();
    let back = HemBox::try_from(raw).unwrap();
    assert_eq!(back, hem);

    let borrowed: &Hem = back.borrow();
    assert_eq!(borrowed.text(), b"bytes");
  }
}

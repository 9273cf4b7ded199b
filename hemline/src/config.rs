//! Construction parameters.

use crate::raw::Area;
use crate::raw::Header;

/// Parameters for initializing an instance.
///
/// A `Config` answers the two questions every call site has to settle before
/// it can hold an instance: how many bytes of backing storage to provide
/// ([`Config::backing_size()`]) and what to write into them
/// ([`Hem::init()`](crate::Hem::init)).
///
/// ```
/// # use hemline::*;
/// let config = Config::new(16).area(Area::Static).read_only();
/// let mut buf = vec![0; config.backing_size().unwrap()];
///
/// let hem = Hem::init_with(&mut buf, &config, "Initial value").unwrap();
/// assert_eq!(hem, "Initial value");
/// assert!(hem.is_read_only());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
  /// Maximum number of content bytes. Fixed for the life of the instance.
  pub capacity: usize,

  /// Where the backing buffer lives.
  ///
  /// Default: [`Area::Local`].
  pub area: Area,

  /// Whether the instance accepts mutations once initialized.
  ///
  /// Default: `true`.
  pub writable: bool,
}

impl Config {
  /// Default storage area.
  pub const DEFAULT_AREA: Area = Area::Local;

  /// Creates a config for a writable instance with the given capacity.
  pub const fn new(capacity: usize) -> Self {
    Self {
      capacity,
      area: Self::DEFAULT_AREA,
      writable: true,
    }
  }

  /// Sets the storage area.
  pub const fn area(mut self, area: Area) -> Self {
    self.area = area;
    self
  }

  /// Marks the instance as read-only once initialized.
  pub const fn read_only(mut self) -> Self {
    self.writable = false;
    self
  }

  /// Returns the header the initializer will write.
  pub const fn header(&self) -> Header {
    let mut header = Header::for_capacity(self.capacity, self.area);
    header.writable = self.writable;
    header
  }

  /// Returns the number of bytes of backing storage this config requires, or
  /// `None` if that size overflows `usize`.
  pub const fn backing_size(&self) -> Option<usize> {
    self.header().backing_size(self.capacity)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new(0)
  }
}

use std::io::{Read, Seek, Write};

/// An already-open, seekable, writable block device.
///
/// The handle is always borrowed: nothing in this workspace opens, closes
/// or enumerates devices. Any `Read + Write + Seek` type qualifies, so raw
/// device files, disk images and in-memory cursors all work.
pub trait RawDevice: Read + Write + Seek {}

impl<T: Read + Write + Seek + ?Sized> RawDevice for T {}

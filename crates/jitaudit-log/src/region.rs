//! Borrowed memory regions
//!
//! A [`MemoryRegion`] is what gets snapshotted: a byte slice borrowed for the
//! duration of one logging call, plus the address it is reported under. The
//! logger copies the bytes into the record and keeps nothing, so the region
//! may be freed or reused as soon as the call returns.

use std::fmt;

/// A contiguous byte region and the address it is recorded under
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion<'a> {
    address: u64,
    data: &'a [u8],
}

impl<'a> MemoryRegion<'a> {
    /// Create a region with an explicit address
    ///
    /// Useful when `data` is a copy or a view of an object whose address in
    /// the host runtime differs from where the bytes live now.
    pub fn new(address: u64, data: &'a [u8]) -> Self {
        Self { address, data }
    }

    /// Create a region recorded at the slice's own location
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            address: data.as_ptr() as usize as u64,
            data,
        }
    }

    /// Create a region from a raw pointer and length
    ///
    /// A zero `len` yields an empty region at `ptr`, and `ptr` may then be null.
    ///
    /// # Safety
    ///
    /// When `len` is non-zero, `ptr` must be valid for reads of `len` bytes
    /// and the memory must not be mutated for the lifetime `'a`. In practice
    /// that lifetime should not outlive the logging call the region is passed to.
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Self {
        let data: &'a [u8] = if len == 0 {
            &[]
        } else {
            // SAFETY: upheld by the caller per the contract above.
            unsafe { std::slice::from_raw_parts(ptr, len) }
        };
        Self {
            address: ptr as usize as u64,
            data,
        }
    }

    /// Address the region is recorded under
    pub fn address(&self) -> u64 {
        self.address
    }

    /// The region's bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the region is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for MemoryRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRegion")
            .field("address", &format_args!("{:#x}", self.address))
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_uses_slice_address() {
        let bytes = vec![1u8, 2, 3];
        let region = MemoryRegion::from_slice(&bytes);
        assert_eq!(region.address(), bytes.as_ptr() as usize as u64);
        assert_eq!(region.data(), &[1, 2, 3]);
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn test_explicit_address() {
        let region = MemoryRegion::new(0xdead_0000, &[9]);
        assert_eq!(region.address(), 0xdead_0000);
        assert!(!region.is_empty());
    }

    #[test]
    fn test_from_raw_parts() {
        let bytes = [4u8, 5, 6, 7];
        let region = unsafe { MemoryRegion::from_raw_parts(bytes.as_ptr(), bytes.len()) };
        assert_eq!(region, MemoryRegion::from_slice(&bytes));

        let empty = unsafe { MemoryRegion::from_raw_parts(std::ptr::null(), 0) };
        assert!(empty.is_empty());
        assert_eq!(empty.address(), 0);
    }

    #[test]
    fn test_debug_omits_contents() {
        let region = MemoryRegion::new(0x10, &[0xaa; 64]);
        let text = format!("{region:?}");
        assert!(text.contains("0x10"));
        assert!(text.contains("len: 64"));
    }
}

//! Bit-packed array for storing fixed-width integer values in a compact `Vec<u64>`.
//!
//! Each element occupies exactly `width` bits, where `width` may be any value in
//! `0..=32`. Widths are not rounded to powers of two, so an element can straddle
//! two storage words; such accesses are split into the part owned by each word.

/// Number of bits in one storage word.
const WORD_BITS: usize = u64::BITS as usize;

/// Largest supported element width.
pub const MAX_WIDTH: u8 = 32;

/// Returns the minimum width able to represent `count` distinct values,
/// i.e. `ceil(log2(max(count, 1)))`.
///
/// ```
/// use cybrion_voxel::bit_packed::width_for;
///
/// assert_eq!(width_for(0), 0);
/// assert_eq!(width_for(1), 0);
/// assert_eq!(width_for(2), 1);
/// assert_eq!(width_for(3), 2);
/// assert_eq!(width_for(5), 3);
/// assert_eq!(width_for(256), 8);
/// assert_eq!(width_for(257), 9);
/// ```
pub const fn width_for(count: usize) -> u8 {
    if count <= 1 {
        0
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }
}

/// A compact array where each element is stored using a fixed number of bits.
///
/// A width of 0 stores nothing: every element reads as 0 and the backing
/// storage is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPackedArray {
    /// Raw storage. Elements are packed into 64-bit words, low bits first.
    data: Vec<u64>,
    /// Bits per element.
    width: u8,
    /// Total number of logical elements.
    len: usize,
}

impl BitPackedArray {
    /// Creates a new array with `len` elements, all initialized to zero.
    pub fn new(width: u8, len: usize) -> Self {
        debug_assert!(width <= MAX_WIDTH, "width {width} exceeds {MAX_WIDTH}");
        Self {
            data: vec![0u64; Self::word_count(width, len)],
            width,
            len,
        }
    }

    /// Returns the value at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= len` in debug builds.
    pub fn get(&self, slot: usize) -> u32 {
        debug_assert!(slot < self.len, "slot {slot} out of bounds ({})", self.len);
        if self.width == 0 {
            return 0;
        }
        let width = usize::from(self.width);
        let bit = slot * width;
        let word = bit / WORD_BITS;
        let offset = bit % WORD_BITS;
        let mask = self.mask();

        let mut raw = self.data[word] >> offset;
        if offset + width > WORD_BITS {
            // `offset` is non-zero here, so the shift stays below 64.
            raw |= self.data[word + 1] << (WORD_BITS - offset);
        }
        (raw & mask) as u32
    }

    /// Writes `value` into `slot`, leaving every other slot untouched.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `slot >= len` or if `value` does not fit in
    /// the current width.
    pub fn set(&mut self, slot: usize, value: u32) {
        debug_assert!(slot < self.len, "slot {slot} out of bounds ({})", self.len);
        debug_assert!(
            u64::from(value) <= self.mask(),
            "value {value} exceeds {}-bit capacity",
            self.width
        );
        if self.width == 0 {
            return;
        }
        let width = usize::from(self.width);
        let bit = slot * width;
        let word = bit / WORD_BITS;
        let offset = bit % WORD_BITS;
        let mask = self.mask();
        let value = u64::from(value) & mask;

        self.data[word] = (self.data[word] & !(mask << offset)) | (value << offset);
        if offset + width > WORD_BITS {
            let low_bits = WORD_BITS - offset;
            let high_mask = mask >> low_bits;
            self.data[word + 1] = (self.data[word + 1] & !high_mask) | (value >> low_bits);
        }
    }

    /// Re-encodes every element under `new_width` and replaces the backing
    /// storage.
    ///
    /// The new storage is fully built before it replaces the old one, so a
    /// caller never observes a half-migrated array. Widths only grow: values
    /// stored under the old width must remain representable.
    pub fn resize_width(&mut self, new_width: u8) {
        debug_assert!(
            new_width >= self.width,
            "width may only grow ({} -> {new_width})",
            self.width
        );
        if new_width == self.width {
            return;
        }

        let mut repacked = Self::new(new_width, self.len);
        // A zero-width array is all zeroes, which the fresh storage already is.
        if self.width > 0 {
            for slot in 0..self.len {
                repacked.set(slot, self.get(slot));
            }
        }
        *self = repacked;
    }

    /// Iterates over every element in slot order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |slot| self.get(slot))
    }

    /// Returns the number of bits per element.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Returns the number of distinct values the current width can hold.
    pub fn capacity(&self) -> u64 {
        1u64 << self.width
    }

    /// Returns the number of logical elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the size of the backing storage in bytes (not counting struct overhead).
    pub fn storage_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<u64>()
    }

    /// Returns a reference to the raw `u64` storage words.
    pub fn raw_data(&self) -> &[u64] {
        &self.data
    }

    fn mask(&self) -> u64 {
        (1u64 << self.width) - 1
    }

    fn word_count(width: u8, len: usize) -> usize {
        (len * usize::from(width)).div_ceil(WORD_BITS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_width_array() {
        let arr = BitPackedArray::new(0, 100);
        assert_eq!(arr.get(0), 0);
        assert_eq!(arr.get(99), 0);
        assert_eq!(arr.storage_bytes(), 0);
        assert_eq!(arr.capacity(), 1);
    }

    #[test]
    fn test_width_for_matches_ceil_log2() {
        for count in 2..5000usize {
            let expected = (count as f64).log2().ceil() as u8;
            assert_eq!(width_for(count), expected, "count {count}");
        }
    }

    #[test]
    fn test_two_bit_roundtrip() {
        let mut arr = BitPackedArray::new(2, 64);
        for i in 0..64 {
            arr.set(i, (i % 4) as u32);
        }
        for i in 0..64 {
            assert_eq!(arr.get(i), (i % 4) as u32);
        }
    }

    #[test]
    fn test_odd_widths_cross_word_boundaries() {
        for width in [1u8, 3, 5, 7, 11, 13, 17, 31, 32] {
            let len = 200;
            let mut arr = BitPackedArray::new(width, len);
            let mask = (1u64 << width) - 1;
            for i in 0..len {
                arr.set(i, ((i as u64 * 2_654_435_761) & mask) as u32);
            }
            for i in 0..len {
                assert_eq!(
                    arr.get(i),
                    ((i as u64 * 2_654_435_761) & mask) as u32,
                    "width {width}, slot {i}"
                );
            }
        }
    }

    #[test]
    fn test_set_leaves_neighbours_untouched() {
        // Slot 12 at width 5 spans bits 60..65, straddling words 0 and 1.
        let mut arr = BitPackedArray::new(5, 32);
        for i in 0..32 {
            arr.set(i, 31);
        }
        arr.set(12, 0b10101);
        assert_eq!(arr.get(11), 31);
        assert_eq!(arr.get(12), 0b10101);
        assert_eq!(arr.get(13), 31);

        arr.set(12, 0);
        assert_eq!(arr.get(11), 31);
        assert_eq!(arr.get(12), 0);
        assert_eq!(arr.get(13), 31);
    }

    #[test]
    fn test_resize_width_preserves_values() {
        let mut arr = BitPackedArray::new(3, 1000);
        for i in 0..1000 {
            arr.set(i, (i % 7) as u32);
        }
        let before: Vec<u32> = arr.iter().collect();

        arr.resize_width(4);
        assert_eq!(arr.width(), 4);
        assert_eq!(arr.iter().collect::<Vec<_>>(), before);

        arr.resize_width(19);
        assert_eq!(arr.width(), 19);
        assert_eq!(arr.iter().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_resize_from_zero_width() {
        let mut arr = BitPackedArray::new(0, 4096);
        arr.resize_width(1);
        assert!(arr.iter().all(|v| v == 0));
        arr.set(4095, 1);
        assert_eq!(arr.get(4095), 1);
        assert_eq!(arr.get(4094), 0);
    }

    #[test]
    fn test_resize_to_same_width_is_noop() {
        let mut arr = BitPackedArray::new(2, 10);
        arr.set(3, 2);
        let words = arr.raw_data().to_vec();
        arr.resize_width(2);
        assert_eq!(arr.raw_data(), words.as_slice());
    }

    #[test]
    fn test_storage_sizes() {
        // 32768 voxels at 2 bits = 8192 bytes
        let arr = BitPackedArray::new(2, 32768);
        assert_eq!(arr.storage_bytes(), 8192);

        // 32768 voxels at 3 bits = 12288 bytes, no rounding up to 4 bits
        let arr = BitPackedArray::new(3, 32768);
        assert_eq!(arr.storage_bytes(), 12288);

        // Partial last word is still a whole word.
        let arr = BitPackedArray::new(5, 13);
        assert_eq!(arr.storage_bytes(), 16);
    }
}

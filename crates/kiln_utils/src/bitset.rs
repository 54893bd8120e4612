use std::fmt::{Debug, Display};

/// Fixed-size set of bits. Each entry point owns one bit.
#[derive(Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitSet {
  entries: Vec<u32>,
}

impl BitSet {
  pub fn new(max_bit_count: u32) -> Self {
    Self { entries: vec![0; max_bit_count.div_ceil(32) as usize] }
  }

  pub fn has_bit(&self, bit: u32) -> bool {
    self.entries.get((bit / 32) as usize).is_some_and(|entry| entry & (1 << (bit % 32)) != 0)
  }

  pub fn set_bit(&mut self, bit: u32) {
    self.entries[(bit / 32) as usize] |= 1 << (bit % 32);
  }

  pub fn is_empty(&self) -> bool {
    self.entries.iter().all(|entry| *entry == 0)
  }

  pub fn count_ones(&self) -> u32 {
    self.entries.iter().map(|entry| entry.count_ones()).sum()
  }

  /// Indexes of the set bits in ascending order.
  pub fn iter_ones(&self) -> impl Iterator<Item = u32> + '_ {
    self.entries.iter().enumerate().flat_map(|(i, entry)| {
      (0..32).filter(move |bit| entry & (1 << bit) != 0).map(move |bit| i as u32 * 32 + bit)
    })
  }
}

impl Display for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let bits = self.entries.iter().rev().map(|entry| format!("{entry:032b}")).collect::<String>();
    f.write_str(&bits)
  }
}

impl Debug for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("BitSet").field(&self.to_string()).finish()
  }
}

#[test]
fn test_bitset() {
  let mut bits = BitSet::new(40);
  assert!(bits.is_empty());
  bits.set_bit(1);
  bits.set_bit(33);
  assert!(bits.has_bit(1));
  assert!(bits.has_bit(33));
  assert!(!bits.has_bit(2));
  assert!(!bits.has_bit(100));
  assert_eq!(bits.count_ones(), 2);
  assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![1, 33]);
}

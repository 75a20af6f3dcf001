use std::hash::{Hash, Hasher};

// An f32 that can be hashed and compared for equality. Only meant for values that are copied
// around verbatim (clear colors, blend constants, depth bias) and never produced by arithmetic,
// so NaN is not a concern. Equality is bitwise, which keeps Eq and Hash consistent.
#[derive(Debug, Copy, Clone, Default)]
pub struct DecimalF32(pub f32);

impl DecimalF32 {
    /// Hash every element of `values` as a `DecimalF32`
    pub fn hash_slice<H: Hasher>(
        values: &[f32],
        state: &mut H,
    ) {
        for &value in values {
            DecimalF32(value).hash(state);
        }
    }
}

impl From<f32> for DecimalF32 {
    fn from(value: f32) -> Self {
        DecimalF32(value)
    }
}

impl From<DecimalF32> for f32 {
    fn from(value: DecimalF32) -> Self {
        value.0
    }
}

impl PartialEq for DecimalF32 {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for DecimalF32 {}

impl Hash for DecimalF32 {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        let bits: u32 = self.0.to_bits();
        bits.hash(state);
    }
}

//! Storage sizes.

use super::Type;

/// Sizes of the abstract target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    /// Size in bytes of a machine word (integers, reals, addresses).
    pub word_size: u32,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self { word_size: 8 }
    }
}

impl TargetLayout {
    pub fn new(word_size: u32) -> Self {
        Self { word_size }
    }

    /// Word size as a byte count.
    #[inline]
    pub fn word(&self) -> u64 {
        u64::from(self.word_size)
    }

    /// Bytes occupied by a value of `ty`.
    ///
    /// Open arrays and function values are passed by address, so they take
    /// one word.
    ///
    /// # Panics
    ///
    /// If `ty` does not pass [`checked_size_of`](Self::checked_size_of). The
    /// checker rejects such types before any storage is laid out.
    pub fn size_of(&self, ty: &Type) -> u64 {
        match self.checked_size_of(ty) {
            Some(size) => size,
            None => panic!("structural bug: storage of {ty} is not addressable"),
        }
    }

    /// Bytes occupied by a value of `ty`, or `None` when the size or an array
    /// bound does not fit in a signed frame offset.
    pub fn checked_size_of(&self, ty: &Type) -> Option<u64> {
        let size = match ty {
            Type::Int | Type::Real | Type::Func(_) => self.word(),
            Type::Char | Type::Bool => 1,
            Type::Array(arr) => match arr.size {
                Some(size) => {
                    arr.upper_bound()?;
                    size.checked_mul(self.checked_size_of(&arr.base)?)?
                }
                None => self.word(),
            },
            Type::Struct(fields) => fields
                .iter()
                .try_fold(0u64, |sum, f| sum.checked_add(self.checked_size_of(&f.ty)?))?,
            Type::Union(fields) => fields
                .iter()
                .try_fold(0u64, |max, f| Some(max.max(self.checked_size_of(&f.ty)?)))?,
        };
        i64::try_from(size).is_ok().then_some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn primitive_sizes() {
        let layout = TargetLayout::default();
        assert_eq!(layout.size_of(&Type::Int), 8);
        assert_eq!(layout.size_of(&Type::Real), 8);
        assert_eq!(layout.size_of(&Type::Char), 1);
        assert_eq!(layout.size_of(&Type::Bool), 1);
        assert_eq!(TargetLayout::new(4).size_of(&Type::Int), 4);
    }

    #[test]
    fn composite_sizes() {
        let layout = TargetLayout::new(4);
        assert_eq!(layout.size_of(&Type::array(Type::Int, 0, 10)), 40);
        assert_eq!(layout.size_of(&Type::open_array(Type::Int)), 4);
        assert_eq!(layout.size_of(&Type::func(None, vec![Type::Int])), 4);

        let fields = vec![
            Field { name: "a".into(), ty: Type::Int },
            Field { name: "b".into(), ty: Type::array(Type::Char, 0, 6) },
        ];
        assert_eq!(layout.size_of(&Type::Struct(fields.clone())), 10);
        assert_eq!(layout.size_of(&Type::Union(fields)), 6);
        assert_eq!(layout.size_of(&Type::Union(vec![])), 0);
    }

    #[test]
    fn oversized_storage_is_detected() {
        let layout = TargetLayout::default();
        let huge = Type::array(Type::Int, 0, u64::MAX / 4);
        assert_eq!(layout.checked_size_of(&huge), None);
        assert_eq!(layout.checked_size_of(&Type::array(huge.clone(), 0, 1)), None);
        assert_eq!(
            layout.checked_size_of(&Type::Struct(vec![Field { name: "h".into(), ty: huge }])),
            None
        );
        assert_eq!(layout.checked_size_of(&Type::array(Type::Char, i64::MAX, 2)), None);
        assert_eq!(layout.checked_size_of(&Type::array(Type::Int, -5, 3)), Some(24));
    }
}

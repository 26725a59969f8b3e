//! Index newtypes and vectors that can only be indexed by them.
//!
//! A segment tree keeps several parallel arrays (segments, parents, child
//! counts) that all share one id space. Wrapping them in a vector that only
//! accepts the matching id type keeps a stray `usize` from a different id
//! space out of them.

#[macro_export]
macro_rules! define_indexed_vec {
    (
        $(#[$idx_meta:meta])*
        $idx_vis:vis struct $Idx:ident ;

        $(#[$vec_meta:meta])*
        $vec_vis:vis struct $Vec:ident ;
    ) => {
        /* ——————————————————— index new‑type ——————————————————— */

        $(#[$idx_meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
        $idx_vis struct $Idx(pub usize);

        impl ::std::convert::From<usize> for $Idx {
            fn from(value: usize) -> Self {
                $Idx(value)
            }
        }

        impl ::std::convert::From<$Idx> for usize {
            fn from(value: $Idx) -> Self {
                value.0
            }
        }

        /* ——————————————————— vector new‑type ——————————————————— */

        $(#[$vec_meta])*
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
        $vec_vis struct $Vec<T>(::std::vec::Vec<T>);

        // no `T: Default` bound, unlike the derive
        impl<T> ::std::default::Default for $Vec<T> {
            #[inline] fn default() -> Self { Self(::std::vec::Vec::new()) }
        }

        impl<T> ::std::ops::Index<$Idx> for $Vec<T> {
            type Output = T;
            #[inline] fn index(&self, i: $Idx) -> &Self::Output { &self.0[i.0] }
        }
        impl<T> ::std::ops::IndexMut<$Idx> for $Vec<T> {
            #[inline] fn index_mut(&mut self, i: $Idx) -> &mut Self::Output { &mut self.0[i.0] }
        }

        impl<T> $Vec<T> {
            #[inline] pub fn new() -> Self { Self(::std::vec::Vec::new()) }
            #[inline] pub fn with_capacity(c: usize) -> Self { Self(::std::vec::Vec::with_capacity(c)) }

            #[inline] pub fn len(&self) -> usize { self.0.len() }
            #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }
            #[inline] pub fn reserve(&mut self, n: usize) { self.0.reserve(n) }

            /// The index the next pushed element will land at.
            #[inline] pub fn next_index(&self) -> $Idx { $Idx(self.0.len()) }

            /// Pushes `value` and returns the index it was stored at.
            #[inline] pub fn push(&mut self, value: T) -> $Idx {
                let idx = self.next_index();
                self.0.push(value);
                idx
            }

            #[inline] pub fn contains_index(&self, idx: $Idx) -> bool { idx.0 < self.0.len() }
            #[inline] pub fn get(&self, idx: $Idx) -> Option<&T> { self.0.get(idx.0) }
            #[inline] pub fn get_mut(&mut self, idx: $Idx) -> Option<&mut T> { self.0.get_mut(idx.0) }

            #[inline] pub fn indices(&self) -> impl DoubleEndedIterator<Item = $Idx> + ExactSizeIterator {
                (0..self.0.len()).map($Idx)
            }
            #[inline] pub fn iter(&self) -> impl DoubleEndedIterator<Item = ($Idx, &T)> + ExactSizeIterator {
                self.0.iter().enumerate().map(|(u, t)| ($Idx(u), t))
            }
            #[inline] pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = ($Idx, &mut T)> + ExactSizeIterator {
                self.0.iter_mut().enumerate().map(|(u, t)| ($Idx(u), t))
            }

            #[inline] pub fn as_slice(&self) -> &[T] { &self.0 }
        }

        impl<T> ::std::iter::FromIterator<T> for $Vec<T> {
            #[inline] fn from_iter<I: ::std::iter::IntoIterator<Item = T>>(it: I) -> Self {
                Self(::std::vec::Vec::from_iter(it))
            }
        }

        impl<T> ::std::convert::From<::std::vec::Vec<T>> for $Vec<T> {
            #[inline] fn from(v: ::std::vec::Vec<T>) -> Self { Self(v) }
        }
    };
}

#[cfg(test)]
mod test {
    crate::define_indexed_vec!(
        struct Idx;
        struct IdxVec;
    );

    #[test]
    fn push_returns_dense_indices() {
        let mut v: IdxVec<&str> = IdxVec::new();
        assert_eq!(v.next_index(), Idx(0));
        let a = v.push("a");
        let b = v.push("b");
        assert_eq!((a, b), (Idx(0), Idx(1)));
        assert_eq!(v[b], "b");
        assert!(v.contains_index(b));
        assert!(!v.contains_index(Idx(2)));
        assert_eq!(v.indices().collect::<Vec<_>>(), vec![Idx(0), Idx(1)]);
    }

    /// Element type without a `Default` of its own.
    #[derive(Debug, PartialEq)]
    struct Opaque(u8);

    #[test]
    fn default_needs_no_element_default() {
        let mut v: IdxVec<Opaque> = IdxVec::default();
        assert!(v.is_empty());
        let i = v.push(Opaque(3));
        assert_eq!(v[i], Opaque(3));
    }
}

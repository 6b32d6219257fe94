//! Slice abstraction

use num_traits::Float;
use core::ops::{Deref, DerefMut, Drop};

//

/// Slice-like vector storage trait.
///
/// Every vector handed to [`crate::solver::LinAlg`], [`crate::solver::Operator`]
/// and [`crate::solver::ConvexFn`] goes through this trait,
/// so that primal points and per-block dual points can be carved out of one flat storage
/// with [`crate::splitm`] and [`crate::splitm_mut`].
pub trait SliceLike
{
    /// Scalar type of the elements.
    type F: Float;

    /// Wraps an immutable slice.
    fn new_ref(s: &[Self::F]) -> SliceRef<'_, Self>;
    /// Wraps a mutable slice.
    fn new_mut(s: &mut[Self::F]) -> SliceMut<'_, Self>;

    /// Splits into `[0, mid)` and `[mid, len)`.
    fn split_ref(&self, mid: usize) -> (SliceRef<'_, Self>, SliceRef<'_, Self>);
    /// Mutable version of [`SliceLike::split_ref`].
    fn split_mut(&mut self, mid: usize) -> (SliceMut<'_, Self>, SliceMut<'_, Self>);

    /// Called when a [`SliceRef`] or [`SliceMut`] goes out of scope.
    fn drop(&self);

    /// Number of elements.
    fn len(&self) -> usize;

    /// Plain slice view.
    fn get_ref(&self) -> &[Self::F];
    /// Plain mutable slice view.
    fn get_mut(&mut self) -> &mut[Self::F];

    /// Element at `idx`.
    fn get(&self, idx: usize) -> Self::F
    {
        let (_, spl) = self.split_ref(idx);
        let (ind, _) = spl.split_ref(1);
        ind.get_ref()[0]
    }
    /// Sets the element at `idx`.
    fn set(&mut self, idx: usize, val: Self::F)
    {
        let (_, mut spl) = self.split_mut(idx);
        let (mut ind, _) = spl.split_mut(1);
        ind.get_mut()[0] = val;
    }

    /// Owned copy of the elements.
    fn to_vec(&self) -> Vec<Self::F>
    {
        self.get_ref().to_vec()
    }
}

/// Immutable wrapper returned by [`SliceLike`].
#[derive(Debug)] // NOTE: Do not derive clone, or the functionality of SliceLike::drop may break.
pub struct SliceRef<'a, S: SliceLike + ?Sized>
{
    s: &'a S,
}

impl<'a, S: SliceLike + ?Sized> Deref for SliceRef<'a, S>
{
    type Target = S;
    fn deref(&self) -> &Self::Target {self.s}
}

impl<'a, S: SliceLike + ?Sized> Drop for SliceRef<'a, S>
{
    fn drop(&mut self) {
        self.s.drop();
    }
}

/// Mutable wrapper returned by [`SliceLike`].
#[derive(Debug)]
pub struct SliceMut<'a, S: SliceLike + ?Sized>
{
    s: &'a mut S,
}

impl<'a, S: SliceLike + ?Sized> Deref for SliceMut<'a, S>
{
    type Target = S;
    fn deref(&self) -> &Self::Target {self.s}
}

impl<'a, S: SliceLike + ?Sized> DerefMut for SliceMut<'a, S>
{
    fn deref_mut(&mut self) -> &mut Self::Target {self.s}
}

impl<'a, S: SliceLike + ?Sized> Drop for SliceMut<'a, S>
{
    fn drop(&mut self) {
        self.s.drop();
    }
}

impl<'a, S: SliceLike + ?Sized> SliceRef<'a, S>
{
    pub fn new(s: &'a S) -> Self
    {
        SliceRef {s}
    }
}
impl<'a, S: SliceLike + ?Sized> SliceMut<'a, S>
{
    pub fn new(s: &'a mut S) -> Self
    {
        SliceMut {s}
    }
}

/// Splits a [`SliceLike`] into consecutive immutable pieces of given lengths.
#[macro_export]
macro_rules! splitm {
    ($slice:expr, $( ($var:ident; $len:expr) ),+ ) => {
        let (_, _splitm_rest) = $slice.split_ref(0);
        $(
            let ($var, _splitm_rest) = _splitm_rest.split_ref($len);
        )*
        drop(_splitm_rest);
    };
}

/// Splits a [`SliceLike`] into consecutive mutable pieces of given lengths.
#[macro_export]
macro_rules! splitm_mut {
    ($slice:expr, $( ($var:ident; $len:expr) ),+ ) => {
        let (_, mut _splitm_rest) = $slice.split_mut(0);
        $(
            let (mut $var, mut _splitm_rest) = _splitm_rest.split_mut($len);
        )*
        drop(_splitm_rest);
    };
}

//

impl<F: Float> SliceLike for [F]
{
    type F = F;

    fn new_ref(s: &[F]) -> SliceRef<'_, Self>
    {
        SliceRef {s}
    }

    fn new_mut(s: &mut[F]) -> SliceMut<'_, Self>
    {
        SliceMut {s}
    }

    fn split_ref(&self, mid: usize) -> (SliceRef<'_, Self>, SliceRef<'_, Self>)
    {
        let s = self.split_at(mid);
        (SliceRef {s: s.0}, SliceRef {s: s.1})
    }

    fn split_mut(&mut self, mid: usize) -> (SliceMut<'_, Self>, SliceMut<'_, Self>)
    {
        let s = self.split_at_mut(mid);
        (SliceMut {s: s.0}, SliceMut {s: s.1})
    }

    fn drop(&self)
    {
    }

    fn len(&self) -> usize
    {
        <[F]>::len(self)
    }

    fn get_ref(&self) -> &[F]
    {
        self
    }

    fn get_mut(&mut self) -> &mut[F]
    {
        self
    }
}

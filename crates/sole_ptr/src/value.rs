use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Deref, DerefMut};

use crate::{AllocError, ExclusiveRef};

/// An [`ExclusiveRef`] restricted to concrete, cloneable values.
///
/// The `T: Clone` bound implies `T: Sized`, so trait objects and slices are
/// rejected when the type is named, not when it is used. In exchange the
/// owned value can always be copied back out with [`to_value`](Self::to_value).
///
/// There is no constructor from [`Box`](alloc::boxed::Box) or raw pointers:
/// values only enter by copy or by move.
///
/// Comparison and hashing forward to the owned value.
///
/// # Examples
///
/// ```
/// use sole_ptr::ExclusiveValueRef;
///
/// let r = ExclusiveValueRef::new(String::from("abc"));
/// let s: String = r.to_value();
///
/// assert_eq!(ExclusiveValueRef::new(s), r);
/// ```
///
/// Abstract pointees do not fit the bound:
///
/// ```compile_fail
/// use sole_ptr::ExclusiveValueRef;
///
/// trait Shape {}
///
/// let _r: ExclusiveValueRef<dyn Shape>;
/// ```
///
/// ```compile_fail
/// use sole_ptr::ExclusiveValueRef;
///
/// let _r: ExclusiveValueRef<str>;
/// ```
///
/// Nor can an existing owning handle be adopted:
///
/// ```compile_fail
/// use sole_ptr::ExclusiveValueRef;
///
/// let _r: ExclusiveValueRef<String> = ExclusiveValueRef::from(Box::new(String::new()));
/// ```
///
/// ```compile_fail
/// use sole_ptr::{ExclusiveRef, ExclusiveValueRef};
///
/// let r = ExclusiveRef::from_box(Box::new(1));
/// let _v: ExclusiveValueRef<i32> = r.into();
/// ```
#[repr(transparent)]
pub struct ExclusiveValueRef<T: Clone>(ExclusiveRef<T>);

impl<T: Clone> ExclusiveValueRef<T> {
    /// Moves `value` into a new heap allocation.
    ///
    /// Memory exhaustion is fatal, see [`try_new`](Self::try_new).
    #[inline]
    pub fn new(value: T) -> Self {
        Self(ExclusiveRef::new(value))
    }

    /// Moves `value` into a new heap allocation.
    ///
    /// # Errors
    ///
    /// [`AllocError`] when the global allocator returns null.
    #[inline]
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        ExclusiveRef::try_new(value).map(Self)
    }

    /// Deep copies the owned value into a new allocation.
    ///
    /// # Errors
    ///
    /// [`AllocError`] when the global allocator returns null.
    #[inline]
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        self.0.try_clone().map(Self)
    }

    /// Takes the allocation out of `this`, leaving `T::default()` behind.
    ///
    /// See [`ExclusiveRef::take`].
    #[inline]
    pub fn take(this: &mut Self) -> Self
    where
        T: Default,
    {
        Self(ExclusiveRef::take(&mut this.0))
    }

    /// Returns a copy of the owned value.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveValueRef;
    ///
    /// let mut r = ExclusiveValueRef::new(vec![1, 2]);
    /// let mut v = r.to_value();
    ///
    /// v.push(3);
    /// r.push(4);
    ///
    /// assert_eq!(v, [1, 2, 3]);
    /// assert_eq!(*r, [1, 2, 4]);
    /// ```
    #[inline]
    pub fn to_value(&self) -> T {
        self.0.get().clone()
    }

    /// Moves the owned value out and releases the allocation.
    ///
    /// ```
    /// use sole_ptr::ExclusiveValueRef;
    ///
    /// let r = ExclusiveValueRef::new(String::from("moved"));
    /// let s = ExclusiveValueRef::into_value(r);
    /// assert_eq!(s, "moved");
    /// ```
    #[inline]
    pub fn into_value(this: Self) -> T {
        *ExclusiveRef::into_box(this.0)
    }

    /// Returns a shared reference to the owned value.
    #[inline(always)]
    pub fn get(&self) -> &T {
        self.0.get()
    }

    /// Returns a mutable reference to the owned value.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }

    /// Acquires the underlying `*const` pointer.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.0.as_ptr()
    }

    /// Acquires the underlying `*mut` pointer.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.0.as_mut_ptr()
    }

    /// Returns `true` if both owners point to the same allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        ExclusiveRef::ptr_eq(&this.0, &other.0)
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl<T: Clone> From<T> for ExclusiveValueRef<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone> From<&ExclusiveRef<T>> for ExclusiveValueRef<T> {
    /// Deep copies the value, the source keeps its allocation.
    #[inline]
    fn from(value: &ExclusiveRef<T>) -> Self {
        Self(value.clone())
    }
}

impl<T: Clone> From<ExclusiveValueRef<T>> for ExclusiveRef<T> {
    #[inline]
    fn from(value: ExclusiveValueRef<T>) -> Self {
        value.0
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<T: Clone> Clone for ExclusiveValueRef<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        self.0.clone_from(&source.0);
    }
}

impl<T: Clone + Default> Default for ExclusiveValueRef<T> {
    #[inline]
    fn default() -> Self {
        Self(ExclusiveRef::default())
    }
}

impl<T: Clone> Deref for ExclusiveValueRef<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Clone> DerefMut for ExclusiveValueRef<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: Clone> AsRef<T> for ExclusiveValueRef<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        self.get()
    }
}

impl<T: Clone> AsMut<T> for ExclusiveValueRef<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: Clone> Borrow<T> for ExclusiveValueRef<T> {
    #[inline]
    fn borrow(&self) -> &T {
        self.get()
    }
}

impl<T: Clone> BorrowMut<T> for ExclusiveValueRef<T> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: Clone + PartialEq> PartialEq for ExclusiveValueRef<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<T: Clone + Eq> Eq for ExclusiveValueRef<T> {}

impl<T: Clone + PartialOrd> PartialOrd for ExclusiveValueRef<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.get().partial_cmp(other.get())
    }
}

impl<T: Clone + Ord> Ord for ExclusiveValueRef<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(other.get())
    }
}

impl<T: Clone + Hash> Hash for ExclusiveValueRef<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ExclusiveValueRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.get(), f)
    }
}

impl<T: Clone + fmt::Display> fmt::Display for ExclusiveValueRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}

impl<T: Clone> fmt::Pointer for ExclusiveValueRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// Tests

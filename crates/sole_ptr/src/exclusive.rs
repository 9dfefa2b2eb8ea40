use alloc::alloc::alloc;
use alloc::boxed::Box;
use core::alloc::Layout;
use core::any::type_name;
use core::borrow::{Borrow, BorrowMut};
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::AllocError;

/// An exclusive, non-null owner of one heap allocated `T`.
///
/// It behaves like a reference that owns its target: dereference it, call
/// methods through it, or clone it into a new, independent allocation.
///
/// # Pointee
///
/// `T` may be unsized, so `ExclusiveRef<dyn Trait>`, `ExclusiveRef<str>` and
/// `ExclusiveRef<[T]>` are all valid. Such values can not be built on the
/// stack, they enter through an owning handle with [`from_box`](Self::from_box).
///
/// # Ownership
///
/// - Exactly one `ExclusiveRef` releases a given allocation, exactly once.
/// - [`Clone`] is a deep copy into a new allocation.
/// - Moving an `ExclusiveRef` moves the allocation, the value stays in place.
///
/// # Examples
///
/// ```
/// use sole_ptr::ExclusiveRef;
///
/// #[derive(Clone)]
/// struct Point { x: i32 }
///
/// let a = ExclusiveRef::new(Point { x: 5 });
/// assert_eq!(a.x, 5);
///
/// let mut b = a.clone();
/// b.x = 7;
/// assert_eq!(a.x, 5);
/// assert_eq!(b.x, 7);
/// ```
pub struct ExclusiveRef<T: ?Sized> {
    ptr: NonNull<T>,
    // Logically owns a `T`, for drop check.
    _marker: PhantomData<T>,
}

// SAFETY: The pointee is never aliased, so this is as thread safe as `T`.
unsafe impl<T: ?Sized + Send> Send for ExclusiveRef<T> {}

// SAFETY: `&ExclusiveRef<T>` only hands out `&T`.
unsafe impl<T: ?Sized + Sync> Sync for ExclusiveRef<T> {}

impl<T: ?Sized> Unpin for ExclusiveRef<T> {}

impl<T: ?Sized> Drop for ExclusiveRef<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` was allocated with the layout `Box<T>` expects
        // and is owned by `self` alone.
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

// -----------------------------------------------------------------------------
// Sized construction

impl<T> ExclusiveRef<T> {
    /// Moves `value` into a new heap allocation.
    ///
    /// Memory exhaustion is fatal here, see [`try_new`](Self::try_new)
    /// for a recoverable version.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// let r = ExclusiveRef::new(5);
    /// assert_eq!(*r, 5);
    /// ```
    #[inline]
    pub fn new(value: T) -> Self {
        match Self::try_new(value) {
            Ok(this) => this,
            Err(err) => err.handle_error(),
        }
    }

    /// Moves `value` into a new heap allocation, returning an error
    /// instead of aborting if the allocator is out of memory.
    ///
    /// # Errors
    ///
    /// [`AllocError`] when the global allocator returns null.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// let r = ExclusiveRef::try_new([0u8; 64]).expect("out of memory");
    /// assert_eq!(r.len(), 64);
    /// ```
    pub fn try_new(value: T) -> Result<Self, AllocError> {
        let layout = Layout::new::<T>();

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: `layout` has a non-zero size.
            let raw = unsafe { alloc(layout) }.cast::<T>();
            match NonNull::new(raw) {
                Some(ptr) => ptr,
                None => {
                    let err = AllocError::new(layout);
                    log::error!("{err} while allocating `{}`", type_name::<T>());
                    return Err(err);
                }
            }
        };

        // SAFETY: `ptr` is aligned and valid for writes of `T`.
        unsafe { ptr.write(value) };

        Ok(Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Deep copies the owned value into a new allocation.
    ///
    /// The fallible counterpart of [`Clone::clone`].
    ///
    /// # Errors
    ///
    /// [`AllocError`] when the global allocator returns null.
    #[inline]
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::try_new(self.get().clone())
    }

    /// Takes the allocation out of `this`, leaving a fresh `T::default()`
    /// in its place.
    ///
    /// This is the move-from-a-borrow path: the returned owner keeps the
    /// original allocation, and `this` stays valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// let mut a = ExclusiveRef::new(vec![1, 2, 3]);
    /// let b = ExclusiveRef::take(&mut a);
    ///
    /// assert_eq!(*b, [1, 2, 3]);
    /// assert!(a.is_empty());
    /// ```
    #[inline]
    pub fn take(this: &mut Self) -> Self
    where
        T: Default,
    {
        mem::take(this)
    }
}

// -----------------------------------------------------------------------------
// Owning handles

impl<T: ?Sized> ExclusiveRef<T> {
    /// Takes over an existing owning handle without copying the value.
    ///
    /// This is the only way to hold a pointee that can not be moved by
    /// value, such as a trait object.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// trait Shape {
    ///     fn area(&self) -> f32;
    /// }
    ///
    /// struct Square(f32);
    ///
    /// impl Shape for Square {
    ///     fn area(&self) -> f32 { self.0 * self.0 }
    /// }
    ///
    /// let shape: ExclusiveRef<dyn Shape> = ExclusiveRef::from_box(Box::new(Square(3.0)));
    /// assert_eq!(shape.area(), 9.0);
    /// ```
    #[inline]
    pub fn from_box(boxed: Box<T>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(boxed)),
            _marker: PhantomData,
        }
    }

    /// Takes over a raw owning pointer.
    ///
    /// This is the only constructor that does not prove non-nullness itself.
    /// With debug assertions or the `debug` feature enabled a null `ptr`
    /// panics; otherwise it is not checked.
    ///
    /// # Safety
    ///
    /// - `ptr` must be non-null.
    /// - `ptr` must own a valid `T` allocated the way [`Box<T>`] allocates,
    ///   e.g. from [`Box::into_raw`] or [`ExclusiveRef::into_raw`].
    /// - Nothing else may use or release `ptr` afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// let raw = Box::into_raw(Box::new(String::from("abc")));
    /// let r = unsafe { ExclusiveRef::from_raw(raw) };
    /// assert_eq!(*r, "abc");
    /// ```
    #[cfg_attr(any(debug_assertions, feature = "debug"), track_caller)]
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        if cfg!(any(debug_assertions, feature = "debug")) && ptr.is_null() {
            null_owner::<T>();
        }

        Self {
            // SAFETY: The caller guarantees `ptr` is non-null.
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            _marker: PhantomData,
        }
    }

    /// Releases ownership to a raw pointer.
    ///
    /// The caller becomes responsible for the allocation, usually by
    /// passing it back to [`from_raw`](Self::from_raw) or [`Box::from_raw`].
    #[inline]
    pub fn into_raw(this: Self) -> *mut T {
        ManuallyDrop::new(this).ptr.as_ptr()
    }

    /// Converts back into a [`Box`], reusing the allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole_ptr::ExclusiveRef;
    ///
    /// let r: ExclusiveRef<[i32]> = ExclusiveRef::from_box(vec![1, 2].into_boxed_slice());
    /// let b: Box<[i32]> = ExclusiveRef::into_box(r);
    /// assert_eq!(*b, [1, 2]);
    /// ```
    #[inline]
    pub fn into_box(this: Self) -> Box<T> {
        // SAFETY: `into_raw` hands over the allocation this came from.
        unsafe { Box::from_raw(Self::into_raw(this)) }
    }

    /// Returns a shared reference to the owned value.
    #[inline(always)]
    pub fn get(&self) -> &T {
        // SAFETY: `ptr` is non-null, aligned and owned by `self`.
        unsafe { self.ptr.as_ref() }
    }

    /// Returns a mutable reference to the owned value.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: `ptr` is non-null, aligned and exclusively owned by `self`.
        unsafe { self.ptr.as_mut() }
    }

    /// Acquires the underlying `*const` pointer.
    ///
    /// The pointer stays valid as long as `self` is alive and not mutated.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Acquires the underlying `*mut` pointer.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns `true` if both owners point to the same allocation.
    ///
    /// For two live owners this is only ever `true` for the same owner,
    /// and for zero-sized values, which share a dangling address.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        ptr::addr_eq(this.as_ptr(), other.as_ptr())
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn null_owner<T: ?Sized>() -> ! {
    log::error!("null pointer passed to `ExclusiveRef::<{}>::from_raw`", type_name::<T>());
    panic!("`ExclusiveRef::from_raw` requires a non-null pointer");
}

// -----------------------------------------------------------------------------
// Traits

impl<T: Clone> Clone for ExclusiveRef<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new(self.get().clone())
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        self.get_mut().clone_from(source.get());
    }
}

impl<T: Default> Default for ExclusiveRef<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> Deref for ExclusiveRef<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: ?Sized> DerefMut for ExclusiveRef<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: ?Sized> AsRef<T> for ExclusiveRef<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        self.get()
    }
}

impl<T: ?Sized> AsMut<T> for ExclusiveRef<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: ?Sized> Borrow<T> for ExclusiveRef<T> {
    #[inline]
    fn borrow(&self) -> &T {
        self.get()
    }
}

impl<T: ?Sized> BorrowMut<T> for ExclusiveRef<T> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T> From<T> for ExclusiveRef<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized> From<Box<T>> for ExclusiveRef<T> {
    #[inline]
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ExclusiveRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.get(), f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for ExclusiveRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}

impl<T: ?Sized> fmt::Pointer for ExclusiveRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.as_ptr(), f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ExclusiveRef;
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::Cell;

    #[derive(Clone, Debug, PartialEq)]
    struct Concrete {
        x: i32,
    }

    trait Named {
        fn name(&self) -> &'static str;
    }

    struct Cat;

    impl Named for Cat {
        fn name(&self) -> &'static str {
            "cat"
        }
    }

    #[derive(Clone)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn is_sync_send() {
        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}

        is_send::<ExclusiveRef<i32>>();
        is_sync::<ExclusiveRef<i32>>();
        is_send::<ExclusiveRef<str>>();
        is_sync::<ExclusiveRef<[u8]>>();
    }

    #[test]
    fn copy_is_independent() {
        let a = ExclusiveRef::new(Concrete { x: 5 });
        assert_eq!(a.x, 5);

        let mut b = a.clone();
        b.x = 7;

        assert_eq!(a.x, 5);
        assert_eq!(b.x, 7);
        assert!(!ExclusiveRef::ptr_eq(&a, &b));
    }

    #[test]
    fn clone_from_keeps_allocation() {
        let a = ExclusiveRef::new(Concrete { x: 1 });
        let mut b = ExclusiveRef::new(Concrete { x: 2 });
        let before = b.as_ptr();

        b.clone_from(&a);

        assert_eq!(b.x, 1);
        assert_eq!(before, b.as_ptr());
    }

    #[test]
    fn move_keeps_allocation() {
        let a = ExclusiveRef::new(Concrete { x: 3 });
        let addr = a.as_ptr();

        let b = a;
        assert_eq!(b.x, 3);
        assert_eq!(addr, b.as_ptr());
    }

    #[test]
    fn take_leaves_default() {
        let mut a = ExclusiveRef::new(String::from("hello"));
        let addr = a.as_ptr();

        let b = ExclusiveRef::take(&mut a);

        assert_eq!(*b, "hello");
        assert_eq!(addr, b.as_ptr());
        assert_eq!(*a, "");
        assert!(!ExclusiveRef::ptr_eq(&a, &b));
    }

    #[test]
    fn dynamic_dispatch() {
        let r: ExclusiveRef<dyn Named> = ExclusiveRef::from_box(Box::new(Cat));
        assert_eq!(r.name(), "cat");

        let r: ExclusiveRef<dyn Named> = (Box::new(Cat) as Box<dyn Named>).into();
        let named: &dyn Named = &*r;
        assert_eq!(named.name(), "cat");
    }

    #[test]
    fn unsized_pointee() {
        let s: ExclusiveRef<str> = ExclusiveRef::from_box(Box::from("text"));
        assert_eq!(&*s, "text");
        assert_eq!(format!("{s}"), "text");

        let mut v: ExclusiveRef<[i32]> = ExclusiveRef::from_box(vec![1, 2, 3].into_boxed_slice());
        v[1] = 20;
        assert_eq!(*v, [1, 20, 3]);

        let b: Box<[i32]> = ExclusiveRef::into_box(v);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn zero_sized() {
        let a = ExclusiveRef::new(());
        let b = a.clone();
        assert_eq!(*a, *b);

        let c = ExclusiveRef::try_new(()).unwrap();
        assert!(c.as_ptr().is_aligned());
    }

    #[test]
    fn drops_exactly_once() {
        let count = Rc::new(Cell::new(0));

        let a = ExclusiveRef::new(DropCounter(count.clone()));
        let b = a.clone();
        drop(a);
        assert_eq!(count.get(), 1);

        let boxed = ExclusiveRef::into_box(b);
        assert_eq!(count.get(), 1);
        drop(boxed);
        assert_eq!(count.get(), 2);

        let c = ExclusiveRef::new(DropCounter(count.clone()));
        let raw = ExclusiveRef::into_raw(c);
        assert_eq!(count.get(), 2);
        drop(unsafe { ExclusiveRef::from_raw(raw) });
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn drops_trait_object() {
        struct Tracked(Rc<Cell<usize>>);

        impl Named for Tracked {
            fn name(&self) -> &'static str {
                "tracked"
            }
        }

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let count = Rc::new(Cell::new(0));
        let r: ExclusiveRef<dyn Named> = ExclusiveRef::from_box(Box::new(Tracked(count.clone())));
        assert_eq!(r.name(), "tracked");
        drop(r);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn accessors_agree() {
        let mut r = ExclusiveRef::new(Concrete { x: 1 });

        r.get_mut().x += 1;
        r.as_mut().x += 1;
        unsafe { (*r.as_mut_ptr()).x += 1 };

        assert_eq!(r.get().x, 4);
        assert_eq!(unsafe { (*r.as_ptr()).x }, 4);
        assert_eq!(format!("{r:?}"), "Concrete { x: 4 }");
    }

    #[test]
    fn try_clone() {
        let a = ExclusiveRef::new(Concrete { x: 9 });
        let b = a.try_clone().unwrap();
        assert_eq!(*a, *b);
        assert!(!ExclusiveRef::ptr_eq(&a, &b));
    }

    #[cfg(any(debug_assertions, feature = "debug"))]
    #[test]
    #[should_panic(expected = "non-null")]
    fn from_raw_null() {
        let _ = unsafe { ExclusiveRef::<i32>::from_raw(core::ptr::null_mut()) };
    }
}

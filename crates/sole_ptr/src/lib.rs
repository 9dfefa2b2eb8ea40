//! This crate provides owning pointers that read like references.
//!
//! Both types own exactly one heap allocated value, are never null once
//! built through safe code, and never share their target with another owner.
//!
//! **ExclusiveRef**
//!
//! [`ExclusiveRef<T>`] is the general form. `T` may be unsized, so it can hold a
//! trait object handed in as an owning [`Box`](alloc::boxed::Box), and it
//! dispatches through it like `&mut dyn Trait` would.
//!
//! **ExclusiveValueRef**
//!
//! [`ExclusiveValueRef<T>`] only accepts sized, cloneable types. It can copy its
//! value back out with [`to_value`](ExclusiveValueRef::to_value), and compares
//! and hashes by value.
//!
//! # Examples
//!
//! ```
//! use sole_ptr::{ExclusiveRef, ExclusiveValueRef};
//!
//! trait Printable {
//!     fn print(&self) -> String;
//! }
//!
//! #[derive(Clone, Default)]
//! struct Concrete {
//!     x: i32,
//! }
//!
//! impl Printable for Concrete {
//!     fn print(&self) -> String {
//!         format!("x = {}", self.x)
//!     }
//! }
//!
//! let concrete = ExclusiveValueRef::new(Concrete::default());
//! let y = concrete.x;
//! let copy: Concrete = concrete.to_value();
//! assert_eq!(y, copy.x);
//!
//! let printable: ExclusiveRef<dyn Printable> = ExclusiveRef::from_box(Box::new(Concrete { x: 1 }));
//! assert_eq!(printable.print(), "x = 1");
//! ```
#![expect(unsafe_code, reason = "Owning raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod exclusive;
mod value;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::AllocError;
pub use exclusive::ExclusiveRef;
pub use value::ExclusiveValueRef;

#[cfg(test)]
mod tests {
    use super::{ExclusiveRef, ExclusiveValueRef};
    use alloc::boxed::Box;

    trait Abstract {
        fn print(&self) -> i32;
    }

    #[derive(Clone, Default)]
    struct Concrete {
        x: i32,
    }

    impl Abstract for Concrete {
        fn print(&self) -> i32 {
            self.x
        }
    }

    // Holds a pointee that is only defined further down.
    struct UseLater {
        r: ExclusiveValueRef<Later>,
    }

    #[derive(Clone)]
    struct Later {
        id: u8,
    }

    impl Later {
        fn id(&self) -> u8 {
            self.id
        }
    }

    #[test]
    fn usage() {
        let concrete = ExclusiveValueRef::new(Concrete::default());
        let y = concrete.x;
        let copy = concrete.to_value();
        assert_eq!(y, copy.x);

        let abstr: ExclusiveRef<dyn Abstract> = ExclusiveRef::from_box(Box::new(Concrete { x: 2 }));
        let by_ref: &dyn Abstract = &*abstr;
        assert_eq!(by_ref.print(), 2);

        let holder = UseLater {
            r: ExclusiveValueRef::new(Later { id: 9 }),
        };
        assert_eq!(holder.r.id(), 9);
    }

    #[test]
    fn scenario() {
        let first = ExclusiveRef::new(Concrete { x: 5 });
        assert_eq!(first.x, 5);

        let mut second = first.clone();
        second.x = 7;

        assert_eq!(first.x, 5);
        assert_eq!(second.x, 7);
    }
}

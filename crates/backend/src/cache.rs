//! Lazy caching for resolved dispatch tables.
//!
//! [`OnceCache`] has the same semantics as `std::sync::OnceLock` for `Copy`
//! values, but also works on `no_std` targets.
//!
//! # Caching Strategy
//!
//! - **std**: Uses `OnceLock` for thread-safe lazy initialization
//! - **no_std with atomics**: Uses an atomic state machine
//! - **no_std without atomics**: Per-call computation (single-threaded embedded)

#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
use core::cell::UnsafeCell;
#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
use core::mem::MaybeUninit;

/// A write-once cache for a `Copy` value.
///
/// - Zero-cost after first initialization (one acquire load)
/// - Thread-safe on targets with atomics; the initializer runs at most once
/// - Falls back to per-call computation on targets without atomics
pub struct OnceCache<T: Copy> {
  #[cfg(feature = "std")]
  inner: std::sync::OnceLock<T>,

  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  state: core::sync::atomic::AtomicU8,
  #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
  value: UnsafeCell<MaybeUninit<T>>,

  #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
  _marker: core::marker::PhantomData<T>,
}

// SAFETY: the value is only written once, in the INITING state, by the thread
// that won the UNINIT -> INITING exchange; readers only observe it after the
// Release store of READY.
#[allow(unsafe_code)]
#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
unsafe impl<T: Copy + Send + Sync> Sync for OnceCache<T> {}

#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
const UNINIT: u8 = 0;
#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
const INITING: u8 = 1;
#[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
const READY: u8 = 2;

impl<T: Copy> OnceCache<T> {
  /// Create a new empty cache.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      #[cfg(feature = "std")]
      inner: std::sync::OnceLock::new(),

      #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
      state: core::sync::atomic::AtomicU8::new(UNINIT),
      #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
      value: UnsafeCell::new(MaybeUninit::uninit()),

      #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
      _marker: core::marker::PhantomData,
    }
  }

  /// Get the cached value, initializing with `f` if not yet set.
  #[inline]
  pub fn get_or_init(&self, f: impl FnOnce() -> T) -> T {
    #[cfg(feature = "std")]
    {
      *self.inner.get_or_init(f)
    }

    #[cfg(all(not(feature = "std"), target_has_atomic = "8"))]
    {
      use core::sync::atomic::Ordering;

      if self.state.load(Ordering::Acquire) == READY {
        // SAFETY: Value is initialized when state is READY
        #[allow(unsafe_code)]
        return unsafe { (*self.value.get()).assume_init() };
      }

      if self.state.compare_exchange(UNINIT, INITING, Ordering::AcqRel, Ordering::Acquire).is_ok() {
        let value = f();
        // SAFETY: We hold exclusive access during INITING state
        #[allow(unsafe_code)]
        unsafe {
          (*self.value.get()).write(value);
        }
        self.state.store(READY, Ordering::Release);
        return value;
      }

      // Another thread is initializing - spin wait
      while self.state.load(Ordering::Acquire) != READY {
        core::hint::spin_loop();
      }
      // SAFETY: Value is initialized when state is READY
      #[allow(unsafe_code)]
      unsafe {
        (*self.value.get()).assume_init()
      }
    }

    #[cfg(all(not(feature = "std"), not(target_has_atomic = "8")))]
    {
      f()
    }
  }
}

impl<T: Copy> Default for OnceCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

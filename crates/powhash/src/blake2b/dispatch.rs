use backend::OnceCache;

use super::{
  config,
  kernels::{Blake2b256KernelId, required_caps},
};

#[derive(Clone, Copy)]
struct ActiveDispatch {
  id: Blake2b256KernelId,
}

static ACTIVE: OnceCache<ActiveDispatch> = OnceCache::new();

#[inline]
#[must_use]
fn resolve() -> ActiveDispatch {
  let caps = platform::caps();
  let id = config::get().kernel(caps);
  let id = if caps.has(required_caps(id)) { id } else { Blake2b256KernelId::Portable };
  ActiveDispatch { id }
}

#[inline]
#[must_use]
fn active() -> ActiveDispatch {
  ACTIVE.get_or_init(resolve)
}

/// Kernel every new state compresses with.
#[inline]
#[must_use]
pub(crate) fn kernel_id() -> Blake2b256KernelId {
  active().id
}

/// Name of the kernel selected for this process, e.g. `"x86_64/ssse3"`.
#[inline]
#[must_use]
pub fn kernel_name() -> &'static str {
  active().id.as_str()
}

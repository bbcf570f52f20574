use std::ops::{Deref, DerefMut};

use crate::foundation::error::{CueflowError, CueflowResult};

/// Factory invoked when a [`Pool`] needs a new resource. Receives the slot
/// index the resource will occupy. A factory failure is fatal to the caller
/// and propagates unmodified.
pub type PoolFactory<T> = Box<dyn FnMut(usize) -> CueflowResult<T>>;

/// Counters describing pool occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total resources created over the pool's lifetime. Never decreases.
    pub created: usize,
    /// Resources currently available for acquisition.
    pub free: usize,
    /// Resources currently leased out.
    pub in_use: usize,
}

/// A pooled resource on loan from a [`Pool`].
///
/// Move-only; handing it back via [`Pool::release`] is the only way to return
/// the resource, so releasing twice or releasing something the pool never
/// issued cannot be expressed. A lease must be returned to the pool that
/// issued it.
#[derive(Debug)]
pub struct Lease<T> {
    slot: usize,
    value: T,
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Reusable-resource cache for objects that are acquired and released often.
///
/// Resources live in a slot arena; free slot indices are kept on an explicit
/// stack so acquire and release are O(1). When no slot is free, the pool
/// grows lazily through its factory. It never shrinks: the total resource
/// count is monotonically non-decreasing for the pool's lifetime, which
/// amortizes the allocation cost of render-target-shaped resources.
pub struct Pool<T> {
    // In-use slots hold `None`; their values travel with the lease.
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    factory: PoolFactory<T>,
}

impl<T> Pool<T> {
    /// Create a pool pre-warmed with `initial_count` resources.
    pub fn new(initial_count: usize, mut factory: PoolFactory<T>) -> CueflowResult<Self> {
        let mut slots = Vec::with_capacity(initial_count);
        let mut free = Vec::with_capacity(initial_count);
        for i in 0..initial_count {
            slots.push(Some(factory(i)?));
            free.push(i);
        }
        Ok(Self {
            slots,
            free,
            factory,
        })
    }

    /// Acquire any free resource, creating one when none are available.
    pub fn acquire_any(&mut self) -> CueflowResult<Lease<T>> {
        if let Some(slot) = self.free.pop() {
            let value = self.slots[slot].take().ok_or_else(|| {
                CueflowError::render("internal error: free pool slot held no resource")
            })?;
            return Ok(Lease { slot, value });
        }

        let slot = self.slots.len();
        let value = (self.factory)(slot)?;
        self.slots.push(None);
        Ok(Lease { slot, value })
    }

    /// Return a leased resource to its slot.
    pub fn release(&mut self, lease: Lease<T>) {
        let Lease { slot, value } = lease;
        debug_assert!(
            self.slots[slot].is_none(),
            "lease released into a pool that did not issue it"
        );
        self.slots[slot] = Some(value);
        self.free.push(slot);
    }

    /// Acquire a resource, run `f` on it, and release it afterwards.
    pub fn with_any<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> CueflowResult<R> {
        let mut lease = self.acquire_any()?;
        let out = f(&mut lease);
        self.release(lease);
        Ok(out)
    }

    /// Current occupancy counters.
    pub fn stats(&self) -> PoolStats {
        let created = self.slots.len();
        let free = self.free.len();
        PoolStats {
            created,
            free,
            in_use: created - free,
        }
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("created", &self.slots.len())
            .field("free", &self.free.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_pool(initial: usize) -> Pool<u32> {
        Pool::new(initial, Box::new(|i| Ok(i as u32))).unwrap()
    }

    #[test]
    fn acquire_release_reaches_steady_state() {
        let mut p = counting_pool(0);
        for _ in 0..16 {
            let lease = p.acquire_any().unwrap();
            p.release(lease);
        }
        let st = p.stats();
        assert_eq!(st.created, 1);
        assert_eq!(st.free, 1);
        assert_eq!(st.in_use, 0);
    }

    #[test]
    fn grows_lazily_when_exhausted() {
        let mut p = counting_pool(1);
        let a = p.acquire_any().unwrap();
        let b = p.acquire_any().unwrap();
        assert_eq!(p.stats().created, 2);
        assert_eq!(p.stats().in_use, 2);
        p.release(a);
        p.release(b);
        assert_eq!(p.stats().free, 2);
    }

    #[test]
    fn released_resource_is_reused() {
        let mut p = counting_pool(1);
        let a = p.acquire_any().unwrap();
        let a_value = *a;
        p.release(a);
        let b = p.acquire_any().unwrap();
        assert_eq!(*b, a_value);
        assert_eq!(p.stats().created, 1);
    }

    #[test]
    fn with_any_restores_free_count() {
        let mut p = counting_pool(2);
        let before = p.stats().free;
        let doubled = p.with_any(|v| *v * 2).unwrap();
        assert_eq!(doubled, 0);
        assert_eq!(p.stats().free, before);
    }

    #[test]
    fn factory_failure_propagates() {
        let mut p: Pool<u32> = Pool::new(
            0,
            Box::new(|_| Err(CueflowError::render("allocation failed"))),
        )
        .unwrap();
        assert!(p.acquire_any().is_err());
    }
}

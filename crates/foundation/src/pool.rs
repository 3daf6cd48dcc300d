use crate::handles::Handle;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity slot pool.
///
/// Storage is allocated once at construction and never grows. `checkout` and
/// `checkin` are O(1). A handle is valid from its checkout until its checkin;
/// after that the slot generation moves on, so checking in the same handle a
/// second time (or reading through it) is a no-op.
///
/// Ordering contract:
/// - Free slots are handed out lowest index first on a fresh pool.
/// - `iter` yields occupied slots in ascending slot index.
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    in_use: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            generation: 0,
            value: None,
        });
        // Stack of free slots; popping hands out slot 0 first.
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            in_use: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.in_use
    }

    pub fn is_empty(&self) -> bool {
        self.in_use == 0
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Moves `value` into a free slot.
    ///
    /// Returns `None` (dropping nothing but `value`) when the pool is exhausted.
    pub fn checkout(&mut self, value: T) -> Option<Handle> {
        let index = self.free.pop()?;
        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        self.in_use += 1;
        Some(Handle::new(index, slot.generation))
    }

    /// Returns the slot behind `handle` to the pool.
    ///
    /// Returns the stored value the first time; `None` for stale or foreign handles.
    pub fn checkin(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.in_use -= 1;
        Some(value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|v| (Handle::new(idx as u32, slot.generation), v))
        })
    }

    /// Checks every occupied slot back in. Outstanding handles become stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len() as u32).rev());
        self.in_use = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Pool;

    #[test]
    fn checkout_until_exhausted() {
        let mut pool = Pool::with_capacity(2);
        let a = pool.checkout("a").expect("slot");
        let b = pool.checkout("b").expect("slot");
        assert_ne!(a, b);
        assert!(pool.is_full());
        assert_eq!(pool.checkout("c"), None);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn checkin_is_idempotent() {
        let mut pool = Pool::with_capacity(1);
        let h = pool.checkout(7u32).expect("slot");
        assert_eq!(pool.checkin(h), Some(7));
        assert_eq!(pool.checkin(h), None);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn stale_handle_cannot_touch_reused_slot() {
        let mut pool = Pool::with_capacity(1);
        let old = pool.checkout(1u32).expect("slot");
        pool.checkin(old);
        let new = pool.checkout(2u32).expect("slot");

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(pool.get(old), None);
        assert_eq!(pool.checkin(old), None);
        assert_eq!(pool.get(new), Some(&2));
    }

    #[test]
    fn clear_releases_everything() {
        let mut pool = Pool::with_capacity(3);
        let a = pool.checkout(1u8).expect("slot");
        pool.checkout(2u8).expect("slot");
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.available(), 3);
        assert!(!pool.contains(a));
        assert_eq!(pool.iter().count(), 0);
    }

    #[test]
    fn iter_is_sorted_by_slot() {
        let mut pool = Pool::with_capacity(3);
        let a = pool.checkout('a').expect("slot");
        let b = pool.checkout('b').expect("slot");
        let c = pool.checkout('c').expect("slot");
        pool.checkin(b);
        let got: Vec<_> = pool.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(got, vec![(a, 'a'), (c, 'c')]);
    }
}

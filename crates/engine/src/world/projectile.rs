use super::actor::ActorId;

pub const DEFAULT_PROJECTILE_RANGE: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileConfig {
    pub strength: i32,
    pub gravity: bool,
    pub sensor: bool,
    /// Projectile-on-projectile contacts remove neither.
    pub collisions_ok: bool,
    pub disappear_on_collision: bool,
    /// Aimed throws travel at this speed when set.
    pub fixed_speed: Option<f32>,
    /// Scales the aim vector when no fixed speed is set.
    pub multiplier: f32,
    pub range: f32,
    /// Reuse the oldest in-flight projectile instead of dropping the throw.
    pub recycle_when_full: bool,
    pub rotate_to_direction: bool,
    pub throw_sound: Option<String>,
    pub disappear_sound: Option<String>,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            strength: 1,
            gravity: false,
            sensor: true,
            collisions_ok: false,
            disappear_on_collision: true,
            fixed_speed: None,
            multiplier: 1.0,
            range: DEFAULT_PROJECTILE_RANGE,
            recycle_when_full: false,
            rotate_to_direction: false,
            throw_sound: None,
            disappear_sound: None,
        }
    }
}

/// Fixed set of pre-created projectile actors handed out round-robin.
#[derive(Debug)]
pub struct ProjectilePool {
    slots: Vec<ActorId>,
    launched_at: Vec<Option<u64>>,
    cursor: usize,
    remaining: Option<u32>,
    throw_serial: u64,
    pub config: ProjectileConfig,
}

impl ProjectilePool {
    pub(crate) fn new(slots: Vec<ActorId>, config: ProjectileConfig) -> Self {
        let launched_at = vec![None; slots.len()];
        Self {
            slots,
            launched_at,
            cursor: 0,
            remaining: None,
            throw_serial: 0,
            config,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_actor(&self, slot: usize) -> Option<ActorId> {
        self.slots.get(slot).copied()
    }

    pub fn slot_actors(&self) -> &[ActorId] {
        &self.slots
    }

    pub fn in_flight(&self) -> usize {
        self.launched_at.iter().filter(|entry| entry.is_some()).count()
    }

    /// `None` means unlimited throws.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn set_remaining(&mut self, remaining: Option<u32>) {
        self.remaining = remaining;
    }

    /// Picks the slot for the next throw, or `None` when the throw is dropped.
    pub(crate) fn acquire(&mut self) -> Option<usize> {
        if self.remaining == Some(0) || self.slots.is_empty() {
            return None;
        }
        let count = self.slots.len();
        for step in 0..count {
            let slot = (self.cursor + step) % count;
            if self.launched_at[slot].is_none() {
                self.cursor = (slot + 1) % count;
                return Some(slot);
            }
        }
        if !self.config.recycle_when_full {
            return None;
        }
        let oldest = self
            .launched_at
            .iter()
            .enumerate()
            .filter_map(|(slot, serial)| serial.map(|serial| (serial, slot)))
            .min()
            .map(|(_, slot)| slot)?;
        self.cursor = (oldest + 1) % count;
        Some(oldest)
    }

    pub(crate) fn mark_launched(&mut self, slot: usize) {
        if let Some(entry) = self.launched_at.get_mut(slot) {
            *entry = Some(self.throw_serial);
            self.throw_serial = self.throw_serial.saturating_add(1);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub(crate) fn release(&mut self, slot: usize) {
        if let Some(entry) = self.launched_at.get_mut(slot) {
            *entry = None;
        }
    }

    pub fn is_in_flight(&self, slot: usize) -> bool {
        self.launched_at.get(slot).copied().flatten().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: u64) -> ProjectilePool {
        ProjectilePool::new((0..capacity).map(ActorId).collect(), ProjectileConfig::default())
    }

    #[test]
    fn exhausted_pool_drops_throws_by_default() {
        let mut pool = pool(2);
        for _ in 0..2 {
            let slot = pool.acquire().expect("free slot");
            pool.mark_launched(slot);
        }
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.in_flight(), 2);
    }

    #[test]
    fn recycling_reuses_oldest_slot() {
        let mut pool = pool(3);
        pool.config.recycle_when_full = true;
        for _ in 0..3 {
            let slot = pool.acquire().expect("free slot");
            pool.mark_launched(slot);
        }
        let recycled = pool.acquire().expect("recycled slot");
        assert_eq!(recycled, 0);
        pool.mark_launched(recycled);
        assert_eq!(pool.acquire(), Some(1));
    }

    #[test]
    fn budget_counts_down_and_blocks_at_zero() {
        let mut pool = pool(4);
        pool.set_remaining(Some(1));
        let slot = pool.acquire().expect("slot");
        pool.mark_launched(slot);
        assert_eq!(pool.remaining(), Some(0));
        assert_eq!(pool.acquire(), None);
    }

    #[test]
    fn released_slot_is_reused_round_robin() {
        let mut pool = pool(2);
        let first = pool.acquire().expect("slot");
        pool.mark_launched(first);
        pool.release(first);
        assert_eq!(pool.acquire(), Some(1));
        assert!(!pool.is_in_flight(first));
    }
}

//! Interrupt-free regions around non-interruptible SPM sequences.
//!
//! Leaving a region re-enables interrupts only if they were enabled when
//! it was entered, so nested regions and callers that already run with
//! interrupts disabled are never re-armed early.

use core::ops::{Deref, DerefMut};

use crate::hal::InterruptControl;

/// Interrupt state captured by [`enter`].
#[must_use = "pass this to `leave` to restore the interrupt state"]
#[derive(Debug, PartialEq, Eq)]
pub struct Restore {
    was_enabled: bool,
}

impl Restore {
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

/// Disable interrupts and return the previous state.
#[inline]
pub fn enter<H: InterruptControl + ?Sized>(hw: &mut H) -> Restore {
    let was_enabled = hw.interrupts_enabled();
    hw.disable_interrupts();
    Restore { was_enabled }
}

/// Undo the matching [`enter`].
#[inline]
pub fn leave<H: InterruptControl + ?Sized>(hw: &mut H, restore: Restore) {
    if restore.was_enabled {
        hw.enable_interrupts();
    }
}

/// Scoped form of [`enter`]/[`leave`]: interrupts stay disabled while the
/// guard lives and the saved state is restored on drop.
pub struct CriticalSection<'a, H: InterruptControl + ?Sized> {
    hw: &'a mut H,
    was_enabled: bool,
}

impl<'a, H: InterruptControl + ?Sized> CriticalSection<'a, H> {
    #[inline]
    pub fn new(hw: &'a mut H) -> Self {
        let Restore { was_enabled } = enter(hw);
        Self { hw, was_enabled }
    }
}

impl<H: InterruptControl + ?Sized> Deref for CriticalSection<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        &*self.hw
    }
}

impl<H: InterruptControl + ?Sized> DerefMut for CriticalSection<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut *self.hw
    }
}

impl<H: InterruptControl + ?Sized> Drop for CriticalSection<'_, H> {
    fn drop(&mut self) {
        leave(
            self.hw,
            Restore {
                was_enabled: self.was_enabled,
            },
        );
    }
}

/// Run `f` with interrupts disabled.
#[inline]
pub fn free<H, F, R>(hw: &mut H, f: F) -> R
where
    H: InterruptControl + ?Sized,
    F: FnOnce(&mut H) -> R,
{
    let mut cs = CriticalSection::new(hw);
    f(&mut *cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimulatedFlash;

    #[test]
    fn restores_enabled_state() {
        let mut hw = SimulatedFlash::new();
        let restore = enter(&mut hw);
        assert!(restore.was_enabled());
        assert!(!hw.interrupts_enabled());
        leave(&mut hw, restore);
        assert!(hw.interrupts_enabled());
    }

    #[test]
    fn keeps_disabled_caller_disabled() {
        let mut hw = SimulatedFlash::new();
        hw.disable_interrupts();
        {
            let cs = CriticalSection::new(&mut hw);
            assert!(!cs.interrupts_enabled());
        }
        assert!(!hw.interrupts_enabled());
    }

    #[test]
    fn nested_sections_restore_only_at_outermost() {
        let mut hw = SimulatedFlash::new();
        {
            let mut outer = CriticalSection::new(&mut hw);
            {
                let inner = CriticalSection::new(&mut *outer);
                assert!(!inner.interrupts_enabled());
            }
            assert!(!outer.interrupts_enabled());
        }
        assert!(hw.interrupts_enabled());
    }

    #[test]
    fn free_releases_on_early_return() {
        let mut hw = SimulatedFlash::new();
        let value = free(&mut hw, |hw| {
            if !hw.interrupts_enabled() {
                return 7;
            }
            0
        });
        assert_eq!(value, 7);
        assert!(hw.interrupts_enabled());
    }
}

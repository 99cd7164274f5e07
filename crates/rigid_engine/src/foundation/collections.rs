//! Specialized collection types

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Stable, generational reference to a body owned by a `BodyRegistry`
    ///
    /// A handle whose body was removed never resolves again, even after its
    /// slot is reused.
    pub struct BodyHandle;
}

/// Handle-based map keyed by body handles
pub type HandleMap<T> = SlotMap<BodyHandle, T>;

use bitflags::bitflags;

use crate::{FileRecord, record::NANOSECOND_PRECISION_WIDTH};

bitflags! {
    /// What every record of a snapshot provides.
    ///
    /// A snapshot starts with all capabilities and loses one as soon as a
    /// single record lacks it. Flags are never restored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Every record carries a content hash.
        const HASHES      = 0b0000_0001;
        /// Every record carries a modification time.
        const MOD_TIMES   = 0b0000_0010;
        /// Every modification time has full nanosecond precision.
        const NANOSECONDS = 0b0000_0100;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::all()
    }
}

impl Capabilities {
    /// Downgrade for whatever `record` is missing.
    pub fn observe(&mut self, record: &FileRecord) {
        if record.hash.is_none() {
            self.remove(Capabilities::HASHES);
        }

        match record.mod_time.as_deref() {
            None => self.remove(Capabilities::MOD_TIMES | Capabilities::NANOSECONDS),
            Some(ts) if ts.len() < NANOSECOND_PRECISION_WIDTH => {
                self.remove(Capabilities::NANOSECONDS)
            }
            Some(_) => {}
        }
    }

    #[inline]
    pub fn has_all_hashes(self) -> bool {
        self.contains(Capabilities::HASHES)
    }

    #[inline]
    pub fn has_all_mod_times(self) -> bool {
        self.contains(Capabilities::MOD_TIMES)
    }

    #[inline]
    pub fn has_nanoseconds_everywhere(self) -> bool {
        self.contains(Capabilities::NANOSECONDS)
    }
}

//! Indirect draw arguments written by the kernel.

use super::COUNTER_BYTE_OFFSET;

/// Arguments for an indexed indirect draw, laid out as wgpu (and D3D/Vulkan)
/// expect them in an indirect buffer.
///
/// `instance_count` doubles as the visibility counter: it sits at
/// [`COUNTER_BYTE_OFFSET`] and is only ever touched by the kernel through an
/// atomic add.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct DrawIndexedIndirectArgs {
    /// Indices per instance (36 for a unit cube).
    pub index_count: u32,
    /// Number of visible instances.
    pub instance_count: u32,
    /// First index in the index buffer.
    pub first_index: u32,
    /// Value added to each index before vertex fetch.
    pub base_vertex: i32,
    /// First instance id.
    pub first_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Size of the args in bytes.
    pub const SIZE: usize = size_of::<Self>();
    /// Number of `u32` words in the args.
    pub const WORDS: usize = Self::SIZE / 4;
    /// Word index of the visibility counter.
    pub const COUNTER_WORD: usize = COUNTER_BYTE_OFFSET as usize / 4;

    /// Pre-dispatch contents: index count set, counter zeroed.
    #[must_use]
    pub fn reset(index_count: u32) -> Self {
        Self {
            index_count,
            ..Self::default()
        }
    }

    /// Decode from the words of an indirect buffer.
    #[must_use]
    pub fn from_words(words: [u32; Self::WORDS]) -> Self {
        bytemuck::cast(words)
    }

    /// Encode to indirect buffer words.
    #[must_use]
    pub fn to_words(self) -> [u32; Self::WORDS] {
        bytemuck::cast(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_sits_at_byte_offset_four() {
        assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);
        assert_eq!(DrawIndexedIndirectArgs::COUNTER_WORD, 1);

        let args = DrawIndexedIndirectArgs {
            instance_count: 0xDEAD_BEEF,
            ..DrawIndexedIndirectArgs::reset(36)
        };
        let bytes = bytemuck::bytes_of(&args);
        let offset = COUNTER_BYTE_OFFSET as usize;
        assert_eq!(
            u32::from_ne_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3]
            ]),
            0xDEAD_BEEF
        );
    }

    #[test]
    fn reset_matches_initial_upload() {
        assert_eq!(DrawIndexedIndirectArgs::reset(36).to_words(), [36, 0, 0, 0, 0]);
    }
}

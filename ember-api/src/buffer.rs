#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberBufferDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberBufferGl;
use crate::{EmberBufferDef, EmberResult};

/// A buffer is a piece of memory that can be accessed by the GPU. Vertex, index and uniform
/// buffers are all host-visible and can be written with `copy_to_buffer`.
///
/// Buffers must not be dropped if they are in use by the GPU.
#[derive(Debug)]
pub enum EmberBuffer {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberBufferGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberBufferDx12),
}

impl EmberBuffer {
    /// Copy all the data in the given slice into the buffer, starting at `buffer_byte_offset`.
    /// The data must fit within the buffer.
    pub fn copy_to_buffer<T: Copy>(
        &self,
        buffer_byte_offset: u64,
        data: &[T],
    ) -> EmberResult<()> {
        let bytes = ember_base::memory::slice_as_bytes(data);
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberBuffer::Gl(inner) => inner.copy_to_buffer(buffer_byte_offset, bytes),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberBuffer::Dx12(inner) => inner.copy_to_buffer(buffer_byte_offset, bytes),
        }
    }

    /// Returns the definition used to create the buffer
    pub fn buffer_def(&self) -> &EmberBufferDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberBuffer::Gl(inner) => inner.buffer_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberBuffer::Dx12(inner) => inner.buffer_def(),
        }
    }

    /// Get the underlying gl API object. This provides access to any internally created
    /// gl objects.
    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_buffer(&self) -> Option<&EmberBufferGl> {
        match self {
            EmberBuffer::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberBuffer::Dx12(_) => None,
        }
    }

    /// Get the underlying dx12 API object. This provides access to any internally created
    /// dx12 objects.
    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_buffer(&self) -> Option<&EmberBufferDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberBuffer::Gl(_) => None,
            EmberBuffer::Dx12(inner) => Some(inner),
        }
    }
}

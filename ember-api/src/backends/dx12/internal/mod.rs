mod conversions;
pub(crate) use conversions::*;

mod descriptor_heap_allocator;
pub(crate) use descriptor_heap_allocator::*;

mod resource_state_arena;
pub(crate) use resource_state_arena::*;

pub(crate) mod gl_context;
pub(crate) use gl_context::*;

mod conversions;
pub(crate) use conversions::*;

mod deferred_destroy;
pub(crate) use deferred_destroy::*;

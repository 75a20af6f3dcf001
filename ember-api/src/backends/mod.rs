#[cfg(any(feature = "ember-dx12", test))]
pub mod dx12;

#[cfg(any(feature = "ember-gl", test))]
pub mod gl;

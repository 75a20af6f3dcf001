#[cfg(test)]
pub(crate) use image::*;

#[cfg(test)]
pub(crate) use raster::*;

#[cfg(test)]
pub(crate) use vertex_fetch::*;


#[cfg(all(feature = "ember-gl", not(test)))]
pub(crate) mod gl_window;

#[cfg(test)]
pub(crate) mod test_support;

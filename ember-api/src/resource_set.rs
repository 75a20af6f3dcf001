#[cfg(any(feature = "ember-dx12", test))]
use crate::dx12::EmberResourceSetDx12;
#[cfg(any(feature = "ember-gl", test))]
use crate::gl::EmberResourceSetGl;
use crate::*;
use fnv::FnvHashMap;
use std::sync::Arc;

/// The linear slot of a (set, binding) pair. Bindings must be below `SLOTS_PER_SET` so that slots
/// of different sets never overlap.
pub fn linear_slot(
    set: u32,
    binding: u32,
) -> EmberResult<u32> {
    if binding >= SLOTS_PER_SET {
        Err(format!(
            "Binding {} of set {} exceeds the {} bindings allowed per set",
            binding, set, SLOTS_PER_SET
        ))?;
    }

    set.checked_mul(SLOTS_PER_SET)
        .and_then(|base| base.checked_add(binding))
        .ok_or_else(|| format!("Set {} is too large", set).into())
}

/// Maps the linear slot of every binding to a sequential resource index, assigned in ascending
/// linear slot order. Two bindings sharing a (set, binding) pair fail.
pub fn remap_to_linear_bindings(
    bindings: &[EmberResourceBinding]
) -> EmberResult<FnvHashMap<u32, u32>> {
    let mut slots = Vec::with_capacity(bindings.len());
    for binding in bindings {
        slots.push((linear_slot(binding.set, binding.binding)?, binding));
    }
    slots.sort_by_key(|(slot, _)| *slot);

    let mut mapping = FnvHashMap::default();
    for (slot, binding) in slots {
        let resource_index = mapping.len() as u32;
        if mapping.insert(slot, resource_index).is_some() {
            Err(format!(
                "Binding {} (set {}, binding {}) uses linear slot {} which is already occupied",
                binding.name, binding.set, binding.binding, slot
            ))?;
        }
    }

    Ok(mapping)
}

/// A binding placed at its linear slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmberLinearBinding {
    pub name: String,
    pub binding_type: EmberResourceBindingType,
    pub linear_slot: u32,
    /// Position of the binding in ascending linear slot order
    pub resource_index: u32,
}

/// All bindings of a resource set definition in ascending linear slot order, searchable by name
#[derive(Clone, Debug)]
pub(crate) struct EmberLinearBindingTable {
    bindings: Vec<EmberLinearBinding>,
    by_name: FnvHashMap<String, usize>,
}

impl EmberLinearBindingTable {
    pub fn new(resource_set_def: &EmberResourceSetDef) -> EmberResult<Self> {
        let mapping = remap_to_linear_bindings(&resource_set_def.bindings)?;

        let mut bindings = Vec::with_capacity(resource_set_def.bindings.len());
        for binding in &resource_set_def.bindings {
            let slot = linear_slot(binding.set, binding.binding)?;
            bindings.push(EmberLinearBinding {
                name: binding.name.clone(),
                binding_type: binding.binding_type,
                linear_slot: slot,
                resource_index: mapping[&slot],
            });
        }
        bindings.sort_by_key(|binding| binding.linear_slot);

        let mut by_name = FnvHashMap::default();
        for (index, binding) in bindings.iter().enumerate() {
            if by_name.insert(binding.name.clone(), index).is_some() {
                Err(format!(
                    "Binding name {} is declared more than once",
                    binding.name
                ))?;
            }
        }

        Ok(EmberLinearBindingTable { bindings, by_name })
    }

    pub fn bindings(&self) -> &[EmberLinearBinding] {
        &self.bindings
    }

    /// True when both tables occupy the same linear slots with the same kinds of resource.
    /// Binding names are not compared.
    pub fn is_layout_compatible(
        &self,
        other: &EmberLinearBindingTable,
    ) -> bool {
        self.bindings.len() == other.bindings.len()
            && self
                .bindings
                .iter()
                .zip(&other.bindings)
                .all(|(a, b)| a.linear_slot == b.linear_slot && a.binding_type == b.binding_type)
    }

    /// Find a binding by name, failing if it does not exist or accepts a different kind of
    /// resource
    pub fn find(
        &self,
        name: &str,
        binding_type: EmberResourceBindingType,
    ) -> EmberResult<&EmberLinearBinding> {
        let binding = self
            .by_name
            .get(name)
            .map(|&index| &self.bindings[index])
            .ok_or_else(|| format!("Resource set has no binding named {}", name))?;

        if binding.binding_type != binding_type {
            Err(format!(
                "Binding {} expects a {:?}, not a {:?}",
                name, binding.binding_type, binding_type
            ))?;
        }

        Ok(binding)
    }
}

pub(crate) fn verify_uniform_buffer_write(buffer: &EmberBuffer) -> EmberResult<()> {
    if !buffer.buffer_def().resource_type.is_uniform_buffer() {
        Err(format!(
            "Only uniform buffers can be written to a uniform buffer binding, got {:?}",
            buffer.buffer_def().resource_type
        ))?;
    }

    Ok(())
}

pub(crate) fn verify_sampled_texture_write(texture: &EmberTexture) -> EmberResult<()> {
    let texture_def = texture.texture_def();
    if !texture_def.resource_type.is_texture() {
        Err(format!(
            "Only sampled textures can be written to an image binding, got {:?}",
            texture_def.resource_type
        ))?;
    }

    if texture_def.sample_count != EmberSampleCount::SampleCount1 {
        Err("Multisampled textures cannot be bound as a combined image sampler")?;
    }

    Ok(())
}

/// A bound instance of a resource set definition. Resources are written by binding name
/// and stay referenced by the set until they are overwritten or the set is dropped.
#[derive(Debug)]
pub enum EmberResourceSet {
    #[cfg(any(feature = "ember-gl", test))]
    Gl(EmberResourceSetGl),
    #[cfg(any(feature = "ember-dx12", test))]
    Dx12(EmberResourceSetDx12),
}

impl EmberResourceSet {
    pub fn resource_set_def(&self) -> &EmberResourceSetDef {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberResourceSet::Gl(inner) => inner.resource_set_def(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberResourceSet::Dx12(inner) => inner.resource_set_def(),
        }
    }

    /// Bindings in ascending linear slot order
    pub fn linear_bindings(&self) -> &[EmberLinearBinding] {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberResourceSet::Gl(inner) => inner.binding_table().bindings(),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberResourceSet::Dx12(inner) => inner.binding_table().bindings(),
        }
    }

    pub fn write_uniform_buffer(
        &self,
        buffer: &Arc<EmberBuffer>,
        name: &str,
    ) -> EmberResult<()> {
        verify_uniform_buffer_write(buffer)?;
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberResourceSet::Gl(inner) => inner.write_uniform_buffer(buffer, name),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberResourceSet::Dx12(inner) => inner.write_uniform_buffer(buffer, name),
        }
    }

    pub fn write_combined_image_sampler(
        &self,
        texture: &Arc<EmberTexture>,
        sampler: &Arc<EmberSampler>,
        name: &str,
    ) -> EmberResult<()> {
        verify_sampled_texture_write(texture)?;
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberResourceSet::Gl(inner) => inner.write_combined_image_sampler(texture, sampler, name),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberResourceSet::Dx12(inner) => {
                inner.write_combined_image_sampler(texture, sampler, name)
            }
        }
    }

    #[cfg(any(feature = "ember-gl", test))]
    pub fn gl_resource_set(&self) -> Option<&EmberResourceSetGl> {
        match self {
            EmberResourceSet::Gl(inner) => Some(inner),
            #[cfg(any(feature = "ember-dx12", test))]
            EmberResourceSet::Dx12(_) => None,
        }
    }

    #[cfg(any(feature = "ember-dx12", test))]
    pub fn dx12_resource_set(&self) -> Option<&EmberResourceSetDx12> {
        match self {
            #[cfg(any(feature = "ember-gl", test))]
            EmberResourceSet::Gl(_) => None,
            EmberResourceSet::Dx12(inner) => Some(inner),
        }
    }
}

use crate::dx12::d3d12;
use crate::dx12::{Dx12DescriptorAllocation, Dx12TrackedResource, EmberDeviceContextDx12};
use crate::{EmberResourceType, EmberResult, EmberSampleCount, EmberTextureDef};

/// A texture in a default heap. Its per-mip state is kept in the device's resource state arena,
/// and render target textures own the view the executor binds them with.
#[derive(Debug)]
pub struct EmberTextureDx12 {
    device_context: EmberDeviceContextDx12,
    texture_def: EmberTextureDef,
    tracked: Dx12TrackedResource,
    dxgi_format: d3d12::DXGI_FORMAT,
    render_target_view: Option<Dx12DescriptorAllocation>,
    depth_stencil_view: Option<Dx12DescriptorAllocation>,
}

impl EmberTextureDx12 {
    pub fn texture_def(&self) -> &EmberTextureDef {
        &self.texture_def
    }

    pub fn dx12_resource(&self) -> &d3d12::Dx12Resource {
        self.tracked.dx12_resource()
    }

    pub fn dxgi_format(&self) -> d3d12::DXGI_FORMAT {
        self.dxgi_format
    }

    pub(crate) fn tracked(&self) -> &Dx12TrackedResource {
        &self.tracked
    }

    pub(crate) fn render_target_view(&self) -> Option<d3d12::D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.render_target_view
            .as_ref()
            .map(|allocation| allocation.cpu_handle(0))
    }

    pub(crate) fn depth_stencil_view(&self) -> Option<d3d12::D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.depth_stencil_view
            .as_ref()
            .map(|allocation| allocation.cpu_handle(0))
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        texture_def: &EmberTextureDef,
        data: Option<&[u8]>,
    ) -> EmberResult<EmberTextureDx12> {
        texture_def.verify()?;
        let dxgi_format = d3d12::dxgi_format_for_texels(texture_def.format).ok_or_else(|| {
            format!(
                "Format {:?} is not supported by the dx12 backend",
                texture_def.format
            )
        })?;

        let is_multisampled = texture_def.sample_count != EmberSampleCount::SampleCount1;
        if is_multisampled && data.is_some() {
            Err("Multisampled textures cannot be created with initial data")?;
        }

        let is_depth = texture_def.format.is_depth();
        let mut flags = d3d12::D3D12_RESOURCE_FLAG_NONE;
        if is_depth {
            flags |= d3d12::D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL;
        } else if texture_def
            .resource_type
            .contains(EmberResourceType::RENDER_TARGET_COLOR)
        {
            flags |= d3d12::D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET;
        }

        let resource_desc = d3d12::D3D12_RESOURCE_DESC {
            Dimension: d3d12::D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Width: texture_def.extents.width as u64,
            Height: texture_def.extents.height,
            MipLevels: texture_def.mip_count as u16,
            Format: dxgi_format,
            SampleDesc: d3d12::DXGI_SAMPLE_DESC {
                Count: texture_def.sample_count.as_u32(),
                Quality: 0,
            },
            Flags: flags,
        };

        let device = device_context.dx12_device();
        let resource = device.create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_DEFAULT,
            &resource_desc,
            d3d12::D3D12_RESOURCE_STATE_COMMON,
        )?;
        resource.set_name(&format!(
            "Texture {:?} {:?}",
            texture_def.format, texture_def.extents
        ));

        let mut render_target_view = None;
        let mut depth_stencil_view = None;
        if flags & d3d12::D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET != 0 {
            let allocation = device_context.descriptor_heaps().rtv_heap.allocate(1)?;
            device.create_render_target_view(
                &resource,
                &d3d12::D3D12_RENDER_TARGET_VIEW_DESC {
                    Format: dxgi_format,
                    MipSlice: 0,
                },
                allocation.cpu_handle(0),
            );
            render_target_view = Some(allocation);
        }
        if flags & d3d12::D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL != 0 {
            let allocation = device_context.descriptor_heaps().dsv_heap.allocate(1)?;
            device.create_depth_stencil_view(
                &resource,
                &d3d12::D3D12_DEPTH_STENCIL_VIEW_DESC {
                    Format: dxgi_format,
                    MipSlice: 0,
                },
                allocation.cpu_handle(0),
            );
            depth_stencil_view = Some(allocation);
        }

        let tracked = device_context
            .resource_state_arena()
            .track(resource, d3d12::D3D12_RESOURCE_STATE_COMMON);

        let texture = EmberTextureDx12 {
            device_context: device_context.clone(),
            texture_def: texture_def.clone(),
            tracked,
            dxgi_format,
            render_target_view,
            depth_stencil_view,
        };

        if let Some(data) = data {
            texture.upload(data)?;
        }

        log::trace!(
            "Created dx12 texture {:?} {:?} {:?} with {} mips",
            texture.dx12_resource(),
            texture_def.format,
            texture_def.extents,
            texture_def.mip_count
        );

        Ok(texture)
    }

    // Stages every mip in one upload buffer and leaves the texture ready to be sampled
    fn upload(
        &self,
        data: &[u8],
    ) -> EmberResult<()> {
        let mip_data = crate::split_mip_data(&self.texture_def, data)?;
        let texel_size = self.texture_def.format.size_in_bytes()? as usize;

        let device = self.device_context.dx12_device();
        let resource = self.dx12_resource();
        let (footprints, total_size) =
            device.copyable_footprints(&resource.desc(), 0, mip_data.len() as u32, 0)?;

        let upload_buffer = device.create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_UPLOAD,
            &d3d12::D3D12_RESOURCE_DESC::buffer(total_size),
            d3d12::D3D12_RESOURCE_STATE_GENERIC_READ,
        )?;

        {
            let mut mapped = upload_buffer.map()?;
            for (mip, footprint) in mip_data.iter().zip(footprints.iter()) {
                let row_size = footprint.Footprint.Width as usize * texel_size;
                for (row_index, row) in mip.chunks(row_size).enumerate() {
                    let begin =
                        footprint.Offset as usize + row_index * footprint.Footprint.RowPitch as usize;
                    mapped[begin..begin + row_size].copy_from_slice(row);
                }
            }
        }

        self.device_context.execute_immediate(|command_list| {
            self.tracked
                .transition_all(command_list, d3d12::D3D12_RESOURCE_STATE_COPY_DEST);
            for (mip_level, footprint) in footprints.iter().enumerate() {
                command_list.copy_texture_region(
                    &d3d12::Dx12CopyLocation::Subresource {
                        resource: resource.clone(),
                        index: mip_level as u32,
                    },
                    0,
                    0,
                    &d3d12::Dx12CopyLocation::PlacedFootprint {
                        resource: upload_buffer.clone(),
                        footprint: *footprint,
                    },
                );
            }
            self.tracked.transition_all(
                command_list,
                d3d12::D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE,
            );
            Ok(())
        })
    }

    /// Copies one mip into a readback buffer and waits for it. Rows come back top row first.
    pub fn read_texels(
        &self,
        mip_level: u32,
    ) -> EmberResult<Vec<u8>> {
        if self.texture_def.sample_count != EmberSampleCount::SampleCount1 {
            Err("Multisampled textures cannot be read back, resolve them first")?;
        }

        let device = self.device_context.dx12_device();
        let resource = self.dx12_resource();
        let (footprints, total_size) =
            device.copyable_footprints(&resource.desc(), mip_level, 1, 0)?;
        let footprint = footprints[0];

        let readback_buffer = device.create_committed_resource(
            d3d12::D3D12_HEAP_TYPE_READBACK,
            &d3d12::D3D12_RESOURCE_DESC::buffer(total_size),
            d3d12::D3D12_RESOURCE_STATE_COPY_DEST,
        )?;

        self.device_context.execute_immediate(|command_list| {
            self.tracked.transition(
                command_list,
                mip_level..mip_level + 1,
                d3d12::D3D12_RESOURCE_STATE_COPY_SOURCE,
            );
            command_list.copy_texture_region(
                &d3d12::Dx12CopyLocation::PlacedFootprint {
                    resource: readback_buffer.clone(),
                    footprint: footprint,
                },
                0,
                0,
                &d3d12::Dx12CopyLocation::Subresource {
                    resource: resource.clone(),
                    index: mip_level,
                },
            );
            Ok(())
        })?;

        let texel_size = self.texture_def.format.size_in_bytes()? as usize;
        let texels = unpitch_rows(&readback_buffer.map()?, &footprint, texel_size);
        Ok(texels)
    }
}

/// Tightly packed rows out of a pitched footprint
pub(crate) fn unpitch_rows(
    data: &[u8],
    footprint: &d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT,
    texel_size: usize,
) -> Vec<u8> {
    let row_size = footprint.Footprint.Width as usize * texel_size;
    let mut texels = Vec::with_capacity(row_size * footprint.Footprint.Height as usize);
    for row_index in 0..footprint.Footprint.Height as usize {
        let begin = footprint.Offset as usize + row_index * footprint.Footprint.RowPitch as usize;
        texels.extend_from_slice(&data[begin..begin + row_size]);
    }
    texels
}

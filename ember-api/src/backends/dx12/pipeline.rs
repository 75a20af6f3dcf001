use crate::dx12::d3d12;
use crate::dx12::{dx12_blend_desc, EmberDeviceContextDx12};
use crate::{
    EmberLinearBindingTable, EmberPipelineDef, EmberResourceBindingType, EmberResult,
    EmberVertexAttributeRate,
};

/// Builds the root signature for a resource set. Every binding gets a descriptor in one CBV/SRV
/// table at its resource index, and every combined image sampler also gets a descriptor in a
/// sampler table in linear slot order. Empty tables are left out.
pub(crate) fn dx12_root_signature_desc(
    binding_table: &EmberLinearBindingTable
) -> (d3d12::Dx12RootSignatureDesc, Option<u32>, Option<u32>) {
    let mut cbv_srv_ranges = Vec::new();
    let mut sampler_ranges = Vec::new();
    let mut next_cbv_register = 0;
    let mut next_srv_register = 0;

    for binding in binding_table.bindings() {
        let range = |range_type, register, offset| d3d12::D3D12_DESCRIPTOR_RANGE {
            RangeType: range_type,
            NumDescriptors: 1,
            BaseShaderRegister: register,
            RegisterSpace: 0,
            OffsetInDescriptorsFromTableStart: offset,
        };

        match binding.binding_type {
            EmberResourceBindingType::UniformBuffer => {
                cbv_srv_ranges.push(range(
                    d3d12::D3D12_DESCRIPTOR_RANGE_TYPE_CBV,
                    next_cbv_register,
                    binding.resource_index,
                ));
                next_cbv_register += 1;
            }
            EmberResourceBindingType::CombinedImageSampler => {
                cbv_srv_ranges.push(range(
                    d3d12::D3D12_DESCRIPTOR_RANGE_TYPE_SRV,
                    next_srv_register,
                    binding.resource_index,
                ));
                sampler_ranges.push(range(
                    d3d12::D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER,
                    next_srv_register,
                    sampler_ranges.len() as u32,
                ));
                next_srv_register += 1;
            }
        }
    }

    let mut parameters = Vec::new();
    let mut cbv_srv_root_index = None;
    let mut sampler_root_index = None;
    if !cbv_srv_ranges.is_empty() {
        cbv_srv_root_index = Some(parameters.len() as u32);
        parameters.push(d3d12::Dx12RootParameter {
            DescriptorRanges: cbv_srv_ranges,
            ShaderVisibility: d3d12::D3D12_SHADER_VISIBILITY_ALL,
        });
    }

    if !sampler_ranges.is_empty() {
        sampler_root_index = Some(parameters.len() as u32);
        parameters.push(d3d12::Dx12RootParameter {
            DescriptorRanges: sampler_ranges,
            ShaderVisibility: d3d12::D3D12_SHADER_VISIBILITY_PIXEL,
        });
    }

    let desc = d3d12::Dx12RootSignatureDesc {
        Parameters: parameters,
        Flags: d3d12::D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
    };

    (desc, cbv_srv_root_index, sampler_root_index)
}

#[derive(Debug)]
pub struct EmberPipelineDx12 {
    pipeline_def: EmberPipelineDef,
    binding_table: EmberLinearBindingTable,
    root_signature: d3d12::Dx12RootSignature,
    pipeline_state: d3d12::Dx12PipelineState,
    // Root parameter of each descriptor table, if the resource set needs it
    cbv_srv_root_index: Option<u32>,
    sampler_root_index: Option<u32>,
    dx12_topology: d3d12::D3D_PRIMITIVE_TOPOLOGY,
}

impl EmberPipelineDx12 {
    pub fn pipeline_def(&self) -> &EmberPipelineDef {
        &self.pipeline_def
    }

    pub(crate) fn binding_table(&self) -> &EmberLinearBindingTable {
        &self.binding_table
    }

    pub fn dx12_root_signature(&self) -> &d3d12::Dx12RootSignature {
        &self.root_signature
    }

    pub fn dx12_pipeline_state(&self) -> &d3d12::Dx12PipelineState {
        &self.pipeline_state
    }

    pub(crate) fn cbv_srv_root_index(&self) -> Option<u32> {
        self.cbv_srv_root_index
    }

    pub(crate) fn sampler_root_index(&self) -> Option<u32> {
        self.sampler_root_index
    }

    pub fn dx12_topology(&self) -> d3d12::D3D_PRIMITIVE_TOPOLOGY {
        self.dx12_topology
    }

    /// Byte stride of the vertex buffer bound to the given slot
    pub(crate) fn vertex_buffer_stride(
        &self,
        buffer_index: u32,
    ) -> Option<u32> {
        self.pipeline_def
            .vertex_layout
            .buffers
            .get(buffer_index as usize)
            .map(|buffer| buffer.stride)
    }

    pub(crate) fn vertex_buffer_count(&self) -> u32 {
        self.pipeline_def.vertex_layout.buffers.len() as u32
    }

    pub fn new(
        device_context: &EmberDeviceContextDx12,
        pipeline_def: &EmberPipelineDef,
    ) -> EmberResult<Self> {
        let vertex_shader = pipeline_def
            .vertex_shader
            .dx12_shader_module()
            .ok_or("The vertex shader was not created by the dx12 backend")?;
        let fragment_shader = pipeline_def
            .fragment_shader
            .dx12_shader_module()
            .ok_or("The fragment shader was not created by the dx12 backend")?;

        let binding_table = EmberLinearBindingTable::new(&pipeline_def.resource_set_def)?;
        let (root_signature_desc, cbv_srv_root_index, sampler_root_index) =
            dx12_root_signature_desc(&binding_table);
        let root_signature = device_context
            .dx12_device()
            .create_root_signature(&root_signature_desc)?;

        // The input layout is ordered by location, position first
        let vertex_layout = &pipeline_def.vertex_layout;
        let mut attributes: Vec<_> = vertex_layout.attributes.iter().collect();
        attributes.sort_by_key(|attribute| attribute.location);

        let mut input_layout = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let format = d3d12::dxgi_format_for_texels(attribute.format).ok_or_else(|| {
                format!(
                    "Vertex attribute {} uses format {:?} which dx12 cannot fetch",
                    attribute.name, attribute.format
                )
            })?;

            let rate = vertex_layout.buffers[attribute.buffer_index as usize].rate;
            input_layout.push(d3d12::Dx12InputElement {
                SemanticName: attribute.name.clone(),
                SemanticIndex: 0,
                Format: format,
                InputSlot: attribute.buffer_index,
                AlignedByteOffset: attribute.byte_offset,
                InputSlotClass: rate.dx12_input_classification(),
                InstanceDataStepRate: match rate {
                    EmberVertexAttributeRate::Vertex => 0,
                    EmberVertexAttributeRate::Instance => 1,
                },
            });
        }

        let mut rtv_formats = [d3d12::DXGI_FORMAT_UNKNOWN; d3d12::D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT];
        for (rtv_format, &format) in rtv_formats.iter_mut().zip(&pipeline_def.color_formats) {
            *rtv_format = d3d12::dxgi_format_for_texels(format).ok_or_else(|| {
                format!("Format {:?} is not supported by the dx12 backend", format)
            })?;
        }

        let dsv_format = match pipeline_def.depth_stencil_format {
            Some(format) => d3d12::dxgi_format_for_texels(format).ok_or_else(|| {
                format!("Format {:?} is not supported by the dx12 backend", format)
            })?,
            None => d3d12::DXGI_FORMAT_UNKNOWN,
        };

        let pipeline_state_desc = d3d12::Dx12GraphicsPipelineDesc {
            pRootSignature: Some(root_signature.clone()),
            VS: vertex_shader.dx12_bytecode().to_vec(),
            PS: fragment_shader.dx12_bytecode().to_vec(),
            BlendState: dx12_blend_desc(
                &pipeline_def.blend_state,
                pipeline_def.color_formats.len(),
            ),
            SampleMask: u32::MAX,
            RasterizerState: (&pipeline_def.rasterizer_state).into(),
            DepthStencilState: (&pipeline_def.depth_state).into(),
            InputLayout: input_layout,
            PrimitiveTopologyType: pipeline_def.primitive_topology.dx12_topology_type(),
            NumRenderTargets: pipeline_def.color_formats.len() as u32,
            RTVFormats: rtv_formats,
            DSVFormat: dsv_format,
            SampleDesc: d3d12::DXGI_SAMPLE_DESC {
                Count: pipeline_def.sample_count.as_u32(),
                Quality: 0,
            },
        };

        let pipeline_state = device_context
            .dx12_device()
            .create_graphics_pipeline_state(&pipeline_state_desc)?;

        log::trace!(
            "Created dx12 pipeline with {} root parameters and {} input elements",
            root_signature_desc.Parameters.len(),
            pipeline_state_desc.InputLayout.len()
        );

        Ok(EmberPipelineDx12 {
            pipeline_def: pipeline_def.clone(),
            binding_table,
            root_signature,
            pipeline_state,
            cbv_srv_root_index,
            sampler_root_index,
            dx12_topology: pipeline_def.primitive_topology.dx12_topology(),
        })
    }
}

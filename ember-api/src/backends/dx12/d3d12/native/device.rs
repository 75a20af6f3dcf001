use super::*;
use std::ffi::CString;
use std::sync::Arc;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D as d3d;

struct Dx12DeviceInner {
    device: d3d12::ID3D12Device,
    info_queue: Option<d3d12::ID3D12InfoQueue>,
    adapter_name: String,
}

#[derive(Clone)]
pub struct Dx12Device {
    inner: Arc<Dx12DeviceInner>,
}

// ID3D12Device is free-threaded
unsafe impl Send for Dx12Device {}
unsafe impl Sync for Dx12Device {}

impl std::fmt::Debug for Dx12Device {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("Dx12Device")
            .field("adapter_name", &self.inner.adapter_name)
            .field("debug_layer", &self.inner.info_queue.is_some())
            .finish()
    }
}

fn hardware_adapter(factory: &dxgi::IDXGIFactory4) -> D3dResult<(dxgi::IDXGIAdapter1, String)> {
    for i in 0.. {
        let adapter = unsafe { factory.EnumAdapters1(i) }?;

        let mut desc = Default::default();
        unsafe { adapter.GetDesc1(&mut desc) }?;

        let name = wchar_to_string(&desc.Description);
        log::info!("Found adapter {:?}", name);
        log::debug!(
            "  Vendor Id: {} Device Id: {} Dedicated VMem: {}",
            desc.VendorId,
            desc.DeviceId,
            desc.DedicatedVideoMemory
        );

        if (dxgi::DXGI_ADAPTER_FLAG(desc.Flags) & dxgi::DXGI_ADAPTER_FLAG_SOFTWARE)
            != dxgi::DXGI_ADAPTER_FLAG_NONE
        {
            continue;
        }

        let supported = unsafe {
            d3d12::D3D12CreateDevice(
                &adapter,
                d3d::D3D_FEATURE_LEVEL_11_0,
                std::ptr::null_mut::<Option<d3d12::ID3D12Device>>(),
            )
        }
        .is_ok();

        if supported {
            return Ok((adapter, name));
        }
    }

    // EnumAdapters1 fails with DXGI_ERROR_NOT_FOUND once the adapters run out
    Err(E_FAIL)
}

/// Create a device on the first hardware adapter that supports feature level 11.0. The debug
/// layer is enabled before the device is created.
pub fn create_device(debug_layer: bool) -> D3dResult<Dx12Device> {
    let mut debug_layer_enabled = false;
    if debug_layer {
        unsafe {
            let mut debug: Option<d3d12::ID3D12Debug> = None;
            if let Some(debug) = d3d12::D3D12GetDebugInterface(&mut debug).ok().and(debug) {
                debug.EnableDebugLayer();
                debug_layer_enabled = true;
            } else {
                log::warn!("Could not acquire D3D12GetDebugInterface");
            }
        }
    }

    let factory_flags = if debug_layer_enabled {
        dxgi::DXGI_CREATE_FACTORY_DEBUG
    } else {
        0
    };
    let factory: dxgi::IDXGIFactory4 = unsafe { dxgi::CreateDXGIFactory2(factory_flags) }?;
    let (adapter, adapter_name) = hardware_adapter(&factory)?;

    let mut device: Option<d3d12::ID3D12Device> = None;
    unsafe { d3d12::D3D12CreateDevice(&adapter, d3d::D3D_FEATURE_LEVEL_11_0, &mut device) }?;
    let device = device.ok_or(E_FAIL)?;

    let info_queue = if debug_layer_enabled {
        let info_queue = device.cast::<d3d12::ID3D12InfoQueue>()?;
        unsafe {
            info_queue.SetBreakOnSeverity(d3d12::D3D12_MESSAGE_SEVERITY_CORRUPTION, true)?;
        }
        Some(info_queue)
    } else {
        None
    };

    Ok(Dx12Device {
        inner: Arc::new(Dx12DeviceInner {
            device,
            info_queue,
            adapter_name,
        }),
    })
}

impl Dx12Device {
    pub fn create_committed_resource(
        &self,
        heap_type: D3D12_HEAP_TYPE,
        desc: &D3D12_RESOURCE_DESC,
        initial_state: D3D12_RESOURCE_STATES,
    ) -> D3dResult<Dx12Resource> {
        let heap_properties = d3d12::D3D12_HEAP_PROPERTIES {
            Type: d3d12::D3D12_HEAP_TYPE(heap_type as _),
            CPUPageProperty: d3d12::D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
            MemoryPoolPreference: d3d12::D3D12_MEMORY_POOL_UNKNOWN,
            CreationNodeMask: 0,
            VisibleNodeMask: 0,
        };
        let native_desc = resource_desc(desc);

        let mut resource: Option<d3d12::ID3D12Resource> = None;
        unsafe {
            self.inner.device.CreateCommittedResource(
                &heap_properties,
                d3d12::D3D12_HEAP_FLAG_NONE,
                &native_desc,
                resource_states(initial_state),
                None,
                &mut resource,
            )
        }?;

        Ok(Dx12Resource::new(resource.ok_or(E_FAIL)?, *desc))
    }

    pub fn create_descriptor_heap(
        &self,
        desc: &D3D12_DESCRIPTOR_HEAP_DESC,
    ) -> D3dResult<Dx12DescriptorHeap> {
        let native_desc = d3d12::D3D12_DESCRIPTOR_HEAP_DESC {
            Type: d3d12::D3D12_DESCRIPTOR_HEAP_TYPE(desc.Type as _),
            NumDescriptors: desc.NumDescriptors,
            Flags: d3d12::D3D12_DESCRIPTOR_HEAP_FLAGS(desc.Flags as _),
            NodeMask: 0,
        };
        let heap: d3d12::ID3D12DescriptorHeap =
            unsafe { self.inner.device.CreateDescriptorHeap(&native_desc) }?;

        Ok(Dx12DescriptorHeap::new(heap, *desc))
    }

    pub fn descriptor_handle_increment_size(
        &self,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) -> u32 {
        unsafe {
            self.inner
                .device
                .GetDescriptorHandleIncrementSize(d3d12::D3D12_DESCRIPTOR_HEAP_TYPE(heap_type as _))
        }
    }

    pub fn create_constant_buffer_view(
        &self,
        desc: &D3D12_CONSTANT_BUFFER_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let native_desc = d3d12::D3D12_CONSTANT_BUFFER_VIEW_DESC {
            BufferLocation: desc.BufferLocation,
            SizeInBytes: desc.SizeInBytes,
        };
        unsafe {
            self.inner
                .device
                .CreateConstantBufferView(Some(&native_desc), cpu_descriptor_handle(dest));
        }
    }

    pub fn create_shader_resource_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_SHADER_RESOURCE_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let mut native_desc = d3d12::D3D12_SHADER_RESOURCE_VIEW_DESC::default();
        native_desc.Format = dxgi_format(desc.Format);
        native_desc.Shader4ComponentMapping = d3d12::D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING;
        if resource.desc().SampleDesc.Count > 1 {
            native_desc.ViewDimension = d3d12::D3D12_SRV_DIMENSION_TEXTURE2DMS;
        } else {
            native_desc.ViewDimension = d3d12::D3D12_SRV_DIMENSION_TEXTURE2D;
            native_desc.Anonymous.Texture2D = d3d12::D3D12_TEX2D_SRV {
                MostDetailedMip: desc.MostDetailedMip,
                MipLevels: desc.MipLevels,
                PlaneSlice: 0,
                ResourceMinLODClamp: 0.0,
            };
        }

        unsafe {
            self.inner.device.CreateShaderResourceView(
                resource.dx12_resource(),
                Some(&native_desc),
                cpu_descriptor_handle(dest),
            );
        }
    }

    pub fn create_sampler(
        &self,
        desc: &D3D12_SAMPLER_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let native_desc = sampler_desc(desc);
        unsafe {
            self.inner
                .device
                .CreateSampler(&native_desc, cpu_descriptor_handle(dest));
        }
    }

    pub fn create_render_target_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_RENDER_TARGET_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let mut native_desc = d3d12::D3D12_RENDER_TARGET_VIEW_DESC::default();
        native_desc.Format = dxgi_format(desc.Format);
        if resource.desc().SampleDesc.Count > 1 {
            native_desc.ViewDimension = d3d12::D3D12_RTV_DIMENSION_TEXTURE2DMS;
        } else {
            native_desc.ViewDimension = d3d12::D3D12_RTV_DIMENSION_TEXTURE2D;
            native_desc.Anonymous.Texture2D = d3d12::D3D12_TEX2D_RTV {
                MipSlice: desc.MipSlice,
                PlaneSlice: 0,
            };
        }

        unsafe {
            self.inner.device.CreateRenderTargetView(
                resource.dx12_resource(),
                Some(&native_desc),
                cpu_descriptor_handle(dest),
            );
        }
    }

    pub fn create_depth_stencil_view(
        &self,
        resource: &Dx12Resource,
        desc: &D3D12_DEPTH_STENCIL_VIEW_DESC,
        dest: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) {
        let mut native_desc = d3d12::D3D12_DEPTH_STENCIL_VIEW_DESC::default();
        native_desc.Format = dxgi_format(desc.Format);
        native_desc.Flags = d3d12::D3D12_DSV_FLAG_NONE;
        if resource.desc().SampleDesc.Count > 1 {
            native_desc.ViewDimension = d3d12::D3D12_DSV_DIMENSION_TEXTURE2DMS;
        } else {
            native_desc.ViewDimension = d3d12::D3D12_DSV_DIMENSION_TEXTURE2D;
            native_desc.Anonymous.Texture2D = d3d12::D3D12_TEX2D_DSV {
                MipSlice: desc.MipSlice,
            };
        }

        unsafe {
            self.inner.device.CreateDepthStencilView(
                resource.dx12_resource(),
                Some(&native_desc),
                cpu_descriptor_handle(dest),
            );
        }
    }

    pub fn copy_descriptors_simple(
        &self,
        num_descriptors: u32,
        dest_start: D3D12_CPU_DESCRIPTOR_HANDLE,
        src_start: D3D12_CPU_DESCRIPTOR_HANDLE,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
    ) {
        unsafe {
            self.inner.device.CopyDescriptorsSimple(
                num_descriptors,
                cpu_descriptor_handle(dest_start),
                cpu_descriptor_handle(src_start),
                d3d12::D3D12_DESCRIPTOR_HEAP_TYPE(heap_type as _),
            );
        }
    }

    pub fn create_root_signature(
        &self,
        desc: &Dx12RootSignatureDesc,
    ) -> D3dResult<Dx12RootSignature> {
        // The ranges must outlive serialization
        let ranges: Vec<Vec<d3d12::D3D12_DESCRIPTOR_RANGE>> = desc
            .Parameters
            .iter()
            .map(|parameter| {
                parameter
                    .DescriptorRanges
                    .iter()
                    .map(|range| d3d12::D3D12_DESCRIPTOR_RANGE {
                        RangeType: d3d12::D3D12_DESCRIPTOR_RANGE_TYPE(range.RangeType as _),
                        NumDescriptors: range.NumDescriptors,
                        BaseShaderRegister: range.BaseShaderRegister,
                        RegisterSpace: range.RegisterSpace,
                        OffsetInDescriptorsFromTableStart: range.OffsetInDescriptorsFromTableStart,
                    })
                    .collect()
            })
            .collect();

        let parameters: Vec<d3d12::D3D12_ROOT_PARAMETER> = desc
            .Parameters
            .iter()
            .zip(&ranges)
            .map(|(parameter, ranges)| {
                let mut native_parameter = d3d12::D3D12_ROOT_PARAMETER::default();
                native_parameter.ParameterType = d3d12::D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE;
                native_parameter.ShaderVisibility =
                    d3d12::D3D12_SHADER_VISIBILITY(parameter.ShaderVisibility as _);
                native_parameter.Anonymous.DescriptorTable = d3d12::D3D12_ROOT_DESCRIPTOR_TABLE {
                    NumDescriptorRanges: ranges.len() as u32,
                    pDescriptorRanges: ranges.as_ptr(),
                };
                native_parameter
            })
            .collect();

        let native_desc = d3d12::D3D12_ROOT_SIGNATURE_DESC {
            NumParameters: parameters.len() as u32,
            pParameters: parameters.as_ptr(),
            NumStaticSamplers: 0,
            pStaticSamplers: std::ptr::null(),
            Flags: d3d12::D3D12_ROOT_SIGNATURE_FLAGS(desc.Flags as _),
        };

        let mut blob = None;
        let mut error_blob = None;
        let serialized = unsafe {
            d3d12::D3D12SerializeRootSignature(
                &native_desc,
                d3d::D3D_ROOT_SIGNATURE_VERSION_1,
                &mut blob,
                Some(&mut error_blob),
            )
        };

        if let Err(e) = serialized {
            if let Some(error_blob) = &error_blob {
                let message = unsafe {
                    std::slice::from_raw_parts(
                        error_blob.GetBufferPointer() as *const u8,
                        error_blob.GetBufferSize(),
                    )
                };
                log::error!(
                    "Root signature serialization failed: {}",
                    String::from_utf8_lossy(message)
                );
            }
            return Err(e.into());
        }

        let blob = blob.ok_or(E_FAIL)?;
        let root_signature: d3d12::ID3D12RootSignature = unsafe {
            let bytes = std::slice::from_raw_parts(
                blob.GetBufferPointer() as *const u8,
                blob.GetBufferSize(),
            );
            self.inner.device.CreateRootSignature(0, bytes)
        }?;

        Ok(Dx12RootSignature::new(root_signature, desc.clone()))
    }

    pub fn create_graphics_pipeline_state(
        &self,
        desc: &Dx12GraphicsPipelineDesc,
    ) -> D3dResult<Dx12PipelineState> {
        let root_signature = desc.pRootSignature.as_ref().ok_or(E_INVALIDARG)?;

        // Semantic names are read through raw pointers, keep them alive until the PSO exists
        let semantic_names = desc
            .InputLayout
            .iter()
            .map(|element| CString::new(element.SemanticName.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| E_INVALIDARG)?;

        let input_elements: Vec<d3d12::D3D12_INPUT_ELEMENT_DESC> = desc
            .InputLayout
            .iter()
            .zip(&semantic_names)
            .map(|(element, name)| d3d12::D3D12_INPUT_ELEMENT_DESC {
                SemanticName: windows::core::PCSTR::from_raw(name.as_ptr() as *const u8),
                SemanticIndex: element.SemanticIndex,
                Format: dxgi_format(element.Format),
                InputSlot: element.InputSlot,
                AlignedByteOffset: element.AlignedByteOffset,
                InputSlotClass: d3d12::D3D12_INPUT_CLASSIFICATION(element.InputSlotClass as _),
                InstanceDataStepRate: element.InstanceDataStepRate,
            })
            .collect();

        let mut rtv_formats = [dxgi::Common::DXGI_FORMAT_UNKNOWN; 8];
        for (native, format) in rtv_formats.iter_mut().zip(&desc.RTVFormats) {
            *native = dxgi_format(*format);
        }

        let pipeline_desc = d3d12::D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: ::windows::core::ManuallyDrop::new(root_signature.dx12_root_signature()),
            VS: d3d12::D3D12_SHADER_BYTECODE {
                pShaderBytecode: desc.VS.as_ptr() as *const std::ffi::c_void,
                BytecodeLength: desc.VS.len(),
            },
            PS: d3d12::D3D12_SHADER_BYTECODE {
                pShaderBytecode: desc.PS.as_ptr() as *const std::ffi::c_void,
                BytecodeLength: desc.PS.len(),
            },
            DS: Default::default(),
            HS: Default::default(),
            GS: Default::default(),
            StreamOutput: Default::default(),
            BlendState: blend_desc(&desc.BlendState),
            SampleMask: desc.SampleMask,
            RasterizerState: rasterizer_desc(&desc.RasterizerState, desc.SampleDesc.Count > 1),
            DepthStencilState: depth_stencil_desc(&desc.DepthStencilState),
            InputLayout: d3d12::D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_elements.as_ptr(),
                NumElements: input_elements.len() as u32,
            },
            IBStripCutValue: d3d12::D3D12_INDEX_BUFFER_STRIP_CUT_VALUE_DISABLED,
            PrimitiveTopologyType: d3d12::D3D12_PRIMITIVE_TOPOLOGY_TYPE(
                desc.PrimitiveTopologyType as _,
            ),
            NumRenderTargets: desc.NumRenderTargets,
            RTVFormats: rtv_formats,
            DSVFormat: dxgi_format(desc.DSVFormat),
            SampleDesc: sample_desc(desc.SampleDesc),
            NodeMask: 0,
            CachedPSO: Default::default(),
            Flags: d3d12::D3D12_PIPELINE_STATE_FLAG_NONE,
        };

        let pipeline_state: d3d12::ID3D12PipelineState =
            unsafe { self.inner.device.CreateGraphicsPipelineState(&pipeline_desc) }?;

        Ok(Dx12PipelineState::new(pipeline_state))
    }

    pub fn create_command_queue(&self) -> D3dResult<Dx12CommandQueue> {
        let desc = d3d12::D3D12_COMMAND_QUEUE_DESC {
            Type: d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
            Priority: d3d12::D3D12_COMMAND_QUEUE_PRIORITY_NORMAL.0,
            Flags: d3d12::D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };
        let queue: d3d12::ID3D12CommandQueue =
            unsafe { self.inner.device.CreateCommandQueue(&desc) }?;
        Ok(Dx12CommandQueue::new(queue))
    }

    /// The list is created open
    pub fn create_command_list(&self) -> D3dResult<Dx12CommandList> {
        let allocator: d3d12::ID3D12CommandAllocator = unsafe {
            self.inner
                .device
                .CreateCommandAllocator(d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT)
        }?;
        let command_list: d3d12::ID3D12GraphicsCommandList = unsafe {
            self.inner.device.CreateCommandList(
                0,
                d3d12::D3D12_COMMAND_LIST_TYPE_DIRECT,
                &allocator,
                None,
            )
        }?;

        Dx12CommandList::new(allocator, command_list)
    }

    pub fn create_fence(
        &self,
        initial_value: u64,
    ) -> D3dResult<Dx12Fence> {
        let fence: d3d12::ID3D12Fence = unsafe {
            self.inner
                .device
                .CreateFence(initial_value, d3d12::D3D12_FENCE_FLAG_NONE)
        }?;
        Ok(Dx12Fence::new(fence))
    }

    pub fn create_query_heap(
        &self,
        desc: &D3D12_QUERY_HEAP_DESC,
    ) -> D3dResult<Dx12QueryHeap> {
        let native_desc = d3d12::D3D12_QUERY_HEAP_DESC {
            Type: d3d12::D3D12_QUERY_HEAP_TYPE(desc.Type as _),
            Count: desc.Count,
            NodeMask: 0,
        };

        let mut heap: Option<d3d12::ID3D12QueryHeap> = None;
        unsafe { self.inner.device.CreateQueryHeap(&native_desc, &mut heap) }?;
        Ok(Dx12QueryHeap::new(heap.ok_or(E_FAIL)?, *desc))
    }

    /// Layout of texture subresources copied into a buffer. Returns the footprints and the total
    /// size.
    pub fn copyable_footprints(
        &self,
        desc: &D3D12_RESOURCE_DESC,
        first_subresource: u32,
        num_subresources: u32,
        base_offset: u64,
    ) -> D3dResult<(Vec<D3D12_PLACED_SUBRESOURCE_FOOTPRINT>, u64)> {
        if first_subresource + num_subresources > desc.subresource_count() {
            return Err(E_INVALIDARG);
        }

        let native_desc = resource_desc(desc);
        let mut layouts =
            vec![d3d12::D3D12_PLACED_SUBRESOURCE_FOOTPRINT::default(); num_subresources as usize];
        let mut total_size = 0;
        unsafe {
            self.inner.device.GetCopyableFootprints(
                &native_desc,
                first_subresource,
                num_subresources,
                base_offset,
                Some(layouts.as_mut_ptr()),
                None,
                None,
                Some(&mut total_size),
            );
        }

        let footprints = layouts
            .iter()
            .map(|layout| D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
                Offset: layout.Offset,
                Footprint: D3D12_SUBRESOURCE_FOOTPRINT {
                    Format: layout.Footprint.Format.0 as DXGI_FORMAT,
                    Width: layout.Footprint.Width,
                    Height: layout.Footprint.Height,
                    RowPitch: layout.Footprint.RowPitch,
                },
            })
            .collect();

        Ok((footprints, total_size))
    }

    pub fn adapter_name(&self) -> String {
        self.inner.adapter_name.clone()
    }

    /// Number of messages the debug layer has reported. Always zero without the debug layer.
    pub fn stored_message_count(&self) -> u64 {
        match &self.inner.info_queue {
            Some(info_queue) => unsafe { info_queue.GetNumStoredMessages() },
            None => 0,
        }
    }
}

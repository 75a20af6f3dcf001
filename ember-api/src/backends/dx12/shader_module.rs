use crate::dx12::EmberDeviceContextDx12;
use crate::{EmberResult, EmberShaderPackage, EmberShaderStageFlags};

const DXBC_MAGIC: &[u8] = b"DXBC";

/// A compiled shader container for one stage. Bytecode is handed to the pipeline state as is.
#[derive(Debug)]
pub struct EmberShaderModuleDx12 {
    shader_package: EmberShaderPackage,
    bytecode: Vec<u8>,
}

impl EmberShaderModuleDx12 {
    pub fn shader_package(&self) -> &EmberShaderPackage {
        &self.shader_package
    }

    pub fn dx12_bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn new(
        _device_context: &EmberDeviceContextDx12,
        shader_package: &EmberShaderPackage,
    ) -> EmberResult<Self> {
        let bytecode = shader_package
            .dx12
            .as_ref()
            .ok_or("The shader package has no DXBC container for the dx12 backend")?;

        if shader_package.stage != EmberShaderStageFlags::VERTEX
            && shader_package.stage != EmberShaderStageFlags::FRAGMENT
        {
            Err(format!(
                "A dx12 shader module has exactly one stage, got {:?}",
                shader_package.stage
            ))?;
        }

        if !bytecode.starts_with(DXBC_MAGIC) {
            Err("The dx12 shader bytecode is not a DXBC container")?;
        }

        Ok(EmberShaderModuleDx12 {
            shader_package: shader_package.clone(),
            bytecode: bytecode.clone(),
        })
    }
}

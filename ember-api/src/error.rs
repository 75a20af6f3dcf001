use std::sync::Arc;

pub type EmberResult<T> = Result<T, EmberError>;

/// Generic error that contains all the different kinds of errors that may occur when using the API
#[derive(Debug, Clone)]
pub enum EmberError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    /// An error code reported by the GL context (GL_INVALID_OPERATION, etc.)
    GlError(u32),
    /// An HRESULT reported by the dx12 device
    Dx12Error(i32),
    /// A fence wait exceeded its timeout. The device is considered lost afterwards.
    SubmissionTimeout,
    DeviceLost,
}

impl std::error::Error for EmberError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            EmberError::StringError(_) => None,
            EmberError::IoError(ref e) => Some(&**e),
            EmberError::GlError(_) => None,
            EmberError::Dx12Error(_) => None,
            EmberError::SubmissionTimeout => None,
            EmberError::DeviceLost => None,
        }
    }
}

impl core::fmt::Display for EmberError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            EmberError::StringError(ref e) => e.fmt(fmt),
            EmberError::IoError(ref e) => e.fmt(fmt),
            EmberError::GlError(error_code) => write!(fmt, "GL error 0x{:04X}", error_code),
            EmberError::Dx12Error(hresult) => write!(fmt, "D3D12 error HRESULT 0x{:08X}", hresult),
            EmberError::SubmissionTimeout => {
                write!(fmt, "Timed out waiting for a submission to complete")
            }
            EmberError::DeviceLost => write!(fmt, "The device was lost"),
        }
    }
}

impl From<&str> for EmberError {
    fn from(str: &str) -> Self {
        EmberError::StringError(str.to_string())
    }
}

impl From<String> for EmberError {
    fn from(string: String) -> Self {
        EmberError::StringError(string)
    }
}

impl From<std::io::Error> for EmberError {
    fn from(error: std::io::Error) -> Self {
        EmberError::IoError(Arc::new(error))
    }
}

#[cfg(any(feature = "ember-dx12", test))]
impl From<crate::dx12::d3d12::HRESULT> for EmberError {
    fn from(hresult: crate::dx12::d3d12::HRESULT) -> Self {
        EmberError::Dx12Error(hresult.0)
    }
}

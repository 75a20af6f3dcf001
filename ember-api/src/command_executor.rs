use crate::*;
use fnv::FnvHashMap;
use std::sync::{Arc, Weak};

/// Why a command was not replayed. Replay never stops early, a skipped command is logged and the
/// next one runs.
#[derive(Debug, Clone)]
pub enum EmberReplayError {
    /// The resource the command references was dropped before replay
    Expired(&'static str),
    /// The command cannot be applied to the current state
    Invalid(String),
}

impl core::fmt::Display for EmberReplayError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match self {
            EmberReplayError::Expired(what) => write!(fmt, "the {} no longer exists", what),
            EmberReplayError::Invalid(message) => message.fmt(fmt),
        }
    }
}

impl From<&str> for EmberReplayError {
    fn from(str: &str) -> Self {
        EmberReplayError::Invalid(str.to_string())
    }
}

impl From<String> for EmberReplayError {
    fn from(string: String) -> Self {
        EmberReplayError::Invalid(string)
    }
}

impl From<EmberError> for EmberReplayError {
    fn from(error: EmberError) -> Self {
        EmberReplayError::Invalid(error.to_string())
    }
}

pub type EmberReplayResult = Result<(), EmberReplayError>;

/// Counts of one replay
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmberReplayStats {
    pub executed_commands: u32,
    pub skipped_commands: u32,
}

/// Replays recorded commands against a native API. Each backend has one.
pub trait EmberCommandExecutor {
    /// Apply one command. An `Err` skips the command and replay continues.
    fn execute_command(
        &mut self,
        command: &EmberRenderCommand,
    ) -> EmberReplayResult;

    /// Called once after the last command was replayed
    fn end_replay(&mut self) {}

    /// Replay every command of the recorder in record order
    fn execute_commands(
        &mut self,
        recorder: &EmberCommandRecorder,
    ) -> EmberReplayStats {
        profiling::scope!("execute_commands");

        let mut stats = EmberReplayStats::default();
        for command in recorder.commands() {
            log::trace!("replay {}", command.name());
            match self.execute_command(command) {
                Ok(()) => stats.executed_commands += 1,
                Err(error) => {
                    match &error {
                        EmberReplayError::Expired(_) => {
                            log::warn!("Skipped {}: {}", command.name(), error)
                        }
                        EmberReplayError::Invalid(_) => {
                            log::error!("Skipped {}: {}", command.name(), error)
                        }
                    }
                    stats.skipped_commands += 1;
                }
            }
        }

        self.end_replay();
        stats
    }
}

pub(crate) fn upgrade<T>(
    weak: &Weak<T>,
    what: &'static str,
) -> Result<Arc<T>, EmberReplayError> {
    weak.upgrade().ok_or(EmberReplayError::Expired(what))
}

pub(crate) fn verify_viewport(
    viewport: &EmberViewport,
    extents: EmberExtents2D,
) -> EmberReplayResult {
    if !(viewport.width > 0.0) || !(viewport.height > 0.0) {
        Err(format!("Viewport {:?} has no area", viewport))?;
    }

    if viewport.x < 0.0
        || viewport.y < 0.0
        || viewport.x + viewport.width > extents.width as f32
        || viewport.y + viewport.height > extents.height as f32
    {
        Err(format!(
            "Viewport {:?} exceeds the render target {:?}",
            viewport, extents
        ))?;
    }

    let depth_range = 0.0..=1.0;
    if !depth_range.contains(&viewport.min_depth) || !depth_range.contains(&viewport.max_depth) {
        Err(format!(
            "Viewport depth range {}..{} is outside 0..1",
            viewport.min_depth, viewport.max_depth
        ))?;
    }

    Ok(())
}

pub(crate) fn verify_depth_clear_value(value: &EmberDepthStencilClearValue) -> EmberReplayResult {
    if !(0.0..=1.0).contains(&value.depth) {
        Err(format!("Depth clear value {} is outside 0..1", value.depth))?;
    }

    Ok(())
}

/// Scissors and clear rects must have an area and lie within the render target
pub(crate) fn verify_rect(
    rect: &EmberScissor,
    extents: EmberExtents2D,
) -> EmberReplayResult {
    if rect.width == 0 || rect.height == 0 {
        Err(format!("Rect {:?} has no area", rect))?;
    }

    let right = rect.x as i64 + rect.width as i64;
    let bottom = rect.y as i64 + rect.height as i64;
    if rect.x < 0 || rect.y < 0 || right > extents.width as i64 || bottom > extents.height as i64 {
        Err(format!(
            "Rect {:?} exceeds the render target {:?}",
            rect, extents
        ))?;
    }

    Ok(())
}

/// A resolve is skipped rather than clamped when the source does not fit the destination
pub(crate) fn verify_resolve(
    source_extents: EmberExtents2D,
    source_format: EmberFormat,
    destination_extents: EmberExtents2D,
    destination_format: EmberFormat,
) -> EmberReplayResult {
    if source_extents.width > destination_extents.width
        || source_extents.height > destination_extents.height
    {
        Err(format!(
            "Resolve source {:?} is larger than the destination {:?}",
            source_extents, destination_extents
        ))?;
    }

    if source_format != destination_format {
        Err(format!(
            "Cannot resolve {:?} into {:?}",
            source_format, destination_format
        ))?;
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub(crate) struct BoundVertexBuffer {
    pub buffer: Arc<EmberBuffer>,
    pub byte_offset: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct BoundIndexBuffer {
    pub buffer: Arc<EmberBuffer>,
    pub index_type: EmberIndexType,
    pub byte_offset: u64,
}

/// State both executors track across one replay. Strong references are taken when a command
/// binds something, so later commands of the same replay see a consistent set of resources.
#[derive(Debug, Default)]
pub(crate) struct EmberBoundState {
    pub pipeline: Option<Arc<EmberPipeline>>,
    pub vertex_buffers: FnvHashMap<u32, BoundVertexBuffer>,
    pub index_buffer: Option<BoundIndexBuffer>,
    pub resource_set: Option<Arc<EmberResourceSet>>,
    pub render_target: EmberRenderTarget,
    pub render_target_extents: EmberExtents2D,
    pub viewport: EmberViewport,
    pub scissor: EmberScissor,
    pub blend_factor: [f32; 4],
    pub stencil_reference: u8,
    debug_group_depth: u32,
}

impl EmberBoundState {
    /// Viewport and scissor reset to cover the new target
    pub fn bind_render_target(
        &mut self,
        render_target: EmberRenderTarget,
        extents: EmberExtents2D,
    ) {
        self.render_target = render_target;
        self.render_target_extents = extents;
        self.viewport = EmberViewport::covering(extents);
        self.scissor = EmberScissor::covering(extents);
    }

    pub fn unbind_render_target(&mut self) {
        self.render_target = EmberRenderTarget::None;
        self.render_target_extents = EmberExtents2D::default();
    }

    pub fn has_render_target(&self) -> bool {
        self.render_target.target_type() != EmberRenderTargetType::None
    }

    /// The pipeline a draw uses, failing if a draw cannot be issued with the current bindings
    pub fn verify_draw(&self) -> Result<Arc<EmberPipeline>, EmberReplayError> {
        let pipeline = self
            .pipeline
            .clone()
            .ok_or_else(|| EmberReplayError::from("No pipeline is bound"))?;

        if !self.has_render_target() {
            Err("No render target is bound")?;
        }

        for attribute in &pipeline.pipeline_def().vertex_layout.attributes {
            if !self.vertex_buffers.contains_key(&attribute.buffer_index) {
                Err(format!(
                    "Vertex buffer slot {} used by attribute {} has no buffer bound",
                    attribute.buffer_index, attribute.name
                ))?;
            }
        }

        Ok(pipeline)
    }

    pub fn verify_indexed_draw(
        &self
    ) -> Result<(Arc<EmberPipeline>, BoundIndexBuffer), EmberReplayError> {
        let pipeline = self.verify_draw()?;
        let index_buffer = self
            .index_buffer
            .clone()
            .ok_or_else(|| EmberReplayError::from("No index buffer is bound"))?;
        Ok((pipeline, index_buffer))
    }

    pub fn verify_color_attachment(
        &self,
        attachment_index: u32,
    ) -> EmberReplayResult {
        let color_attachment_count = self.render_target.color_attachment_count()?;
        if attachment_index >= color_attachment_count {
            Err(format!(
                "Color attachment {} does not exist, the render target has {}",
                attachment_index, color_attachment_count
            ))?;
        }

        Ok(())
    }

    pub fn verify_depth_attachment(&self) -> EmberReplayResult {
        if !self.render_target.has_depth_attachment()? {
            Err("The render target has no depth attachment")?;
        }

        Ok(())
    }

    pub fn push_debug_group(&mut self) {
        self.debug_group_depth += 1;
    }

    pub fn pop_debug_group(&mut self) -> EmberReplayResult {
        if self.debug_group_depth == 0 {
            Err("pop_debug_group without a matching push_debug_group")?;
        }

        self.debug_group_depth -= 1;
        Ok(())
    }

    /// Debug groups still open, closing them
    pub fn take_open_debug_groups(&mut self) -> u32 {
        std::mem::take(&mut self.debug_group_depth)
    }
}

use crate::frame::{self, CommandList, FrameError, GraphicsEngine};
use crate::resource::ResourceRegistry;

use super::Gpu;

impl GraphicsEngine for Gpu<'_> {
    fn begin_render(&mut self) -> Result<Option<CommandList>, FrameError> {
        if !self.is_drawable() {
            return Ok(None);
        }

        let frame = match self.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let action = self.handle_surface_error(&err);
                return action.into_frame_result(err);
            }
        };
        self.pending = Some(frame);

        let mut list = self.spare_list.take().unwrap_or_default();
        list.reset();
        Ok(Some(list))
    }

    fn end_render(&mut self, list: CommandList, resources: &ResourceRegistry) {
        let Some(mut gpu_frame) = self.pending.take() else {
            log::warn!("end_render without a frame in flight; dropping command list");
            self.spare_list = Some(list);
            return;
        };

        {
            let mut pass = self.begin_pass(&mut gpu_frame.encoder, &gpu_frame.view);
            if let Err(err) = frame::replay(&list, resources, &mut pass) {
                log::error!("dropping frame contents: {err}");
            }
        }

        self.submit(gpu_frame);
        self.spare_list = Some(list);
    }
}

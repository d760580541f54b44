use crate::resource::ResourceRegistry;

use super::engine::{FrameError, GraphicsEngine};
use super::submitter::FrameSubmitter;

/// Outcome of one poll of the host's message queue.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Message {
    /// A message was dispatched; this tick does not render.
    Handled,
    /// Nothing was pending.
    Idle,
    /// The host asked to exit.
    Quit,
}

/// The window/message-pump side of the frontend.
pub trait Host {
    /// Handles at most one pending batch of messages without blocking.
    fn poll_message(&mut self) -> Message;

    /// Runs `f` against the host's engine, or returns `None` if it has none yet.
    fn with_engine<R>(&mut self, f: impl FnOnce(&mut dyn GraphicsEngine) -> R) -> Option<R>;
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
}

/// Pumps `host` until it quits, rendering one frame on every idle tick.
pub fn run_message_loop<H: Host>(
    host: &mut H,
    submitter: &mut FrameSubmitter,
    resources: &ResourceRegistry,
) -> Result<LoopSummary, FrameError> {
    let mut summary = LoopSummary::default();

    loop {
        summary.ticks += 1;

        match host.poll_message() {
            Message::Quit => break,
            Message::Handled => summary.frames_skipped += 1,
            Message::Idle => {
                let rendered = host
                    .with_engine(|engine| submitter.submit_frame(engine, resources))
                    .transpose()?
                    .unwrap_or(false);

                if rendered {
                    summary.frames_rendered += 1;
                } else {
                    summary.frames_skipped += 1;
                }
            }
        }
    }

    log::info!(
        "message loop exited after {} ticks ({} frames rendered, {} skipped)",
        summary.ticks,
        summary.frames_rendered,
        summary.frames_skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::frame::command::{DrawIndexedArgs, RenderCommand};
    use crate::frame::submitter::tests::{triangle_bindings, RecordingEngine};

    /// Host double replaying a fixed message script, then quitting.
    struct ScriptedHost {
        script: VecDeque<Message>,
        engine: RecordingEngine,
    }

    impl ScriptedHost {
        fn new(script: &[Message]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                engine: RecordingEngine::default(),
            }
        }
    }

    impl Host for ScriptedHost {
        fn poll_message(&mut self) -> Message {
            self.script.pop_front().unwrap_or(Message::Quit)
        }

        fn with_engine<R>(&mut self, f: impl FnOnce(&mut dyn GraphicsEngine) -> R) -> Option<R> {
            Some(f(&mut self.engine))
        }
    }

    fn run(host: &mut ScriptedHost) -> Result<LoopSummary, FrameError> {
        let mut submitter = FrameSubmitter::new(triangle_bindings());
        run_message_loop(host, &mut submitter, &ResourceRegistry::new())
    }

    #[test]
    fn renders_only_on_idle_ticks() {
        use Message::*;
        let mut host = ScriptedHost::new(&[Idle, Handled, Idle, Handled, Handled, Idle]);

        let summary = run(&mut host).unwrap();

        assert_eq!(
            summary,
            LoopSummary {
                ticks: 7,
                frames_rendered: 3,
                frames_skipped: 3,
            }
        );
        assert_eq!(host.engine.submitted.len(), 3);
    }

    #[test]
    fn each_frame_draws_the_triangle_once() {
        let mut host = ScriptedHost::new(&[Message::Idle; 5]);
        run(&mut host).unwrap();

        let first = &host.engine.submitted[0];
        for list in &host.engine.submitted {
            assert_eq!(list, first);
            let draws: Vec<_> = list
                .commands()
                .iter()
                .filter_map(|c| match c {
                    RenderCommand::DrawIndexedInstanced(args) => Some(*args),
                    _ => None,
                })
                .collect();
            assert_eq!(draws, vec![DrawIndexedArgs::single(3)]);
            assert_eq!(draws[0].instance_count, 1);
        }
    }

    #[test]
    fn quit_stops_before_rendering() {
        let mut host = ScriptedHost::new(&[Message::Quit, Message::Idle]);
        let summary = run(&mut host).unwrap();

        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.frames_rendered, 0);
        assert!(host.engine.submitted.is_empty());
        assert_eq!(host.script.len(), 1);
    }

    #[test]
    fn device_loss_ends_the_loop() {
        let mut host = ScriptedHost::new(&[Message::Idle, Message::Idle]);
        host.engine.lose_device = true;

        assert!(matches!(run(&mut host), Err(FrameError::DeviceLost(_))));
    }

    #[test]
    fn engine_skips_count_as_skipped_frames() {
        let mut host = ScriptedHost::new(&[Message::Idle, Message::Idle]);
        host.engine.skip_next = 1;

        let summary = run(&mut host).unwrap();
        assert_eq!(summary.frames_rendered, 1);
        assert_eq!(summary.frames_skipped, 1);
    }
}

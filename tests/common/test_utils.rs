#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use layer_cake::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validate =
    dyn Fn(&Context, &mut FrameCounter, &mut image::RgbaImage) -> Result<ImageTestResult, anyhow::Error>;

#[cfg(feature = "integration-tests")]
pub(crate) fn validator<F>(validate: F) -> Box<Validate>
where
    F: Fn(&Context, &mut FrameCounter, &mut image::RgbaImage) -> Result<ImageTestResult, anyhow::Error>
        + 'static,
{
    Box::new(validate)
}

/// Wraps a flow and checks every rendered frame with `validate`.
#[cfg(feature = "integration-tests")]
pub(crate) struct ImageCheck {
    pub(crate) inner: Box<dyn GraphicsFlow<FrameCounter>>,
    pub(crate) validate: Box<Validate>,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter> for ImageCheck {
    fn on_init(&mut self, ctx: &mut Context, state: &mut FrameCounter) -> Out {
        self.inner.on_init(ctx, state)
    }

    fn on_update(&mut self, ctx: &Context, state: &mut FrameCounter, dt: instant::Duration) -> Out {
        state.progress();
        self.inner.on_update(ctx, state, dt)
    }

    fn on_device_events(
        &mut self,
        ctx: &Context,
        state: &mut FrameCounter,
        event: &winit::event::DeviceEvent,
    ) -> Out {
        self.inner.on_device_events(ctx, state, event)
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        state: &mut FrameCounter,
        event: &winit::event::WindowEvent,
    ) -> Out {
        self.inner.on_window_events(ctx, state, event)
    }

    fn on_render(&self) -> Render<'_> {
        self.inner.on_render()
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

/// Renders nothing; only the clear colour ends up in the frame.
#[cfg(feature = "integration-tests")]
pub(crate) struct Empty(pub(crate) wgpu::Color);

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter> for Empty {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out {
        ctx.clear_colour = self.0;
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut FrameCounter, _: instant::Duration) -> Out {
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut FrameCounter, _: &winit::event::DeviceEvent) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut FrameCounter, _: &winit::event::WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut FrameCounter,
        _: &mut image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

/// Runs the event loop with a single flow until `validate` passes or fails.
///
/// `$build` maps an `InitContext` to `anyhow::Result<Box<dyn GraphicsFlow<FrameCounter>>>`.
#[macro_export]
macro_rules! golden_image_test {
    ($build:expr, $validate:expr) => {{
        use crate::common::test_utils::{FrameCounter, ImageCheck, validator};
        use layer_cake::context::InitContext;
        use layer_cake::flow::{FlowConstructor, FlowFuture, GraphicsFlow};

        let constructor: FlowConstructor<FrameCounter> = Box::new(|ctx: InitContext| -> FlowFuture<FrameCounter> {
            Box::pin(async move {
                let inner: Box<dyn GraphicsFlow<FrameCounter>> = ($build)(ctx)?;
                let flow: Box<dyn GraphicsFlow<FrameCounter>> = Box::new(ImageCheck {
                    inner,
                    validate: validator($validate),
                });
                Ok::<_, anyhow::Error>(flow)
            })
        });

        layer_cake::flow::run(vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}

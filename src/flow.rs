//! Flow control and application event loop.
//!
//! A "flow" is a self-contained scene that handles input, updates its state and provides
//! renderable objects each frame. The engine owns the window, the GPU [`Context`] and the flows,
//! and drives them from winit's event loop.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S>`] is the trait for scenes that handle events and rendering
//! - [`Out`] is the output type of the lifecycle hooks, used to reconfigure the context
//! - [`LoopState`] tracks whether frames should currently be produced
//!
//! # Lifecycle
//!
//! While the loop is running, each frame:
//! 1. Collect window/device events and pass them to the orbit controller and the flows
//! 2. Advance the camera (damping) and upload the camera uniform
//! 3. Call `on_update` on every flow
//! 4. Collect every flow's `on_render()` into pipeline batches
//! 5. Render shadow casters into the shadow map
//! 6. Render the batches into the frame buffer and present
//! 7. Request the next redraw

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{model::DrawModel, texture::Texture},
    render::{Batches, Render},
};

///
/// The output type of every lifecycle hook.
///
/// `Out::Configure` can be used to modify the Context at runtime, for instance to change the
/// clear colour, the camera or the lights.
///
/// `Empty` is the default output used when nothing needs to change.
///
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context) -> anyhow::Result<()>>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(feature = "integration-tests")]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure context (camera, lights, clear colour)
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_update()` is called every frame while the loop is running
/// 4. `on_render()` is called each frame and specifies how to render `self`
///
pub trait GraphicsFlow<S> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out;

    /// Update state every frame. `dt` is the time since the previous frame.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out;

    /// Handle raw device events.
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out;

    /// Handle window events (pointer input, resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;

    /// Inspect the rendered frame. The loop exits once every flow reports `Passed`.
    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut S,
        texture: &mut image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error>;
}

impl<State> Debug for dyn GraphicsFlow<State> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// The future a flow constructor returns.
pub type FlowFuture<S> = Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow<S>>>>>>;

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a boxed `GraphicsFlow`,
/// or the reason it could not be built.
pub type FlowConstructor<S> = Box<dyn FnOnce(InitContext) -> FlowFuture<S>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
    Running,
    Suspended,
}

/// Whether the render loop should produce frames.
///
/// The loop runs only while the application is resumed and the window is neither occluded nor
/// minimized (zero-sized). It starts suspended until the platform resumes the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopState {
    suspended: bool,
    occluded: bool,
    minimized: bool,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            suspended: true,
            occluded: false,
            minimized: false,
        }
    }
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        if self.suspended || self.occluded || self.minimized {
            LoopPhase::Suspended
        } else {
            LoopPhase::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == LoopPhase::Running
    }

    pub fn resumed(&mut self) -> LoopPhase {
        self.suspended = false;
        self.phase()
    }

    pub fn suspended(&mut self) -> LoopPhase {
        self.suspended = true;
        self.phase()
    }

    pub fn occluded(&mut self, occluded: bool) -> LoopPhase {
        self.occluded = occluded;
        self.phase()
    }

    pub fn resized(&mut self, width: u32, height: u32) -> LoopPhase {
        self.minimized = width == 0 || height == 0;
        self.phase()
    }
}

/// Application state bundle: GPU context, app state, and surface status.
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    /// Zero-sized windows (minimized) keep the previous configuration.
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx.camera.controller.set_viewport_height(height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    #[cfg(feature = "integration-tests")]
    fn get_test_texture(&self) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: self.get_test_3d_extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    #[cfg(feature = "integration-tests")]
    fn get_test_3d_extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.ctx.config.width,
            height: self.ctx.config.height,
            depth_or_array_layers: 1,
        }
    }

    /// Rows of a texture-to-buffer copy must be aligned to 256 bytes.
    #[cfg(feature = "integration-tests")]
    fn padded_bytes_per_row(&self) -> u32 {
        let unpadded = 4 * self.ctx.config.width;
        unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
    }

    fn render(
        &mut self,
        graphics_flows: &mut [Box<dyn GraphicsFlow<State>>],
        #[cfg(feature = "integration-tests")] async_runtime: &tokio::runtime::Runtime,
        #[cfg(feature = "integration-tests")] event_loop: &winit::event_loop::EventLoopProxy<
            FlowEvent<State>,
        >,
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        #[cfg(not(feature = "integration-tests"))]
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        #[cfg(feature = "integration-tests")]
        let tex = self.get_test_texture();
        #[cfg(feature = "integration-tests")]
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        let mut batches = Batches::default();
        graphics_flows
            .iter()
            .for_each(|flow| flow.on_render().set_pipelines(&mut batches));

        if self.ctx.light.uniform.casts_shadow() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.light.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&self.ctx.pipelines.shadow);
            for instanced in batches.shadow_casters() {
                shadow_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                shadow_pass.draw_shadow_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.light.shadow_bind_group,
                );
            }
        }

        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            let pipelines = &self.ctx.pipelines.materials;
            // Shadow catchers blend over whatever is already there, so they go last
            for (pipeline, batch) in [
                (&pipelines.standard, &batches.standard),
                (&pipelines.polygon_offset, &batches.polygon_offset),
                (&pipelines.shadow_catcher, &batches.shadow_catcher),
            ] {
                if batch.is_empty() {
                    continue;
                }
                render_pass.set_pipeline(pipeline);
                for instanced in batch {
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_model_instanced(
                        instanced.model,
                        0..instanced.amount as u32,
                        &self.ctx.camera.bind_group,
                        &self.ctx.light.bind_group,
                    );
                }
            }
        }

        #[cfg(feature = "integration-tests")]
        let output_buffer = {
            let bytes_per_row = self.padded_bytes_per_row();
            let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                size: (bytes_per_row * self.ctx.config.height) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: Some("Golden Image Test Output Buffer"),
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &tex,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(bytes_per_row),
                        rows_per_image: Some(self.ctx.config.height),
                    },
                },
                self.get_test_3d_extent(),
            );
            output_buffer
        };

        self.ctx.queue.submit(iter::once(encoder.finish()));

        #[cfg(feature = "integration-tests")]
        {
            match async_runtime.block_on(self.read_back(&output_buffer)) {
                Ok(mut img) => {
                    let state = &mut self.state;
                    let mut all_passed = true;
                    for flow in graphics_flows.iter_mut() {
                        match flow.render_to_texture(&self.ctx, state, &mut img) {
                            Ok(ImageTestResult::Passed) => (),
                            Ok(ImageTestResult::Waiting) => all_passed = false,
                            Ok(ImageTestResult::Failed) => {
                                all_passed = false;
                                let _ = event_loop
                                    .send_event(FlowEvent::Failed(anyhow::anyhow!("image assertion failed")));
                            }
                            Err(e) => {
                                all_passed = false;
                                let _ = event_loop.send_event(FlowEvent::Failed(e));
                            }
                        }
                    }
                    if all_passed && event_loop.send_event(FlowEvent::Exit).is_err() {
                        log::error!("all image assertions passed but the event loop is gone");
                    }
                }
                Err(e) => {
                    let _ = event_loop.send_event(FlowEvent::Failed(e));
                }
            }
        }

        output.present();
        Ok(())
    }

    /// Copies the mapped buffer into an RGBA image, dropping the row padding.
    #[cfg(feature = "integration-tests")]
    async fn read_back(&self, output_buffer: &wgpu::Buffer) -> anyhow::Result<image::RgbaImage> {
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.ctx.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("the buffer mapping was dropped"))??;

        let width = self.ctx.config.width;
        let height = self.ctx.config.height;
        let bytes_per_row = self.padded_bytes_per_row() as usize;
        let bgra = matches!(
            self.ctx.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for row in data.chunks(bytes_per_row).take(height as usize) {
            for px in row[..(width * 4) as usize].chunks_exact(4) {
                if bgra {
                    pixels.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                } else {
                    pixels.extend_from_slice(px);
                }
            }
        }
        drop(data);
        output_buffer.unmap();
        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow::anyhow!("read back fewer pixels than the frame has"))
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(any(target_arch = "wasm32", feature = "integration-tests")), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    state: Option<AppState<State>>,
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    // The constructors are taken on the first resume.
    constructors: Option<Vec<FlowConstructor<State>>>,
    loop_state: LoopState,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl<State> App<State>
where
    State: 'static + Default,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        constructors: Vec<FlowConstructor<State>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            loop_state: LoopState::new(),
            last_time: Instant::now(),
            error: None,
        })
    }

    /// Stops the loop; `run` returns the error.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("fatal: {error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn initialize(
        &mut self,
        event_loop: &ActiveEventLoop,
        mut app_state: AppState<State>,
        mut flows: Vec<Box<dyn GraphicsFlow<State>>>,
    ) {
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        self.loop_state.resized(size.width, size.height);
        for flow in flows.iter_mut() {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            if let Err(e) = handle_flow_output(&mut app_state.ctx, out) {
                self.fail(event_loop, e);
                return;
            }
        }
        log::info!("{} flow(s) initialized", flows.len());
        app_state.ctx.window.request_redraw();
        self.graphics_flows = flows;
        self.state = Some(app_state);
        self.last_time = Instant::now();
    }
}

pub(crate) enum FlowEvent<State: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    },
    #[allow(dead_code)]
    Failed(anyhow::Error),
    #[allow(dead_code)]
    Exit,
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.loop_state.resumed();
        if let Some(state) = &self.state {
            log::info!("resumed");
            self.last_time = Instant::now();
            state.ctx.window.request_redraw();
            return;
        }
        // Initialization is already in flight
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("layer cake");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()))
                }
                None => {
                    self.fail(
                        event_loop,
                        anyhow::anyhow!("no <canvas id=\"{CANVAS_ID}\"> element in the page"),
                    );
                    return;
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;
            let init_ctx: InitContext = (&app_state.ctx).into();
            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone leverages the internal reference counts of the wgpu handles
                .map(|constructor| constructor(init_ctx.clone()))
                .collect();
            let flows = futures::future::join_all(flow_futures)
                .await
                .into_iter()
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok::<_, anyhow::Error>((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.initialize(event_loop, app_state, flows),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("the event loop closed before initialization finished");
                }
            });
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("suspended");
        self.loop_state.suspended();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                self.initialize(event_loop, state, flows);
            }
            FlowEvent::Failed(e) => self.fail(event_loop, e),
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        let mut failure = None;
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_device_events(&state.ctx, &mut state.state, &event);
            if let Err(e) = handle_flow_output(&mut state.ctx, out) {
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        let mut failure = None;
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_window_events(&state.ctx, &mut state.state, &event);
            if let Err(e) = handle_flow_output(&mut state.ctx, out) {
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            self.fail(event_loop, e);
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let was_running = self.loop_state.is_running();
                state.resize(size.width, size.height);
                if self.loop_state.resized(size.width, size.height) == LoopPhase::Running
                    && !was_running
                {
                    self.last_time = Instant::now();
                    state.ctx.window.request_redraw();
                }
            }
            WindowEvent::Occluded(occluded) => {
                let was_running = self.loop_state.is_running();
                if self.loop_state.occluded(occluded) == LoopPhase::Running && !was_running {
                    self.last_time = Instant::now();
                    state.ctx.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                // Not requesting another frame is what pauses the loop
                if !self.loop_state.is_running() {
                    return;
                }
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                // Update the camera
                let fovy = state.ctx.projection.fovy;
                state
                    .ctx
                    .camera
                    .controller
                    .update(&mut state.ctx.camera.camera, fovy, dt);
                state.ctx.update_camera_buffer();

                for flow in self.graphics_flows.iter_mut() {
                    let out = flow.on_update(&state.ctx, &mut state.state, dt);
                    if let Err(e) = handle_flow_output(&mut state.ctx, out) {
                        failure = Some(e);
                        break;
                    }
                }
                if let Some(e) = failure {
                    self.fail(event_loop, e);
                    return;
                }

                match state.render(
                    &mut self.graphics_flows,
                    #[cfg(feature = "integration-tests")]
                    &self.async_runtime,
                    #[cfg(feature = "integration-tests")]
                    &self.proxy,
                ) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("surface lost or outdated, reconfiguring");
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output(ctx: &mut Context, out: Out) -> anyhow::Result<()> {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Empty => Ok(()),
    }
}

/// Opens the window, builds the flows and renders until the window is closed.
///
/// Fatal setup failures (no adapter, no surface, a flow that cannot be built) end the loop and
/// are returned here.
pub fn run<State: 'static + Default>(constructors: Vec<FlowConstructor<State>>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Could not initialize logger".into());
        }
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent<State>> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent<State>> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

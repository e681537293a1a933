//! Application state: graphics context, camera session, filter pipeline
//! and the egui control panel.
//!
//! One redraw tick does capture → process → display in sequence on the
//! UI thread; egui events are plain state writes interleaved between
//! ticks, so no locking is needed beyond the camera's latest-frame slot.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ab_glyph::FontVec;
use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::camera::{CameraInfo, CameraSession, CaptureStatus};
use crate::error::AppError;
use crate::filters::detect::{FaceDetector, RegionDetector};
use crate::filters::{FilterKind, FilterState, Pipeline};
use crate::settings::{SaveFormat, Settings};

/// Write a processed frame to disk, format chosen by the path's
/// extension. JPEG has no alpha channel, so RGBA frames are flattened
/// to RGB first.
pub fn write_snapshot(image: &RgbaImage, path: &Path) -> Result<(), AppError> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    let result = if is_jpeg {
        image::DynamicImage::ImageRgba8(image.clone()).to_rgb8().save(path)
    } else {
        image.save(path)
    };

    result.map_err(|source| AppError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// Map a capture status to the error that should end the session.
/// `Opening` and `Running` are healthy; only a failed open reports
/// the device unavailable.
fn capture_failure(status: CaptureStatus, index: u32) -> Option<AppError> {
    match status {
        CaptureStatus::Failed(reason) => Some(AppError::DeviceUnavailable { index, reason }),
        CaptureStatus::Opening | CaptureStatus::Running => None,
    }
}

/// The frame a save request should write, or `FrameUnavailable` when
/// nothing has been captured yet.
fn frame_to_save(processed: Option<&ProcessedFrame>) -> Result<&ProcessedFrame, AppError> {
    processed.ok_or(AppError::FrameUnavailable)
}

/// Status-bar text for the object count. `None` hides the entry while
/// counting is disabled; a frame not yet counted shows a placeholder.
fn object_count_label(counting_enabled: bool, count: Option<usize>) -> Option<String> {
    if !counting_enabled {
        return None;
    }
    Some(match count {
        Some(n) => format!("Objects: {}", n),
        None => "Objects: -".to_string(),
    })
}

/// The most recent processed frame, kept for display and on-demand save.
#[derive(Debug)]
struct ProcessedFrame {
    image: RgbaImage,
    frame_number: u64,
}

/// Main application state.
pub struct App {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    // Frame presentation
    passthrough_pipeline: wgpu::RenderPipeline,
    passthrough_bind_group_layout: wgpu::BindGroupLayout,
    frame_texture: Option<wgpu::Texture>,
    frame_bind_group: Option<wgpu::BindGroup>,
    sampler: wgpu::Sampler,

    // Capture and processing
    camera: Option<CameraSession>,
    available_cameras: Vec<CameraInfo>,
    camera_error: Option<String>,
    pipeline: Pipeline,
    filter_state: FilterState,
    processed: Option<ProcessedFrame>,
    last_object_count: Option<usize>,

    // Preferences
    settings: Settings,

    // egui integration
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    // Status and timing
    status_message: Option<String>,
    fps: f64,
    last_fps_update: Instant,
    frames_since_update: u64,
}

impl App {
    /// Create a new App with an initialized wgpu context.
    pub async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find suitable GPU adapter");

        log::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Camera Filters Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let passthrough_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Passthrough Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/passthrough.wgsl").into()),
        });

        let passthrough_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Passthrough Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let passthrough_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Passthrough Pipeline Layout"),
                bind_group_layouts: &[&passthrough_bind_group_layout],
                push_constant_ranges: &[],
            });

        let passthrough_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Passthrough Pipeline"),
            layout: Some(&passthrough_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &passthrough_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &passthrough_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let settings = Settings::load_or_default();
        let pipeline = Self::build_pipeline(&settings);
        let filter_state = FilterState::new(settings.filter_params);

        let available_cameras = CameraSession::list_cameras();
        log::info!("Found {} camera(s)", available_cameras.len());

        let now = Instant::now();

        Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            passthrough_pipeline,
            passthrough_bind_group_layout,
            frame_texture: None,
            frame_bind_group: None,
            sampler,
            camera: None,
            available_cameras,
            camera_error: None,
            pipeline,
            filter_state,
            processed: None,
            last_object_count: None,
            settings,
            egui_ctx,
            egui_state,
            egui_renderer,
            status_message: None,
            fps: 0.0,
            last_fps_update: now,
            frames_since_update: 0,
        }
    }

    /// Assemble the pipeline from the configured runtime assets. Missing
    /// assets leave the corresponding capability off with a logged
    /// warning; they never block startup.
    fn build_pipeline(settings: &Settings) -> Pipeline {
        let detector = settings.face_model_path.as_deref().and_then(|path| {
            match FaceDetector::from_model(path) {
                Ok(d) => {
                    log::info!("Face detection model loaded from {}", path.display());
                    Some(Box::new(d) as Box<dyn RegionDetector>)
                }
                Err(e) => {
                    log::warn!("Face detection unavailable: {}", e);
                    None
                }
            }
        });

        let font = settings.font_path.as_deref().and_then(|path| {
            let load = fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(|e| e.to_string()));
            match load {
                Ok(font) => {
                    log::info!("Overlay font loaded from {}", path.display());
                    Some(font)
                }
                Err(e) => {
                    log::warn!("Count overlay text disabled: {} ({})", path.display(), e);
                    None
                }
            }
        });

        Pipeline::new(detector, font)
    }

    /// Handle a window event, returning true if egui consumed it.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(&self.window, event).consumed
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn target_fps(&self) -> u32 {
        self.settings.target_fps.max(1)
    }

    /// Start capture on the configured camera. A previous session, if
    /// any, is released first.
    pub fn start_camera(&mut self) {
        self.stop_camera();
        self.camera_error = None;
        match CameraSession::open(self.settings.camera_index) {
            Ok(session) => {
                log::info!("Camera {} starting", self.settings.camera_index);
                self.camera = Some(session);
            }
            Err(e) => {
                log::error!("Failed to start camera: {}", e);
                self.camera_error = Some(e);
            }
        }
    }

    /// Release the camera. Safe to call when no session is open.
    pub fn stop_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.stop();
            log::info!("Camera stopped");
        }
    }

    /// One capture-process step. Called once per redraw tick, before
    /// rendering. A tick with no new frame leaves the display unchanged.
    pub fn tick(&mut self) {
        // Surface an open failure once and drop the dead session;
        // capture stays off until the next start request.
        let open_failure = self
            .camera
            .as_ref()
            .and_then(|s| capture_failure(s.status(), self.settings.camera_index));
        if let Some(err) = open_failure {
            log::error!("{}", err);
            self.camera_error = Some(err.to_string());
            self.stop_camera();
            return;
        }

        let Some(session) = &mut self.camera else {
            return;
        };
        let Some(frame) = session.poll_frame() else {
            return;
        };

        let (image, report) = self.pipeline.process(&frame.image, &self.filter_state);
        if let Some(count) = report.object_count {
            log::debug!("Frame {}: {} objects", frame.frame_number, count);
        }
        self.last_object_count = report.object_count;
        self.upload_frame(&image);
        self.processed = Some(ProcessedFrame {
            image,
            frame_number: frame.frame_number,
        });
    }

    /// Save the most recent processed frame to the configured directory.
    pub fn save_snapshot(&mut self) {
        let processed = match frame_to_save(self.processed.as_ref()) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("{}", e);
                self.status_message = Some(e.to_string());
                return;
            }
        };
        let path = self.settings.snapshot_path(processed.frame_number);
        match write_snapshot(&processed.image, &path) {
            Ok(()) => {
                log::info!("Saved snapshot to {}", path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("{}", e);
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Upload a processed frame into the display texture, recreating the
    /// texture when the frame size changes.
    fn upload_frame(&mut self, image: &RgbaImage) {
        let (width, height) = (image.width(), image.height());
        let needs_new_texture = match &self.frame_texture {
            None => true,
            Some(tex) => {
                let size = tex.size();
                size.width != width || size.height != height
            }
        };

        if needs_new_texture {
            log::info!("Creating frame texture: {}x{}", width, height);
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Frame Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &self.passthrough_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.frame_texture = Some(texture);
            self.frame_bind_group = Some(bind_group);
        }

        if let Some(texture) = &self.frame_texture {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Render the current frame and the control panel.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(frame_bind_group) = &self.frame_bind_group {
                render_pass.set_pipeline(&self.passthrough_pipeline);
                render_pass.set_bind_group(0, frame_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }

        self.render_ui(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.update_fps();
        Ok(())
    }

    fn render_ui(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let raw_input = self.egui_state.take_egui_input(&self.window);

        // Snapshot state before running egui; apply actions afterwards so
        // the closure never borrows self.
        let camera_running = self.camera.is_some();
        let camera_error = self.camera_error.clone();
        let frame_count = self.camera.as_ref().map(|c| c.frame_count()).unwrap_or(0);
        let face_available = self.pipeline.face_detection_available();
        let overlay_font = self.pipeline.has_font();
        let count_label = object_count_label(
            self.filter_state.is_enabled(FilterKind::SegmentCount),
            self.last_object_count,
        );
        let available = self.available_cameras.clone();
        let fps = self.fps;
        let status_message = self.status_message.clone();
        let has_frame = self.processed.is_some();

        let mut filter_state = self.filter_state.clone();
        let mut save_format = self.settings.save_format;
        let mut camera_index = self.settings.camera_index;

        let mut start_camera = false;
        let mut stop_camera = false;
        let mut save_snapshot = false;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Camera Filters");
                    ui.separator();
                    ui.label(format!("FPS: {:.1}", fps));
                    if camera_running {
                        ui.separator();
                        ui.label(format!("Captured frames: {}", frame_count));
                    }
                    if let Some(label) = &count_label {
                        ui.separator();
                        ui.label(label);
                    }
                    if let Some(msg) = &status_message {
                        ui.separator();
                        ui.label(msg);
                    }
                });
            });

            egui::SidePanel::left("controls").show(ctx, |ui| {
                ui.heading("Camera");
                ui.separator();

                if camera_running {
                    if ui.button("Stop").clicked() {
                        stop_camera = true;
                    }
                } else {
                    ui.horizontal(|ui| {
                        ui.label("Device:");
                        if available.is_empty() {
                            // Nothing enumerated; let the user type an index.
                            ui.add(egui::DragValue::new(&mut camera_index).range(0..=8));
                        } else {
                            let selected = available
                                .iter()
                                .find(|c| c.index == camera_index)
                                .map(|c| c.device_label())
                                .unwrap_or_else(|| format!("{}", camera_index));
                            egui::ComboBox::from_id_salt("camera_device")
                                .selected_text(selected)
                                .show_ui(ui, |ui| {
                                    for cam in &available {
                                        ui.selectable_value(
                                            &mut camera_index,
                                            cam.index,
                                            cam.device_label(),
                                        );
                                    }
                                });
                        }
                    });
                    if ui.button("Start").clicked() {
                        start_camera = true;
                    }
                }
                if let Some(err) = &camera_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }

                ui.separator();
                ui.heading("Filters");
                ui.separator();

                for kind in FilterKind::ALL {
                    let unavailable = kind == FilterKind::FaceDetect && !face_available;
                    ui.add_enabled_ui(!unavailable, |ui| {
                        ui.checkbox(filter_state.enabled_mut(kind), kind.label());
                    });
                    if unavailable {
                        ui.small("model not loaded");
                    }
                    if kind == FilterKind::SegmentCount
                        && filter_state.is_enabled(kind)
                        && !overlay_font
                    {
                        ui.small("no overlay font; count in status bar");
                    }
                }

                ui.separator();
                ui.heading("Parameters");
                ui.separator();

                let params = &mut filter_state.params;
                let kernel_label = format!(
                    "Blur (kernel {})",
                    crate::filters::smooth::kernel_size(params.blur_radius)
                );
                ui.add(egui::Slider::new(&mut params.blur_radius, 0..=15).text(kernel_label));
                ui.add(egui::Slider::new(&mut params.edge_low, 0.0..=255.0).text("Edge low"));
                ui.add(egui::Slider::new(&mut params.edge_high, 0.0..=255.0).text("Edge high"));
                ui.add(egui::Slider::new(&mut params.threshold, 0..=255).text("Threshold"));
                ui.add(
                    egui::Slider::new(&mut params.min_area, 0.0..=5000.0)
                        .logarithmic(true)
                        .text("Min area"),
                );
                ui.add(
                    egui::Slider::new(&mut params.max_area, 1000.0..=1_000_000.0)
                        .logarithmic(true)
                        .text("Max area"),
                );

                ui.separator();
                ui.heading("Snapshot");
                ui.separator();

                egui::ComboBox::from_label("Format")
                    .selected_text(save_format.display_name())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut save_format, SaveFormat::Png, "PNG (lossless)");
                        ui.selectable_value(&mut save_format, SaveFormat::Jpeg, "JPEG");
                    });

                ui.add_enabled_ui(has_frame, |ui| {
                    if ui.button("Save frame (S)").clicked() {
                        save_snapshot = true;
                    }
                });
            });
        });

        // Apply UI actions
        self.filter_state = filter_state;
        if save_format != self.settings.save_format || camera_index != self.settings.camera_index {
            self.settings.save_format = save_format;
            self.settings.camera_index = camera_index;
            self.settings.save();
        }
        if start_camera {
            self.start_camera();
        }
        if stop_camera {
            self.stop_camera();
        }
        if save_snapshot {
            self.save_snapshot();
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let render_pass_static: &mut wgpu::RenderPass<'static> =
                unsafe { std::mem::transmute(&mut render_pass) };

            self.egui_renderer
                .render(render_pass_static, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn update_fps(&mut self) {
        self.frames_since_update += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_update).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames_since_update as f64 / elapsed;
            self.frames_since_update = 0;
            self.last_fps_update = now;
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_camera();
        self.settings.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_frame() -> RgbaImage {
        RgbaImage::from_fn(24, 16, |x, y| {
            Rgba([(x * 10) as u8, (y * 12) as u8, 200, 255])
        })
    }

    #[test]
    fn png_snapshot_round_trips_pixel_for_pixel() {
        let frame = test_frame();
        let path = std::env::temp_dir().join(format!(
            "camera-filters-test-{}.png",
            std::process::id()
        ));
        write_snapshot(&frame, &path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).ok();
        assert_eq!(reloaded, frame);
    }

    #[test]
    fn jpeg_snapshot_is_writable_despite_alpha() {
        let frame = test_frame();
        let path = std::env::temp_dir().join(format!(
            "camera-filters-test-{}.jpg",
            std::process::id()
        ));
        write_snapshot(&frame, &path).unwrap();

        // Lossy format: only require the right shape, not equality.
        let reloaded = image::open(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(reloaded.width(), frame.width());
        assert_eq!(reloaded.height(), frame.height());
    }

    #[test]
    fn unwritable_path_reports_write_failure() {
        let frame = test_frame();
        let path = Path::new("/nonexistent-dir/shot.png");
        let err = write_snapshot(&frame, path).unwrap_err();
        assert!(matches!(err, AppError::WriteFailure { .. }));
    }

    #[test]
    fn failed_open_surfaces_device_unavailable() {
        let status = CaptureStatus::Failed("no such device".to_string());
        match capture_failure(status, 2) {
            Some(AppError::DeviceUnavailable { index, reason }) => {
                assert_eq!(index, 2);
                assert_eq!(reason, "no such device");
            }
            other => panic!("expected DeviceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn healthy_statuses_produce_no_error() {
        assert!(capture_failure(CaptureStatus::Opening, 0).is_none());
        assert!(capture_failure(CaptureStatus::Running, 0).is_none());
    }

    #[test]
    fn save_without_frame_is_frame_unavailable() {
        let err = frame_to_save(None).unwrap_err();
        assert!(matches!(err, AppError::FrameUnavailable));

        let processed = ProcessedFrame {
            image: test_frame(),
            frame_number: 7,
        };
        assert_eq!(frame_to_save(Some(&processed)).unwrap().frame_number, 7);
    }

    #[test]
    fn count_label_follows_filter_state() {
        assert_eq!(object_count_label(false, Some(4)), None);
        assert_eq!(
            object_count_label(true, Some(4)),
            Some("Objects: 4".to_string())
        );
        assert_eq!(
            object_count_label(true, None),
            Some("Objects: -".to_string())
        );
    }
}

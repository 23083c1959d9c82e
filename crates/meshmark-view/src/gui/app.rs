use anyhow::{Result, anyhow};
use egui_wgpu::winit::Painter;
use egui_wgpu::{RendererOptions, WgpuConfiguration, WgpuSetup, WgpuSetupCreateNew};
use egui_winit::State as EguiWinitState;
use meshmark_io::{SceneAsset, load_scene};
use meshmark_session::{AnnotationSession, SessionEvent};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use super::model::{ModelInfo, format_point};
use super::painter::EguiOverlayPainter;
use super::panel::{NoteEditor, show_edit_panel};
use crate::viewer::{
    Color32, Lighting, OverlayPainter, PickHit, Point2, Rect, Vec2, ViewerInput, ViewerMesh,
    ViewerState, is_click, shade_meshes,
};

const POWER_PREF_VAR: &str = "MESHMARK_POWER_PREF";
const VIEWPORT_FILL: egui::Color32 = egui::Color32::from_rgb(24, 26, 30);

#[derive(Default)]
struct InputState {
    pointer_pos: Option<Point2>,
    pointer_delta: Vec2,
    primary_down: bool,
    secondary_down: bool,
    middle_down: bool,
    primary_clicked: bool,
    scroll_delta: f32,
    press_pos: Option<Point2>,
}

pub fn run_gui(model_path: &Path) -> Result<()> {
    // A scene that fails to load leaves an empty viewport rather than no window.
    let scene = match load_scene(model_path) {
        Ok(scene) => Some(scene),
        Err(err) => {
            error!("failed to load {}: {err:#}", model_path.display());
            None
        }
    };

    let event_loop = EventLoop::new().map_err(|err| anyhow!(err.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut runtime = GuiRuntime {
        app: MeshmarkApp::new(scene),
        surface: None,
        failure: None,
    };
    event_loop
        .run_app(&mut runtime)
        .map_err(|err| anyhow!(err.to_string()))?;
    match runtime.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Event-loop side of the viewer. The window and GPU surface only exist after `resumed`.
struct GuiRuntime {
    app: MeshmarkApp,
    surface: Option<WindowSurface>,
    failure: Option<anyhow::Error>,
}

impl ApplicationHandler for GuiRuntime {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }
        match WindowSurface::open(event_loop) {
            Ok(surface) => {
                surface.window.request_redraw();
                self.surface = Some(surface);
            }
            Err(err) => {
                error!("failed to open viewer window: {err:#}");
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if window_id != surface.window.id() {
            return;
        }
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if surface.egui_state.on_window_event(&surface.window, &event).repaint {
            surface.window.request_redraw();
        }

        match event {
            WindowEvent::Resized(size) => surface.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = surface.window.inner_size();
                surface.resize(size);
            }
            WindowEvent::RedrawRequested => surface.redraw(&mut self.app),
            _ => {}
        }
    }
}

struct WindowSurface {
    window: Arc<Window>,
    painter: Painter,
    egui_state: EguiWinitState,
    egui_ctx: egui::Context,
    clear_color: [f32; 4],
}

impl WindowSurface {
    fn open(event_loop: &ActiveEventLoop) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("meshmark")
            .with_min_inner_size(LogicalSize::new(960.0, 640.0));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| anyhow!(err.to_string()))?,
        );

        let egui_ctx = egui::Context::default();
        let setting = std::env::var(POWER_PREF_VAR).ok();
        let mut painter = create_painter(egui_ctx.clone(), power_preference(setting.as_deref()));
        pollster::block_on(painter.set_window(egui::ViewportId::ROOT, Some(window.clone())))
            .map_err(|err| anyhow!(err.to_string()))?;

        let egui_state = EguiWinitState::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            event_loop,
            Some(window.scale_factor() as f32),
            window.theme(),
            painter.max_texture_side(),
        );
        let clear_color = egui_ctx.style().visuals.window_fill.to_normalized_gamma_f32();

        Ok(Self {
            window,
            painter,
            egui_state,
            egui_ctx,
            clear_color,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.painter.on_window_resized(egui::ViewportId::ROOT, width, height);
        }
    }

    fn redraw(&mut self, app: &mut MeshmarkApp) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = self.egui_ctx.run(raw_input, |ctx| app.ui(ctx));
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        self.painter.paint_and_update_textures(
            egui::ViewportId::ROOT,
            output.pixels_per_point,
            self.clear_color,
            &primitives,
            &output.textures_delta,
            Vec::new(),
        );

        let repaint_now = output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| viewport.repaint_delay.is_zero());
        if repaint_now {
            self.window.request_redraw();
        }
    }
}

/// Maps the `MESHMARK_POWER_PREF` setting to an adapter preference. Unset or unknown means low power.
fn power_preference(setting: Option<&str>) -> wgpu::PowerPreference {
    match setting.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("high" | "high_performance" | "high-performance") => wgpu::PowerPreference::HighPerformance,
        Some("none" | "default") => wgpu::PowerPreference::None,
        _ => wgpu::PowerPreference::LowPower,
    }
}

fn create_painter(ctx: egui::Context, power_preference: wgpu::PowerPreference) -> Painter {
    let setup = WgpuSetupCreateNew {
        power_preference,
        device_descriptor: Arc::new(|adapter| wgpu::DeviceDescriptor {
            label: Some("meshmark-view"),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let configuration = WgpuConfiguration {
        wgpu_setup: WgpuSetup::CreateNew(setup),
        ..Default::default()
    };
    pollster::block_on(Painter::new(ctx, configuration, false, RendererOptions::default()))
}

struct MeshmarkApp {
    session: AnnotationSession,
    meshes: Vec<ViewerMesh>,
    model_info: ModelInfo,
    viewer: ViewerState,
    lighting: Lighting,
    input: InputState,
    hovered: Option<PickHit>,
    note_editor: NoteEditor,
}

impl MeshmarkApp {
    fn new(scene: Option<SceneAsset>) -> Self {
        let (meshes, model_info) = match scene {
            Some(scene) => {
                let meshes: Vec<ViewerMesh> =
                    scene.meshes.iter().map(ViewerMesh::from_scene_mesh).collect();
                let model_info = ModelInfo::from_scene(&scene, &meshes);
                (meshes, model_info)
            }
            None => (Vec::new(), ModelInfo::default()),
        };
        info!(
            meshes = model_info.meshes,
            faces = model_info.faces,
            "viewer ready"
        );

        let mut app = Self {
            session: AnnotationSession::new(),
            meshes,
            model_info,
            viewer: ViewerState::default(),
            lighting: Lighting::default(),
            input: InputState::default(),
            hovered: None,
            note_editor: NoteEditor::default(),
        };
        app.fit_model();
        app
    }

    fn ui(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(10.0, 0.0);
                ui.heading("meshmark");
                ui.add(egui::Separator::default().vertical());
                if ui.button("Reset View").clicked() {
                    self.viewer.reset_view();
                }
                if ui.button("Fit Model").clicked() {
                    self.fit_model();
                }
                ui.add(egui::Separator::default().vertical());
                ui.label(self.model_info.label.as_str());
            });
        });

        egui::TopBottomPanel::bottom("bottom_bar").show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(10.0, 0.0);
                ui.label(self.model_info.summary());
                if let Some(bounds) = self.model_info.bounds {
                    ui.label(format!(
                        "bounds: [{}] .. [{}]",
                        format_point(&bounds.min),
                        format_point(&bounds.max)
                    ));
                }
                ui.label(format!(
                    "camera: [{}] at {:.2}",
                    format_point(&self.viewer.target()),
                    self.viewer.distance()
                ));
                if let Some(label) = self.hover_label() {
                    ui.add(egui::Separator::default().vertical());
                    ui.label(label);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let (rect, response) = ui.allocate_exact_size(available, egui::Sense::click_and_drag());
            if response.clicked() {
                response.request_focus();
            }
            self.draw_viewport(ctx, ui, rect, &response);
        });

        for event in show_edit_panel(ctx, &self.session, &mut self.note_editor) {
            self.session.apply(event);
        }
    }

    fn hover_label(&self) -> Option<String> {
        let hit = self.hovered?;
        let mesh = self.meshes.get(hit.index)?;
        Some(format!("hover: {} @ {}", mesh.id, format_point(&hit.point)))
    }

    fn draw_viewport(
        &mut self,
        ctx: &egui::Context,
        ui: &egui::Ui,
        rect: egui::Rect,
        response: &egui::Response,
    ) {
        let hovered = response.hovered();
        self.update_input(ctx, rect, hovered);

        let viewer_rect = Rect::from_min_size(
            Point2::new(0.0, 0.0),
            Vec2::new(rect.width(), rect.height()),
        );
        let input = self.build_input(viewer_rect, hovered);
        self.viewer.handle_input(&input);
        self.update_hover(&input);
        if input.primary_clicked {
            self.handle_click(&input);
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, VIEWPORT_FILL);

        let session = &self.session;
        let projector = self.viewer.projector(viewer_rect);
        let triangles = shade_meshes(&projector, &self.meshes, &self.lighting, |mesh| {
            Color32::from_hex(session.display_color(&mesh.id, &mesh.base_color))
        });

        let mut overlay = EguiOverlayPainter::new(&painter, rect.min.to_vec2());
        overlay.triangles(&triangles);
        self.viewer.paint_overlay(
            &mut overlay,
            viewer_rect,
            &self.meshes,
            self.session.selection(),
            self.hovered.map(|hit| hit.index),
        );
    }

    fn update_input(&mut self, ctx: &egui::Context, rect: egui::Rect, hovered: bool) {
        let pointer_pos = ctx.input(|i| i.pointer.interact_pos());
        self.input.pointer_pos =
            pointer_pos.map(|pos| Point2::new(pos.x - rect.min.x, pos.y - rect.min.y));

        let delta = ctx.input(|i| i.pointer.delta());
        self.input.pointer_delta = if hovered {
            Vec2::new(delta.x, delta.y)
        } else {
            Vec2::new(0.0, 0.0)
        };

        self.input.primary_down = ctx.input(|i| i.pointer.button_down(egui::PointerButton::Primary));
        self.input.secondary_down =
            ctx.input(|i| i.pointer.button_down(egui::PointerButton::Secondary));
        self.input.middle_down =
            ctx.input(|i| i.pointer.button_down(egui::PointerButton::Middle));

        if hovered {
            let scroll = ctx.input(|i| i.raw_scroll_delta);
            self.input.scroll_delta += scroll.y;
        }

        if hovered && ctx.input(|i| i.pointer.button_pressed(egui::PointerButton::Primary)) {
            self.input.press_pos = self.input.pointer_pos;
        }

        if ctx.input(|i| i.pointer.button_released(egui::PointerButton::Primary)) {
            let clicked = match (self.input.press_pos.take(), self.input.pointer_pos) {
                (Some(press), Some(release)) => is_click(press, release),
                _ => false,
            };
            self.input.primary_clicked |= hovered && clicked;
        }
    }

    fn build_input(&mut self, rect: Rect, hovered: bool) -> ViewerInput {
        let pointer_pos = if hovered { self.input.pointer_pos } else { None };
        let delta = if hovered {
            self.input.pointer_delta
        } else {
            Vec2::new(0.0, 0.0)
        };
        self.input.pointer_delta = Vec2::new(0.0, 0.0);

        let input = ViewerInput {
            rect,
            pointer_pos,
            pointer_delta: delta,
            primary_down: self.input.primary_down,
            secondary_down: self.input.secondary_down,
            middle_down: self.input.middle_down,
            primary_clicked: self.input.primary_clicked,
            scroll_delta: self.input.scroll_delta,
            hovered,
        };
        self.input.primary_clicked = false;
        self.input.scroll_delta = 0.0;
        input
    }

    fn update_hover(&mut self, input: &ViewerInput) {
        if input.primary_down || input.secondary_down || input.middle_down {
            return;
        }
        let hit = self.pick_at(input);
        let before = self.hovered.map(|hit| hit.index);
        let after = hit.map(|hit| hit.index);
        if after != before {
            if let Some(mesh) = after.and_then(|idx| self.meshes.get(idx)) {
                debug!(mesh = %mesh.id, "pointer over mesh");
            }
        }
        self.hovered = hit;
    }

    fn handle_click(&mut self, input: &ViewerInput) {
        let picked = self
            .pick_at(input)
            .and_then(|hit| self.meshes.get(hit.index))
            .map(|mesh| mesh.id.clone());
        self.session.apply(SessionEvent::MeshClicked(picked));
    }

    fn pick_at(&self, input: &ViewerInput) -> Option<PickHit> {
        let pos = input.pointer_pos?;
        self.viewer.pick_mesh(pos, input.rect, &self.meshes)
    }

    fn fit_model(&mut self) {
        match self.model_info.bounds {
            Some(bounds) => self.viewer.fit_bounds(bounds),
            None => self.viewer.reset_view(),
        }
    }
}

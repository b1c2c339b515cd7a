//! Leptos component hosting a [`DiagramEngine`] on an HTML canvas.
//!
//! The component owns the browser side of the engine: a canvas surface
//! sized from the canvas's parent, a frame scheduler backed by
//! `requestAnimationFrame`, mouse handlers, and a window resize listener. All of
//! it lives in one local [`StoredValue`] and is released in `on_cleanup`.

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::error::EngineError;
use super::lifecycle::{DiagramEngine, EngineConfig, FrameHandle, FrameScheduler, Surface};
use super::render::{self, Frame};
use super::theme::Theme;
use super::types::{GraphData, Viewport};

/// Canvas element plus its 2D context.
#[derive(Clone)]
struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	fn new(canvas: HtmlCanvasElement) -> Option<Self> {
		let ctx = canvas
			.get_context("2d")
			.ok()??
			.dyn_into::<CanvasRenderingContext2d>()
			.ok()?;
		Some(Self { canvas, ctx })
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> Option<(f64, f64)> {
		self.canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
	}

	fn resize(&mut self, viewport: Viewport) {
		self.canvas.set_width(viewport.width as u32);
		self.canvas.set_height(viewport.height as u32);
	}

	fn present(&mut self, frame: &Frame) {
		render::draw(frame, &self.ctx);
		self.canvas
			.set_title(frame.tooltip.as_deref().unwrap_or_default());
	}
}

/// `requestAnimationFrame` with a single long-lived callback.
struct RafScheduler {
	callback: Closure<dyn FnMut()>,
}

impl RafScheduler {
	fn new(callback: Closure<dyn FnMut()>) -> Self {
		Self { callback }
	}
}

impl FrameScheduler for RafScheduler {
	fn request_frame(&mut self) -> Option<FrameHandle> {
		let window = web_sys::window()?;
		match window.request_animation_frame(self.callback.as_ref().unchecked_ref()) {
			Ok(id) => Some(FrameHandle(id)),
			Err(err) => {
				warn!("arch-diagram: requestAnimationFrame failed: {err:?}");
				None
			}
		}
	}

	fn cancel_frame(&mut self, handle: FrameHandle) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(handle.0);
		}
	}
}

type CanvasEngine = DiagramEngine<CanvasSurface, RafScheduler>;

/// Browser resources owned by one component instance.
#[derive(Default)]
struct Host {
	engine: Option<CanvasEngine>,
	on_resize: Option<Closure<dyn FnMut()>>,
}

type HostHandle = StoredValue<Host, LocalStorage>;

fn with_engine(host: HostHandle, f: impl FnOnce(&mut CanvasEngine)) {
	host.try_update_value(|host| {
		if let Some(engine) = host.engine.as_mut() {
			f(engine);
		}
	});
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn random_seed() -> u64 {
	(js_sys::Math::random() * 2f64.powi(53)) as u64
}

/// Mounts `data` on first run, replaces it afterwards. A rejected payload
/// unmounts the engine and leaves the placeholder on the canvas.
fn show(engine: &mut CanvasEngine, surface: CanvasSurface, data: &GraphData) {
	let result = if engine.is_mounted() {
		engine.update(data)
	} else {
		engine.mount(surface.clone(), data)
	};

	match result {
		Ok(()) => {}
		Err(EngineError::Validation(_)) => {
			engine.unmount();
			if let Some(frame) = engine.placeholder(&surface) {
				debug!("arch-diagram: showing placeholder for rejected payload");
				let mut surface = surface;
				surface.resize(frame.viewport);
				surface.present(&frame);
			}
		}
		Err(err @ EngineError::SurfaceUnavailable { .. }) => {
			warn!("arch-diagram: nothing rendered: {err}");
		}
	}
}

/// Renders the architecture diagram for `data` on a canvas.
///
/// The canvas takes its size from its parent element, never shorter than the
/// configured minimum height, and follows window resizes. Nodes can be dragged;
/// hovering a node emphasizes it and shows its tooltip.
#[component]
pub fn ArchitectureDiagram(
	/// Graph to show. A new value replaces the current layout.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Engine tuning. Unset fields take their defaults; an unset seed is randomized.
	#[prop(optional)]
	config: Option<EngineConfig>,
	/// Colors and sizes. Defaults to the light theme.
	#[prop(optional)]
	theme: Option<Theme>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let host: HostHandle = StoredValue::new_local(Host::default());

	let mut config = config.unwrap_or_default();
	if config.forces.seed.is_none() {
		config.forces.seed = Some(random_seed());
	}
	let frame_callback = Closure::<dyn FnMut()>::new(move || {
		with_engine(host, |engine| {
			engine.on_frame();
		});
	});
	let theme = theme.unwrap_or_default();
	debug!("arch-diagram: using {} theme", theme.name);
	let engine = DiagramEngine::new(config, RafScheduler::new(frame_callback)).with_theme(theme);
	host.update_value(|host| host.engine = Some(engine));

	if let Some(window) = web_sys::window() {
		let on_resize = Closure::<dyn FnMut()>::new(move || {
			with_engine(host, CanvasEngine::remeasure);
		});
		if window
			.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
			.is_err()
		{
			warn!("arch-diagram: could not listen for window resize");
		}
		host.update_value(|host| host.on_resize = Some(on_resize));
	}

	Effect::new(move |_| {
		let payload = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(surface) = CanvasSurface::new(canvas) else {
			warn!("arch-diagram: canvas has no 2d context");
			return;
		};
		with_engine(host, |engine| show(engine, surface, &payload));
	});

	on_cleanup(move || {
		host.try_update_value(|host| {
			if let Some(mut engine) = host.engine.take() {
				engine.unmount();
			}
			if let (Some(window), Some(on_resize)) = (web_sys::window(), host.on_resize.take()) {
				let _ = window
					.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
			}
		});
	});

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_engine(host, |engine| engine.pointer_down(x, y));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_engine(host, |engine| engine.pointer_move(x, y));
		}
	};

	let on_mouseup = move |_: MouseEvent| with_engine(host, CanvasEngine::pointer_up);
	let on_mouseleave = move |_: MouseEvent| with_engine(host, CanvasEngine::pointer_leave);

	view! {
		<canvas
			node_ref=canvas_ref
			class="architecture-diagram"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; cursor: grab;"
		/>
	}
}

//! Mount/update/resize/unmount lifecycle for one diagram instance.
//!
//! [`DiagramEngine`] owns the per-mount diagram state, the interaction
//! controller, the host surface, and at most one pending animation frame. The
//! host supplies two seams: a [`Surface`] to size and paint, and a
//! [`FrameScheduler`] wrapping the display-refresh callback. Tearing down a
//! mount always cancels the pending frame before anything new is installed.

use log::{debug, info, warn};
use serde::Deserialize;

use super::error::{EngineError, Result};
use super::graph::Graph;
use super::interaction::{InteractionConfig, InteractionController, Intent};
use super::render::{self, Frame};
use super::simulation::ForceConfig;
use super::state::DiagramState;
use super::theme::Theme;
use super::types::{GraphData, Viewport, ViewportConfig};

/// A sized drawing target.
pub trait Surface {
	/// Current size reported by the host, or `None` if the surface is gone.
	fn size(&self) -> Option<(f64, f64)>;
	/// Matches the backing store to the viewport.
	fn resize(&mut self, viewport: Viewport);
	/// Paints one projected frame.
	fn present(&mut self, frame: &Frame);
}

/// Handle returned by the host's frame-request primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// One-shot display-refresh callbacks. A requested frame ends in a call to
/// [`DiagramEngine::on_frame`] unless it is cancelled first.
pub trait FrameScheduler {
	/// Asks for one callback. `None` means the host refused.
	fn request_frame(&mut self) -> Option<FrameHandle>;
	/// Drops a request that has not fired yet.
	fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Engine-wide tuning, loadable from JSON.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Solver tuning.
	pub forces: ForceConfig,
	/// Surface size fallbacks.
	pub viewport: ViewportConfig,
	/// Drag and resize heat.
	pub interaction: InteractionConfig,
}

struct Mounted<S> {
	surface: S,
	state: DiagramState,
	controller: InteractionController,
	/// Something visible changed since the last presented frame.
	dirty: bool,
}

/// One diagram instance: at most one mount and one pending frame at a time.
pub struct DiagramEngine<S: Surface, F: FrameScheduler> {
	config: EngineConfig,
	theme: Theme,
	scheduler: F,
	mounted: Option<Mounted<S>>,
	pending: Option<FrameHandle>,
}

impl<S: Surface, F: FrameScheduler> DiagramEngine<S, F> {
	/// An unmounted engine using the light theme.
	pub fn new(config: EngineConfig, scheduler: F) -> Self {
		Self {
			config,
			theme: Theme::default(),
			scheduler,
			mounted: None,
			pending: None,
		}
	}

	/// Replaces the theme used for every later frame.
	pub fn with_theme(mut self, theme: Theme) -> Self {
		self.theme = theme;
		self
	}

	/// Validates `data`, replaces any current mount, and starts the layout.
	///
	/// A validation error leaves the engine exactly as it was. A surface with
	/// no usable area leaves it unmounted.
	pub fn mount(&mut self, mut surface: S, data: &GraphData) -> Result<()> {
		let graph = validate(data)?;
		self.unmount();

		let viewport = self.measure(&surface)?;
		surface.resize(viewport);
		let state = DiagramState::new(graph, viewport, &self.config.forces);
		info!(
			"arch-diagram: mounted {} nodes, {} links at {}x{}",
			state.graph().len(),
			state.graph().links().len(),
			viewport.width,
			viewport.height
		);

		self.mounted = Some(Mounted {
			surface,
			state,
			controller: InteractionController::new(self.config.interaction.clone()),
			dirty: true,
		});
		self.schedule();
		Ok(())
	}

	/// Replaces the graph of the current mount. Solver state starts over;
	/// positions, velocities and pins are never carried across graphs.
	pub fn update(&mut self, data: &GraphData) -> Result<()> {
		let graph = validate(data)?;
		let Some(mounted) = self.mounted.as_mut() else {
			debug!("arch-diagram: update ignored, not mounted");
			return Ok(());
		};
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
		}

		let viewport = mounted.state.viewport();
		mounted.state = DiagramState::new(graph, viewport, &self.config.forces);
		mounted.controller.reset();
		mounted.dirty = true;
		info!(
			"arch-diagram: graph replaced with {} nodes, {} links",
			mounted.state.graph().len(),
			mounted.state.graph().links().len()
		);
		self.schedule();
		Ok(())
	}

	/// Applies a new surface size and re-centers the layout. A no-op while
	/// unmounted or when the size has no usable area.
	pub fn resize(&mut self, width: f64, height: f64) {
		let Some(mounted) = self.mounted.as_mut() else {
			debug!("arch-diagram: resize ignored, not mounted");
			return;
		};
		let Some(viewport) = Viewport::from_surface(width, height, &self.config.viewport) else {
			warn!("arch-diagram: ignoring resize to {width}x{height}");
			return;
		};
		mounted.surface.resize(viewport);
		let intents = mounted.controller.resize(viewport);
		self.dispatch(intents);
	}

	/// Re-reads the surface size, e.g. after a window resize.
	pub fn remeasure(&mut self) {
		let size = self.mounted.as_ref().and_then(|m| m.surface.size());
		if let Some((width, height)) = size {
			self.resize(width, height);
		}
	}

	/// Stops the frame loop and drops all per-mount state. Safe to repeat.
	pub fn unmount(&mut self) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
		}
		if self.mounted.take().is_some() {
			info!("arch-diagram: unmounted");
		}
	}

	/// Frame callback: one solver step, then a redraw. Returns false when the
	/// call was not backed by a pending request and did nothing.
	pub fn on_frame(&mut self) -> bool {
		if self.pending.take().is_none() {
			return false;
		}
		let Some(mounted) = self.mounted.as_mut() else {
			return false;
		};

		mounted.state.tick();
		let frame = render::project(&mounted.state, &self.theme);
		if frame.is_finite() {
			mounted.surface.present(&frame);
		} else {
			warn!("arch-diagram: skipping frame with non-finite positions");
		}
		mounted.dirty = false;
		self.schedule();
		true
	}

	/// Pointer pressed at surface coordinates `(x, y)`.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let Some(mounted) = self.mounted.as_mut() else {
			return;
		};
		let hit = mounted.state.hit(x, y, &self.theme.node);
		let intents = mounted.controller.pointer_down(x, y, hit);
		self.dispatch(intents);
	}

	/// Pointer moved; drags the held node or updates hover emphasis.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let Some(mounted) = self.mounted.as_mut() else {
			return;
		};
		let hit = if mounted.controller.is_dragging() {
			None
		} else {
			mounted.state.hit(x, y, &self.theme.node)
		};
		let intents = mounted.controller.pointer_move(x, y, hit);
		self.dispatch(intents);
	}

	/// Ends any drag.
	pub fn pointer_up(&mut self) {
		let Some(mounted) = self.mounted.as_mut() else {
			return;
		};
		let intents = mounted.controller.pointer_up();
		self.dispatch(intents);
	}

	/// Pointer left the surface; ends any drag and clears emphasis.
	pub fn pointer_leave(&mut self) {
		let Some(mounted) = self.mounted.as_mut() else {
			return;
		};
		let intents = mounted.controller.pointer_leave();
		self.dispatch(intents);
	}

	/// Placeholder frame sized for `surface`, for hosts showing a rejected payload.
	pub fn placeholder(&self, surface: &S) -> Option<Frame> {
		let viewport = self.measure(surface).ok()?;
		Some(Frame::placeholder(viewport, &self.theme))
	}

	/// True between a successful mount and unmount.
	pub fn is_mounted(&self) -> bool {
		self.mounted.is_some()
	}

	/// True while a frame request is outstanding.
	pub fn is_scheduled(&self) -> bool {
		self.pending.is_some()
	}

	#[cfg(test)]
	pub(crate) fn state(&self) -> Option<&DiagramState> {
		self.mounted.as_ref().map(|m| &m.state)
	}

	/// The mounted surface, if any.
	pub fn surface(&self) -> Option<&S> {
		self.mounted.as_ref().map(|m| &m.surface)
	}

	#[allow(missing_docs)]
	pub fn scheduler(&self) -> &F {
		&self.scheduler
	}

	#[allow(missing_docs)]
	pub fn scheduler_mut(&mut self) -> &mut F {
		&mut self.scheduler
	}

	#[allow(missing_docs)]
	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Theme every frame is projected with.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	fn measure(&self, surface: &S) -> Result<Viewport> {
		let Some((width, height)) = surface.size() else {
			warn!("arch-diagram: rendering surface is missing");
			return Err(EngineError::SurfaceUnavailable {
				reason: "surface reported no size".into(),
			});
		};
		if width == 0.0 || height == 0.0 {
			debug!("arch-diagram: surface reported {width}x{height}, using fallback size");
		}
		Viewport::from_surface(width, height, &self.config.viewport).ok_or_else(|| {
			warn!("arch-diagram: surface has no usable area ({width}x{height})");
			EngineError::SurfaceUnavailable {
				reason: format!("no usable area at {width}x{height}"),
			}
		})
	}

	fn dispatch(&mut self, intents: Vec<Intent>) {
		let Some(mounted) = self.mounted.as_mut() else {
			return;
		};
		for intent in intents {
			if mounted.state.apply(intent) {
				mounted.dirty = true;
			}
		}
		self.schedule();
	}

	/// Requests a frame if there is work and none is outstanding. Repeated
	/// calls coalesce into the one pending request.
	fn schedule(&mut self) {
		if self.pending.is_some() {
			return;
		}
		let needed = self
			.mounted
			.as_ref()
			.is_some_and(|m| m.dirty || m.state.is_active());
		if needed {
			self.pending = self.scheduler.request_frame();
		}
	}
}

impl<S: Surface, F: FrameScheduler> Drop for DiagramEngine<S, F> {
	fn drop(&mut self) {
		self.unmount();
	}
}

fn validate(data: &GraphData) -> Result<Graph> {
	Graph::from_data(data).map_err(|err| {
		warn!("arch-diagram: rejected graph payload: {err}");
		EngineError::from(err)
	})
}

#![cfg(feature = "egui")]

use eframe::egui::{self, Rect};

use crate::render::{Bounds, DisplayList, FrameRequest, RenderHost, ResizeListener};

/// Render host backed by an egui context. A requested frame becomes due on
/// the next repaint, which the request itself triggers.
pub struct EguiHost {
    ctx: egui::Context,
    bounds: Bounds,
    next_token: u64,
    pending_frame: Option<FrameRequest>,
    resize_listener: Option<ResizeListener>,
}

impl EguiHost {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            bounds: Bounds::default(),
            next_token: 0,
            pending_frame: None,
            resize_listener: None,
        }
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Record the canvas rectangle for this repaint. Returns true when it
    /// changed and a resize listener is attached.
    pub fn set_container(&mut self, rect: Rect) -> bool {
        let bounds = Bounds {
            left: rect.min.x,
            top: rect.min.y,
            width: rect.width(),
            height: rect.height(),
        };
        if bounds == self.bounds {
            return false;
        }
        self.bounds = bounds;
        self.resize_listener.is_some()
    }

    /// The frame that should run during this repaint, if one was requested.
    pub fn take_due_frame(&mut self) -> Option<FrameRequest> {
        self.pending_frame.take()
    }
}

impl RenderHost for EguiHost {
    type Surface = DisplayList;

    fn create_surface(&mut self) -> Option<DisplayList> {
        Some(DisplayList::new(self.bounds.width, self.bounds.height))
    }

    fn container_bounds(&self) -> Bounds {
        self.bounds
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.token());
        self.pending_frame = Some(request);
        self.ctx.request_repaint();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending_frame == Some(request) {
            self.pending_frame = None;
        }
    }

    fn observe_resize(&mut self) -> ResizeListener {
        let listener = ResizeListener(self.token());
        self.resize_listener = Some(listener);
        listener
    }

    fn unobserve_resize(&mut self, listener: ResizeListener) {
        if self.resize_listener == Some(listener) {
            self.resize_listener = None;
        }
    }
}

#![cfg(feature = "egui")]

use std::sync::Arc;

use eframe::egui;

use crate::error::Result;
use crate::render::{FrameState, RenderEngine};
use crate::selection::SelectionHandle;
use crate::stream::StreamClient;

use super::host::EguiHost;

/// Interactive application showing the living map of one service.
pub struct LivingMapApp {
    pub client: Arc<StreamClient>,
    pub selection: SelectionHandle,
    pub engine: RenderEngine<EguiHost>,
}

impl LivingMapApp {
    /// Create the app and start its render loop. The stream client is shared,
    /// not owned: other views may hold the same handle.
    pub fn new(
        ctx: &egui::Context,
        client: Arc<StreamClient>,
        selection: SelectionHandle,
    ) -> Result<Self> {
        let snapshots = client.subscribe_snapshot();
        let reader = selection.clone();
        let writer = selection.clone();
        let mut engine = RenderEngine::new(
            EguiHost::new(ctx.clone()),
            move || FrameState {
                snapshot: snapshots.borrow().clone(),
                layer: reader.active_layer(),
                selected: reader.selected(),
            },
            move |id| writer.select(id),
        )?;
        engine.start();
        Ok(Self {
            client,
            selection,
            engine,
        })
    }
}

impl eframe::App for LivingMapApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        super::ui::update(self, ctx, frame);
    }
}

use crate::input::InputQueue;
use crate::render;
use app_core::{FontGlyphSource, SceneEvent, SweepAnimation};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub anim: SweepAnimation,
    pub glyphs: FontGlyphSource,
    pub inputs: Rc<RefCell<InputQueue>>,

    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,

    pub started_at: Instant,
    pub events: Vec<SceneEvent>,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;

        let drained: InputQueue = std::mem::take(&mut *self.inputs.borrow_mut());
        self.events.clear();
        let frame = self
            .anim
            .step(now_ms, &drained, &self.glyphs, &mut self.events);

        for ev in &self.events {
            match *ev {
                SceneEvent::LetterSpawned { ch } => match self.glyphs.mesh(ch) {
                    Ok(mesh) => {
                        if let Some(g) = &mut self.gpu {
                            g.upload_letter_mesh(&mesh);
                        }
                    }
                    Err(e) => log::error!("[frame] mesh build failed: {e}"),
                },
                SceneEvent::LetterCleared => {
                    if let Some(g) = &mut self.gpu {
                        g.clear_letter();
                    }
                }
            }
        }

        if let Some(g) = &mut self.gpu {
            // Keep the WebGPU surface sized to the canvas backing size
            let w = self.canvas.width();
            let h = self.canvas.height();
            g.resize_if_needed(w, h);
            if let Err(e) = g.render(&frame) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

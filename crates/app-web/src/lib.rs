#![cfg(target_arch = "wasm32")]
use app_core::{FontGlyphSource, GlyphStyle, SweepAnimation, SweepParams};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod font;
mod frame;
mod input;
mod overlay;
mod render;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("app-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    wire_canvas_resize(&canvas);

    // Font first: everything downstream needs glyph outlines
    let font_bytes = font::fetch_font_bytes(font::FONT_URL).await?;
    let glyphs = FontGlyphSource::from_vec(font_bytes, GlyphStyle::default())
        .map_err(|e| anyhow::anyhow!("font parse failed: {e}"))?;

    // Wall-clock seed so the palette choice varies between visits
    let seed = js_sys::Date::now() as u64;
    let anim = SweepAnimation::new(SweepParams::default(), seed)
        .map_err(|e| anyhow::anyhow!("bad configuration: {e}"))?;

    let gpu = frame::init_gpu(&canvas).await;

    // Pointer handlers feed the queue the frame loop drains
    let inputs = Rc::new(RefCell::new(input::InputQueue::new()));
    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        inputs: inputs.clone(),
    });

    // Remove loading overlay once initialized
    overlay::hide_loading(&document);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        anim,
        glyphs,
        inputs,
        canvas,
        gpu,
        started_at: Instant::now(),
        events: Vec::new(),
    }));
    frame::start_loop(frame_ctx);

    Ok(())
}

//! Browser binding for the globe session.
//!
//! The page owns the canvas, the camera and the draw calls. It calls
//! `globe_tick` once per animation frame, reads `globe_frame` to draw, and
//! forwards pointer, visibility and resize events. Hit testing is delegated
//! back to the page through the `pick` callback handed to `globe_init`.

mod view;

use std::cell::RefCell;

use console_error_panic_hook::set_once;
use foundation::math::Vec3;
use foundation::time::{Clock, Time};
use scene::picking::{Intersection, PickBackend, PickCandidates, Pointer, PointerKind, Ray};
use session::{GlobeConfig, GlobeSession};
use wasm_bindgen::prelude::*;

pub use view::*;

/// Host services backed by the page.
struct PageHost {
    pick: js_sys::Function,
}

impl Clock for PageHost {
    fn now(&self) -> Time {
        Time(wall_clock_seconds())
    }
}

impl PickBackend for PageHost {
    /// The page owns the camera, so the ray carries screen coordinates and
    /// unprojection happens on the JavaScript side.
    fn screen_ray(&self, pointer: &Pointer) -> Option<Ray> {
        Some(Ray::new(
            Vec3::new(pointer.x, pointer.y, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ))
    }

    fn intersect(&self, ray: &Ray, candidates: &PickCandidates, out: &mut Vec<Intersection>) {
        let request = CandidatesView::new(ray.origin.x, ray.origin.y, candidates);
        let Ok(request) = serde_json::to_string(&request) else {
            return;
        };
        match self.pick.call1(&JsValue::NULL, &JsValue::from_str(&request)) {
            Ok(reply) => {
                if let Some(reply) = reply.as_string() {
                    out.extend(parse_hits(&reply));
                }
            }
            Err(err) => web_sys::console::error_2(&JsValue::from_str("pick callback failed"), &err),
        }
    }
}

thread_local! {
    static STATE: RefCell<Option<GlobeSession<PageHost>>> = const { RefCell::new(None) };
}

/// Why the session could not be reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Access {
    /// Re-entrant call, e.g. from the pick callback while a tick runs.
    Busy,
    Uninitialised,
}

impl From<Access> for JsValue {
    fn from(a: Access) -> Self {
        JsValue::from_str(match a {
            Access::Busy => "globe is busy; called from inside a tick",
            Access::Uninitialised => "globe not initialised",
        })
    }
}

fn borrow_slot<T, R>(
    slot: &RefCell<Option<T>>,
    f: impl FnOnce(&mut T) -> R,
) -> Result<R, Access> {
    let mut guard = slot.try_borrow_mut().map_err(|_| Access::Busy)?;
    guard.as_mut().map(f).ok_or(Access::Uninitialised)
}

/// Runs `f` on the live session; unreachable sessions yield the default.
fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&mut GlobeSession<PageHost>) -> R,
    R: Default,
{
    STATE
        .try_with(|state| borrow_slot(state, f).unwrap_or_default())
        .unwrap_or_default()
}

fn try_with_session<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut GlobeSession<PageHost>) -> Result<R, JsValue>,
{
    STATE
        .try_with(|state| borrow_slot(state, f))
        .map_err(|_| JsValue::from_str("globe state unavailable"))??
}

fn wall_clock_seconds() -> f64 {
    js_sys::Date::now() / 1000.0
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Builds a fresh session, replacing (and disposing) any previous one.
///
/// `config_json` may be empty for defaults. `pick` receives a JSON candidate
/// set and must return a JSON array of hits.
#[wasm_bindgen]
pub fn globe_init(config_json: &str, pick: js_sys::Function) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        GlobeConfig::default()
    } else {
        GlobeConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let session = GlobeSession::new(config, PageHost { pick });
    STATE
        .try_with(|state| {
            let mut guard = state.try_borrow_mut().map_err(|_| Access::Busy)?;
            if let Some(mut old) = guard.replace(session) {
                old.dispose();
            }
            Ok::<_, Access>(())
        })
        .map_err(|_| JsValue::from_str("globe state unavailable"))?
        .map_err(JsValue::from)
}

/// Returns the load state as JSON.
#[wasm_bindgen]
pub fn globe_start() -> Result<String, JsValue> {
    try_with_session(|s| {
        let state = s.start().map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&state)
    })
}

#[wasm_bindgen]
pub fn globe_assets_loaded() -> Result<String, JsValue> {
    try_with_session(|s| {
        let state = s
            .assets_loaded()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&state)
    })
}

#[wasm_bindgen]
pub fn globe_assets_failed(reason: &str) -> Result<String, JsValue> {
    try_with_session(|s| {
        let state = s
            .assets_failed(reason)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&state)
    })
}

/// Feeds a fetched dataset. A bad primary payload moves to the fallback
/// source; the returned state tells the page which URL to fetch next.
#[wasm_bindgen]
pub fn globe_data_loaded(payload: &str) -> Result<String, JsValue> {
    try_with_session(|s| {
        let state = s
            .data_loaded(payload)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&state)
    })
}

#[wasm_bindgen]
pub fn globe_data_failed(reason: &str) -> Result<String, JsValue> {
    try_with_session(|s| {
        let state = s
            .data_failed(reason)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&state)
    })
}

/// Advances one animation frame. Returns false when nothing ticked.
#[wasm_bindgen]
pub fn globe_tick(delta_s: f64) -> bool {
    with_session(|s| s.tick(delta_s).is_some())
}

/// Draw state for the current frame as JSON.
#[wasm_bindgen]
pub fn globe_frame() -> Result<String, JsValue> {
    try_with_session(|s| to_json(&FrameView::capture(s)))
}

/// Pending host events as a JSON array; draining clears them.
#[wasm_bindgen]
pub fn globe_events() -> Result<String, JsValue> {
    try_with_session(|s| {
        let events: Vec<EventView> = s.drain_events().iter().map(EventView::from).collect();
        to_json(&events)
    })
}

#[wasm_bindgen]
pub fn globe_quality() -> Result<String, JsValue> {
    try_with_session(|s| to_json(&s.settings()))
}

#[wasm_bindgen]
pub fn globe_metrics() -> Result<String, JsValue> {
    try_with_session(|s| to_json(&s.metrics().snapshot()))
}

/// Current pick as JSON, `null` when nothing is under the pointer.
#[wasm_bindgen]
pub fn globe_pick() -> Result<String, JsValue> {
    try_with_session(|s| to_json(&s.pick_result()))
}

#[wasm_bindgen]
pub fn globe_popup() -> Result<String, JsValue> {
    try_with_session(|s| to_json(&s.popup()))
}

#[wasm_bindgen]
pub fn globe_pointer_move(x: f64, y: f64, touch: bool) {
    let kind = if touch {
        PointerKind::Touch
    } else {
        PointerKind::Mouse
    };
    with_session(|s| s.set_pointer(x, y, kind));
}

#[wasm_bindgen]
pub fn globe_pointer_leave() {
    with_session(|s| s.clear_pointer());
}

#[wasm_bindgen]
pub fn globe_set_dragging(dragging: bool) {
    with_session(|s| s.set_dragging(dragging));
}

#[wasm_bindgen]
pub fn globe_visibility(visible: bool) {
    with_session(|s| s.set_paused(!visible));
}

#[wasm_bindgen]
pub fn globe_resize(width: f64, height: f64) {
    with_session(|s| s.on_resize(width, height));
}

#[wasm_bindgen]
pub fn globe_context_lost() {
    with_session(|s| s.on_context_lost());
}

#[wasm_bindgen]
pub fn globe_dispose() {
    with_session(|s| s.dispose());
}

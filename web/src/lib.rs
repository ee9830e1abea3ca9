mod calcpad_editor;
mod utils;

pub use calcpad_editor::CalcpadEditorBindings;
use utils::set_panic_hook;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use lol_alloc::{FreeListAllocator, LockedAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: LockedAllocator<FreeListAllocator> =
    LockedAllocator::new(FreeListAllocator::new());

#[wasm_bindgen(start)]
fn main() {
    set_panic_hook();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        // A logger was already installed by the host page
        log::debug!("Logger already installed");
    }
}

//! Basic value holder and adapter example

use std::sync::Arc;
use tether::adapter::{BoundedRangeModel, RangeAdapter, ToggleAdapter, ToggleModel};
use tether::value::{ValueHolder, ValueModel};

fn main() {
    println!("=== Basic Binding Example ===\n");

    // Application state lives in plain observable holders
    let muted = Arc::new(ValueHolder::new(false));
    let volume = Arc::new(ValueHolder::new(40));

    // Adapters present the holders through widget-model contracts
    let mute_toggle = ToggleAdapter::for_bool(muted.clone() as Arc<dyn ValueModel<bool>>);
    let volume_slider = RangeAdapter::new(volume.clone() as Arc<dyn ValueModel<i32>>, 0, 0, 100)
        .expect("valid range configuration");

    println!("Clicking the mute checkbox...");
    mute_toggle.set_selected(true);
    println!("Model says muted = {:?}", muted.value());

    println!("\nDragging the slider to 70...");
    volume_slider.set_value(70);
    println!("Model says volume = {:?}", volume.value());

    println!("\nModel writes volume = 120; the slider clamps its view...");
    volume_slider.set_maximum(100);
    volume_slider.set_value(120);
    println!(
        "Slider shows value={} max={}",
        volume_slider.value(),
        volume_slider.maximum()
    );
}
